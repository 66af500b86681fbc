//! # SHA-512 crypt
//!
//! File: cli/src/common/crypt.rs
//!
//! The `$6$` password hash format understood by `/etc/shadow` and by DC/OS
//! for `dcos_superuser_password_hash`, built on `sha2`. Salts are drawn
//! from the OS RNG.
//!
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha512};

/// Rounds used for generated superuser password hashes.
pub const PASSWORD_HASH_ROUNDS: u32 = 656_000;

const DEFAULT_ROUNDS: u32 = 5_000;
const MIN_ROUNDS: u32 = 1_000;
const MAX_ROUNDS: u32 = 999_999_999;
const MAX_SALT_LEN: usize = 16;

const ALPHABET: &[u8; 64] = b"./0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

// Byte triples of the final digest, in output order.
const PERMUTATION: [(usize, usize, usize); 21] = [
    (0, 21, 42),
    (22, 43, 1),
    (44, 2, 23),
    (3, 24, 45),
    (25, 46, 4),
    (47, 5, 26),
    (6, 27, 48),
    (28, 49, 7),
    (50, 8, 29),
    (9, 30, 51),
    (31, 52, 10),
    (53, 11, 32),
    (12, 33, 54),
    (34, 55, 13),
    (56, 14, 35),
    (15, 36, 57),
    (37, 58, 16),
    (59, 17, 38),
    (18, 39, 60),
    (40, 61, 19),
    (62, 20, 41),
];

/// Hashes `password` with a fresh random salt and `PASSWORD_HASH_ROUNDS`.
pub fn hash_password(password: &str) -> String {
    sha512_crypt(password, &random_salt(), PASSWORD_HASH_ROUNDS)
}

/// A random salt of the maximum length over the crypt alphabet.
pub fn random_salt() -> String {
    let mut bytes = [0u8; MAX_SALT_LEN];
    OsRng.fill_bytes(&mut bytes);
    bytes
        .iter()
        .map(|b| ALPHABET[usize::from(*b) % ALPHABET.len()] as char)
        .collect()
}

/// SHA-512 crypt of `password`. The salt is truncated to 16 bytes and the
/// rounds clamped to the range the format allows.
pub fn sha512_crypt(password: &str, salt: &str, rounds: u32) -> String {
    let rounds = rounds.clamp(MIN_ROUNDS, MAX_ROUNDS);
    let salt = truncate_salt(salt);
    let pw = password.as_bytes();
    let sb = salt.as_bytes();

    let alternate = Sha512::new()
        .chain_update(pw)
        .chain_update(sb)
        .chain_update(pw)
        .finalize();

    let mut ctx = Sha512::new();
    ctx.update(pw);
    ctx.update(sb);
    extend_cyclic(&mut ctx, &alternate, pw.len());
    let mut len = pw.len();
    while len > 0 {
        if len & 1 == 1 {
            ctx.update(&alternate);
        } else {
            ctx.update(pw);
        }
        len >>= 1;
    }
    let mut digest = ctx.finalize();

    let mut ctx = Sha512::new();
    for _ in 0..pw.len() {
        ctx.update(pw);
    }
    let p_bytes = cyclic_bytes(&ctx.finalize(), pw.len());

    let mut ctx = Sha512::new();
    for _ in 0..(16 + usize::from(digest[0])) {
        ctx.update(sb);
    }
    let s_bytes = cyclic_bytes(&ctx.finalize(), sb.len());

    for round in 0..rounds {
        let mut ctx = Sha512::new();
        if round & 1 == 1 {
            ctx.update(&p_bytes);
        } else {
            ctx.update(&digest);
        }
        if round % 3 != 0 {
            ctx.update(&s_bytes);
        }
        if round % 7 != 0 {
            ctx.update(&p_bytes);
        }
        if round & 1 == 1 {
            ctx.update(&digest);
        } else {
            ctx.update(&p_bytes);
        }
        digest = ctx.finalize();
    }

    let mut out = String::from("$6$");
    if rounds != DEFAULT_ROUNDS {
        out.push_str(&format!("rounds={}$", rounds));
    }
    out.push_str(salt);
    out.push('$');
    for (a, b, c) in PERMUTATION {
        encode_24bit(&mut out, digest[a], digest[b], digest[c], 4);
    }
    encode_24bit(&mut out, 0, 0, digest[63], 2);
    out
}

fn truncate_salt(salt: &str) -> &str {
    match salt.char_indices().nth(MAX_SALT_LEN) {
        Some((idx, _)) => &salt[..idx],
        None => salt,
    }
}

fn extend_cyclic(ctx: &mut Sha512, block: &[u8], len: usize) {
    let mut remaining = len;
    while remaining > block.len() {
        ctx.update(block);
        remaining -= block.len();
    }
    ctx.update(&block[..remaining]);
}

fn cyclic_bytes(block: &[u8], len: usize) -> Vec<u8> {
    block.iter().copied().cycle().take(len).collect()
}

fn encode_24bit(out: &mut String, b2: u8, b1: u8, b0: u8, chars: usize) {
    let mut w = (u32::from(b2) << 16) | (u32::from(b1) << 8) | u32::from(b0);
    for _ in 0..chars {
        out.push(ALPHABET[(w & 0x3f) as usize] as char);
        w >>= 6;
    }
}
