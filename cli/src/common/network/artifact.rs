//! # Downloaded Artifacts
//!
//! File: cli/src/common/network/artifact.rs
//!
//! Checksum verification and archive extraction for downloaded binaries.
//! Terraform releases are zip files; tfwheels releases are tarballs
//! (optionally gzip-compressed) or zip files.
//!
//! Extraction can be restricted to a set of file names. Matching entries are
//! written flat into the destination directory. Entries whose path is
//! absolute or climbs out with `..` are rejected.
//!
use crate::common::fs::io;
use crate::core::error::{Result, WheelsError};
use anyhow::Context;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Cursor, Read};
use std::path::{Component, Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Lowercase hex SHA-256 of `data`.
pub fn sha256_hex(data: &[u8]) -> String {
    Sha256::digest(data)
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

pub fn verify_sha256(data: &[u8], expected: &str) -> Result<()> {
    let actual = sha256_hex(data);
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        anyhow::bail!(WheelsError::Validation(format!(
            "Checksum mismatch: expected {}, got {}",
            expected, actual
        )));
    }
    debug!("Checksum {} verified", actual);
    Ok(())
}

fn sanitize(raw: &str) -> Result<PathBuf> {
    let path = Path::new(raw);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => anyhow::bail!(WheelsError::Validation(format!(
                "Illegal path in archive: {}",
                raw
            ))),
        }
    }
    Ok(clean)
}

/// Where an entry lands, or `None` when `only` filters it out.
fn destination(dest: &Path, rel: &Path, only: Option<&[&str]>) -> Option<PathBuf> {
    match only {
        None => Some(dest.join(rel)),
        Some(names) => {
            let name = rel.file_name()?.to_str()?;
            names.contains(&name).then(|| dest.join(name))
        }
    }
}

/// Extracts a zip archive held in memory. Returns the written files.
pub fn unzip_to(data: &[u8], dest: &Path, only: Option<&[&str]>) -> Result<Vec<PathBuf>> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| WheelsError::Validation(format!("unzip failed: {}", e)))?;
    let mut written = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| WheelsError::Validation(format!("unzip failed: {}", e)))?;
        let rel = sanitize(&entry.name().replace('\\', "/"))?;
        let Some(out) = destination(dest, &rel, only) else {
            continue;
        };
        if entry.is_dir() {
            if only.is_none() {
                io::ensure_dir_exists(&out)?;
            }
            continue;
        }
        if let Some(parent) = out.parent() {
            io::ensure_dir_exists(parent)?;
        }
        let mut file = File::create(&out).with_context(|| format!("create {}", out.display()))?;
        std::io::copy(&mut entry, &mut file)
            .with_context(|| format!("extract {}", out.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                std::fs::set_permissions(&out, std::fs::Permissions::from_mode(mode & 0o777))
                    .with_context(|| format!("chmod {}", out.display()))?;
            }
        }
        debug!("Extracted {}", out.display());
        written.push(out);
    }
    Ok(written)
}

/// Extracts a tarball held in memory, gunzipping it first when needed.
pub fn untar_to(data: &[u8], dest: &Path, only: Option<&[&str]>) -> Result<Vec<PathBuf>> {
    let reader: Box<dyn Read + '_> = if data.starts_with(&GZIP_MAGIC) {
        Box::new(flate2::read::GzDecoder::new(data))
    } else {
        Box::new(data)
    };
    let mut archive = tar::Archive::new(reader);
    let mut written = Vec::new();
    let entries = archive
        .entries()
        .map_err(|e| WheelsError::Validation(format!("untar failed: {}", e)))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| WheelsError::Validation(format!("untar failed: {}", e)))?;
        let raw = entry
            .path()
            .map_err(|e| WheelsError::Validation(format!("untar failed: {}", e)))?
            .to_string_lossy()
            .into_owned();
        let rel = sanitize(&raw)?;
        let Some(out) = destination(dest, &rel, only) else {
            continue;
        };
        if !entry.header().entry_type().is_file() {
            if entry.header().entry_type().is_dir() && only.is_none() {
                io::ensure_dir_exists(&out)?;
            }
            continue;
        }
        if let Some(parent) = out.parent() {
            io::ensure_dir_exists(parent)?;
        }
        entry
            .unpack(&out)
            .with_context(|| format!("extract {}", out.display()))?;
        debug!("Extracted {}", out.display());
        written.push(out);
    }
    Ok(written)
}

/// Picks the extractor from the download URL.
pub fn extract_to(url: &str, data: &[u8], dest: &Path, only: Option<&[&str]>) -> Result<Vec<PathBuf>> {
    if url.ends_with(".zip") {
        unzip_to(data, dest, only)
    } else {
        untar_to(data, dest, only)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    /// Builds an in-memory zip with the given (name, contents, mode) entries.
    pub(crate) fn zip_bytes(entries: &[(&str, &str, u32)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents, mode) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default().unix_permissions(*mode))
                .unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Builds an in-memory gzip-compressed tarball.
    pub(crate) fn tar_gz_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
        let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        for (name, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o755);
            header.set_cksum();
            builder
                .append_data(&mut header, name, contents.as_bytes())
                .unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap()
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_verify_sha256_mismatch_is_validation_error() {
        assert!(verify_sha256(b"abc", &sha256_hex(b"abc").to_uppercase()).is_ok());
        let err = verify_sha256(b"abd", &sha256_hex(b"abc")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WheelsError>(),
            Some(WheelsError::Validation(msg)) if msg.contains("Checksum mismatch")
        ));
    }

    #[test]
    fn test_unzip_keeps_layout_and_mode() -> Result<()> {
        let dir = tempdir()?;
        let data = zip_bytes(&[("terraform", "#!/bin/sh\n", 0o755), ("docs/README", "hi", 0o644)]);
        let written = unzip_to(&data, dir.path(), None)?;
        assert_eq!(written.len(), 2);
        assert_eq!(std::fs::read_to_string(dir.path().join("docs/README"))?, "hi");
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(dir.path().join("terraform"))?.permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
        Ok(())
    }

    #[test]
    fn test_unzip_only_selected_names_flat() -> Result<()> {
        let dir = tempdir()?;
        let data = zip_bytes(&[("dist/tfwheels", "new", 0o755), ("dist/LICENSE", "text", 0o644)]);
        let written = unzip_to(&data, dir.path(), Some(&["tfwheels"]))?;
        assert_eq!(written, vec![dir.path().join("tfwheels")]);
        assert!(!dir.path().join("LICENSE").exists());
        Ok(())
    }

    #[test]
    fn test_zip_entry_escaping_destination_is_rejected() {
        let dir = tempdir().unwrap();
        let data = zip_bytes(&[("../evil", "x", 0o644)]);
        assert!(unzip_to(&data, dir.path(), None).is_err());
        assert!(!dir.path().parent().unwrap().join("evil").exists());
    }

    #[test]
    fn test_untar_gzip_only_selected() -> Result<()> {
        let dir = tempdir()?;
        let data = tar_gz_bytes(&[("tfwheels-linux/tfwheels", "new"), ("tfwheels-linux/README", "r")]);
        let written = extract_to("https://x/tfwheels-linux.tar.gz", &data, dir.path(), Some(&["tfwheels"]))?;
        assert_eq!(written, vec![dir.path().join("tfwheels")]);
        assert_eq!(std::fs::read_to_string(dir.path().join("tfwheels"))?, "new");
        Ok(())
    }
}
