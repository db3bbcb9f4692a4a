//! # Manifest Building
//!
//! The audit record accompanying each encrypted artifact. Checksum and size
//! are computed over the ciphertext as persisted to disk, never the
//! plaintext, so a downstream consumer can verify transport integrity
//! against the exact bytes it received.

use crate::domain::catalog::pack_code_entry;
use crate::errors::PrintFileError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::PackCode;
use std::path::Path;

/// Manifest schema version.
pub const SCHEMA_VERSION: &str = "1";

/// Manifest content version.
pub const MANIFEST_VERSION: &str = "1";

/// Source system identifier stamped on every manifest.
pub const SOURCE_NAME: &str = "RM_PRINT";

/// Descriptor of one delivered file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestFile {
    /// File name (no directory components).
    pub name: String,
    /// Path relative to the manifest.
    pub relative_path: String,
    /// Size of the encrypted artifact in bytes.
    pub size_bytes: u64,
    /// Lowercase SHA-256 hex over the encrypted bytes.
    pub checksum: String,
    /// Number of print rows inside the (decrypted) file.
    pub rows: u32,
}

/// The manifest record, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Manifest schema version.
    pub schema_version: String,
    /// Human description of the pack, from the catalog.
    pub description: String,
    /// Dataset tag, from the catalog.
    pub dataset: String,
    /// Manifest content version.
    pub version: String,
    /// Creation instant, ISO-8601 UTC with millisecond precision.
    pub manifest_created: String,
    /// Source system identifier.
    pub source_name: String,
    /// The files this manifest describes.
    pub files: Vec<ManifestFile>,
}

/// Lowercase SHA-256 hex digest of a byte buffer.
#[must_use]
pub fn checksum_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Build the manifest for an encrypted artifact already written to disk.
///
/// Reads the artifact back so checksum and size describe the persisted
/// bytes, not an in-memory copy.
///
/// # Errors
///
/// - [`PrintFileError::UnknownPackCode`] when the catalog has no entry.
/// - [`PrintFileError::Io`] when the artifact cannot be read back.
pub fn build_manifest(
    ciphertext_path: &Path,
    pack_code: &PackCode,
    rows: u32,
) -> Result<Manifest, PrintFileError> {
    let entry = pack_code_entry(pack_code)
        .ok_or_else(|| PrintFileError::UnknownPackCode(pack_code.to_string()))?;

    let ciphertext = std::fs::read(ciphertext_path).map_err(|source| PrintFileError::Io {
        path: ciphertext_path.display().to_string(),
        source,
    })?;

    let name = ciphertext_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Manifest {
        schema_version: SCHEMA_VERSION.to_string(),
        description: entry.description.to_string(),
        dataset: entry.dataset.to_string(),
        version: MANIFEST_VERSION.to_string(),
        manifest_created: Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        source_name: SOURCE_NAME.to_string(),
        files: vec![ManifestFile {
            name,
            relative_path: "./".to_string(),
            size_bytes: ciphertext.len() as u64,
            checksum: checksum_hex(&ciphertext),
            rows,
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_artifact(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(bytes).unwrap();
        path
    }

    #[test]
    fn test_manifest_describes_persisted_ciphertext() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = b"not-really-ciphertext-but-on-disk";
        let path = write_artifact(&dir, "D_FD_H1_2021-01-01T00-00-00.csv.sealed", bytes);

        let manifest = build_manifest(&path, &PackCode::new("D_FD_H1"), 7).unwrap();

        assert_eq!(manifest.schema_version, "1");
        assert_eq!(manifest.version, "1");
        assert_eq!(manifest.source_name, SOURCE_NAME);
        assert_eq!(manifest.dataset, "QM3.1");
        assert_eq!(
            manifest.description,
            "Household Questionnaire pack for England"
        );

        let file = &manifest.files[0];
        assert_eq!(file.name, "D_FD_H1_2021-01-01T00-00-00.csv.sealed");
        assert_eq!(file.relative_path, "./");
        assert_eq!(file.size_bytes, bytes.len() as u64);
        assert_eq!(file.rows, 7);

        // Recomputing over the persisted file reproduces the value exactly
        let reread = std::fs::read(&path).unwrap();
        assert_eq!(file.checksum, checksum_hex(&reread));
    }

    #[test]
    fn test_manifest_created_is_utc_millis_zulu() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(&dir, "a.csv.sealed", b"x");

        let manifest = build_manifest(&path, &PackCode::new("D_FD_H1"), 1).unwrap();
        let created = &manifest.manifest_created;

        // e.g. 2021-03-15T09:30:00.123Z
        assert!(created.ends_with('Z'));
        assert_eq!(created.len(), 24);
        assert_eq!(&created[10..11], "T");
        assert_eq!(&created[19..20], ".");
    }

    #[test]
    fn test_manifest_json_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(&dir, "a.csv.sealed", b"x");

        let manifest = build_manifest(&path, &PackCode::new("D_CCS_CH1"), 3).unwrap();
        let json = serde_json::to_value(&manifest).unwrap();

        assert_eq!(json["schemaVersion"], "1");
        assert!(json["manifestCreated"].is_string());
        assert_eq!(json["sourceName"], SOURCE_NAME);
        assert_eq!(json["files"][0]["relativePath"], "./");
        assert_eq!(json["files"][0]["sizeBytes"], 1);
        assert_eq!(json["files"][0]["rows"], 3);
        assert!(json["files"][0]["checksum"].is_string());
    }

    #[test]
    fn test_unknown_pack_code_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(&dir, "a.csv.sealed", b"x");

        let result = build_manifest(&path, &PackCode::new("D_NOPE"), 1);
        assert!(matches!(result, Err(PrintFileError::UnknownPackCode(_))));
    }

    #[test]
    fn test_missing_artifact_is_io_error() {
        let result = build_manifest(
            Path::new("/nonexistent/file.csv.sealed"),
            &PackCode::new("D_FD_H1"),
            1,
        );
        assert!(matches!(result, Err(PrintFileError::Io { .. })));
    }
}
