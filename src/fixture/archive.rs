//! Packing a session directory into a compressed archive and back.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use super::format::{FixtureArchive, OperationLog};

/// File suffix for per-operation sequence files inside a session directory.
pub const SEQUENCE_SUFFIX: &str = ".calls.yaml";
/// File suffix for compressed archive artifacts.
pub const ARCHIVE_SUFFIX: &str = ".fixture.yaml.gz";

/// Reads every per-operation sequence file under `dir` and writes the
/// combined session as a gzip-compressed YAML archive at `dest`.
///
/// Operation logs are sorted by operation name so the artifact content is
/// deterministic for a given set of sequence files.
///
/// # Errors
///
/// Returns an error if the directory cannot be read, a sequence file fails
/// to parse, or the archive cannot be written.
pub fn pack(
    dir: &Path,
    name: &str,
    recorded_at: DateTime<Utc>,
    dest: &Path,
) -> Result<PathBuf, String> {
    let entries = fs::read_dir(dir)
        .map_err(|e| format!("Failed to list session directory {}: {e}", dir.display()))?;

    let mut operations: Vec<OperationLog> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| format!("Failed to read directory entry: {e}"))?;
        let path = entry.path();
        if !path.file_name().and_then(|n| n.to_str()).is_some_and(|n| n.ends_with(SEQUENCE_SUFFIX))
        {
            continue;
        }
        let content = fs::read_to_string(&path)
            .map_err(|e| format!("Failed to read sequence file {}: {e}", path.display()))?;
        let log: OperationLog = serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse sequence file {}: {e}", path.display()))?;
        operations.push(log);
    }
    operations.sort_by(|a, b| a.operation.cmp(&b.operation));

    let archive = FixtureArchive { name: name.to_string(), recorded_at, operations };
    let yaml = serde_yaml::to_string(&archive)
        .map_err(|e| format!("Failed to serialize fixture archive: {e}"))?;

    let file = File::create(dest)
        .map_err(|e| format!("Failed to create archive {}: {e}", dest.display()))?;
    let mut encoder = GzEncoder::new(file, Compression::default());
    encoder
        .write_all(yaml.as_bytes())
        .map_err(|e| format!("Failed to write archive {}: {e}", dest.display()))?;
    encoder
        .finish()
        .map_err(|e| format!("Failed to finalize archive {}: {e}", dest.display()))?;

    Ok(dest.to_path_buf())
}

/// Decompresses and parses an archive fully into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be read, decompressed, or parsed.
pub fn unpack(path: &Path) -> Result<FixtureArchive, String> {
    let file =
        File::open(path).map_err(|e| format!("Failed to open archive {}: {e}", path.display()))?;
    let mut decoder = GzDecoder::new(file);
    let mut yaml = String::new();
    decoder
        .read_to_string(&mut yaml)
        .map_err(|e| format!("Failed to decompress archive {}: {e}", path.display()))?;
    serde_yaml::from_str(&yaml)
        .map_err(|e| format!("Failed to parse archive {}: {e}", path.display()))
}
