use crate::ldif::{LdifError, LdifReader, ReaderOptions};
use crate::models::LdifRecord;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid LDIF in {path}: {source}")]
    Ldif { path: PathBuf, source: LdifError },
    #[error("Invalid LDIF file: {0}")]
    InvalidLdifFile(String),
}

/// Read every record from an LDIF file
pub fn read_ldif_file(path: &Path, options: ReaderOptions) -> Result<Vec<LdifRecord>, IoError> {
    validate_ldif_file(path)?;

    let file = File::open(path).map_err(IoError::Io)?;
    let records = LdifReader::new(BufReader::new(file), options)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| IoError::Ldif {
            path: path.to_path_buf(),
            source,
        })?;

    log::info!("Read {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Label for a tree built from `path`: its file name
pub fn source_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .to_string()
}

pub fn validate_ldif_file(path: &Path) -> Result<(), IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(IoError::InvalidLdifFile(format!(
            "{} is not a file",
            path.display()
        )));
    }

    Ok(())
}
