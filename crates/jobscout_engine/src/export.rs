use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jobscout_core::{ExportFormat, JobResultSet, SerializeError};
use jobscout_logging::{scout_debug, scout_info};
use tempfile::NamedTempFile;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub record_count: usize,
    pub files: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export")]
    Empty,
    #[error("serialize error: {0}")]
    Serialize(#[from] SerializeError),
    #[error("cannot export into {}: {reason}", path.display())]
    Destination { path: PathBuf, reason: String },
    #[error("writing {} failed: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Makes sure `dir` is a directory the exporter can create files in,
/// creating it and any missing parents.
pub fn ensure_export_dir(dir: &Path) -> Result<(), ExportError> {
    let unusable = |reason: String| ExportError::Destination {
        path: dir.to_path_buf(),
        reason,
    };
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(unusable("not a directory".to_string())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            scout_debug!("Creating export directory {}", dir.display());
            fs::create_dir_all(dir).map_err(|err| unusable(err.to_string()))?;
        }
        Err(err) => return Err(unusable(err.to_string())),
    }
    // Directory metadata says nothing about write permission; only a real file does.
    NamedTempFile::new_in(dir).map_err(|err| unusable(err.to_string()))?;
    Ok(())
}

/// Writes the result set, newest first, once per requested format into `dir`.
///
/// Every file is serialized before anything touches the disk, so a
/// serialization failure leaves `dir` untouched. Each file is staged beside
/// its target and renamed over it, replacing any earlier export.
pub fn export_results(
    dir: &Path,
    results: &JobResultSet,
    formats: &[ExportFormat],
) -> Result<ExportSummary, ExportError> {
    if results.is_empty() {
        return Err(ExportError::Empty);
    }

    let rendered = formats
        .iter()
        .map(|format| Ok((format.filename(), results.serialize(*format)?)))
        .collect::<Result<Vec<_>, SerializeError>>()?;

    ensure_export_dir(dir)?;
    let mut files = Vec::with_capacity(rendered.len());
    for (filename, content) in rendered {
        files.push(replace_file(&dir.join(filename), content.as_bytes())?);
    }

    scout_info!(
        "Exported {} jobs to {} file(s) in {}",
        results.len(),
        files.len(),
        dir.display()
    );
    Ok(ExportSummary {
        record_count: results.len(),
        files,
    })
}

fn replace_file(target: &Path, content: &[u8]) -> Result<PathBuf, ExportError> {
    let failed = |source: io::Error| ExportError::Write {
        path: target.to_path_buf(),
        source,
    };
    let staging_dir = target.parent().unwrap_or(Path::new("."));
    let mut staged = NamedTempFile::new_in(staging_dir).map_err(failed)?;
    staged.write_all(content).map_err(failed)?;
    staged.as_file_mut().sync_all().map_err(failed)?;
    staged.persist(target).map_err(|err| failed(err.error))?;
    Ok(target.to_path_buf())
}
