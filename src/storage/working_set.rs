//! Working host files handed to the installation steps

use crate::core::{Result, SetupError};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Writes the validated host set and its segment subset to two files.
///
/// Both files are deleted and recreated on every call, never appended to.
/// The working file is written first; the pair is only meant to be read
/// together after a run finished successfully.
#[derive(Debug, Clone)]
pub struct WorkingSetPersister {
    working_path: PathBuf,
    segment_path: PathBuf,
}

impl WorkingSetPersister {
    pub fn new<W: AsRef<Path>, S: AsRef<Path>>(working_path: W, segment_path: S) -> Self {
        Self {
            working_path: working_path.as_ref().to_path_buf(),
            segment_path: segment_path.as_ref().to_path_buf(),
        }
    }

    pub fn working_path(&self) -> &Path {
        &self.working_path
    }

    pub fn segment_path(&self) -> &Path {
        &self.segment_path
    }

    pub fn persist(&self, validated_hosts: &[String], segment_hosts: &[String]) -> Result<()> {
        persist(validated_hosts, segment_hosts, &self.working_path, &self.segment_path)
    }
}

/// Replace `working_path` with every validated host and `segment_path` with
/// the segment hosts, one per line, in validation order.
pub fn persist(
    validated_hosts: &[String],
    segment_hosts: &[String],
    working_path: &Path,
    segment_path: &Path,
) -> Result<()> {
    info!(path = %working_path.display(), hosts = validated_hosts.len(), "saving the working host file");
    replace_host_file(working_path, validated_hosts)?;

    info!(path = %segment_path.display(), hosts = segment_hosts.len(), "saving the segment host file");
    replace_host_file(segment_path, segment_hosts)?;
    Ok(())
}

/// Delete `path` if present, then write `hosts` to it.
///
/// The content goes to a temporary file next to `path` and is renamed into
/// place, so readers see either no file or the complete new list.
pub fn replace_host_file(path: &Path, hosts: &[String]) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed previous host file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(SetupError::Persistence(format!(
                "Failed to delete {}: {}",
                path.display(),
                e
            )));
        }
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(|e| {
        SetupError::Persistence(format!("Failed to create temp file in {}: {}", dir.display(), e))
    })?;

    for host in hosts {
        writeln!(temp, "{}", host).map_err(|e| {
            SetupError::Persistence(format!("Failed to write {}: {}", path.display(), e))
        })?;
    }
    temp.as_file().sync_all().map_err(|e| {
        SetupError::Persistence(format!("Failed to sync {}: {}", path.display(), e))
    })?;
    temp.persist(path).map_err(|e| {
        SetupError::Persistence(format!("Failed to move host file into {}: {}", path.display(), e.error))
    })?;
    Ok(())
}

/// Non-blank lines of a persisted host file.
pub fn read_host_file(path: &Path) -> Result<Vec<String>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        SetupError::Persistence(format!("Failed to read {}: {}", path.display(), e))
    })?;
    Ok(raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
