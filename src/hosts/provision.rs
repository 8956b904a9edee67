//! Seed host file provisioning

use crate::core::{Result, SetupError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What `ensure_seed_host_file` did on this call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// A seed file was already present and left untouched.
    Existing,
    /// A new seed file was generated with this many hosts.
    Generated(usize),
}

/// Makes sure a seed host list exists, deriving one from the hosts table
/// when it is missing. An existing seed file is never modified.
#[derive(Debug, Clone)]
pub struct HostFileProvisioner {
    system_hosts_file: PathBuf,
}

impl HostFileProvisioner {
    pub fn new<P: AsRef<Path>>(system_hosts_file: P) -> Self {
        Self {
            system_hosts_file: system_hosts_file.as_ref().to_path_buf(),
        }
    }

    pub fn system_hosts_file(&self) -> &Path {
        &self.system_hosts_file
    }

    pub fn ensure_seed_host_file<P: AsRef<Path>>(&self, path: P) -> Result<SeedOutcome> {
        let path = path.as_ref();
        debug!(path = %path.display(), "checking for seed host file");

        let exists = path.try_exists().map_err(|e| {
            SetupError::Provisioning(format!("Cannot inspect host file {}: {}", path.display(), e))
        })?;
        if exists {
            info!(path = %path.display(), "found host file");
            return Ok(SeedOutcome::Existing);
        }

        info!(
            path = %path.display(),
            source = %self.system_hosts_file.display(),
            "host file doesn't exist, generating one"
        );
        let table = fs::read_to_string(&self.system_hosts_file).map_err(|e| {
            SetupError::Provisioning(format!(
                "Failed to read hosts table {}: {}",
                self.system_hosts_file.display(),
                e
            ))
        })?;

        let hosts = extract_hostnames(&table);
        let mut content = hosts.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }

        // create_new keeps a file that appeared since the check intact
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .and_then(|mut file| file.write_all(content.as_bytes()))
            .map_err(|e| {
                SetupError::Provisioning(format!(
                    "Failed to write host file {}: {}",
                    path.display(),
                    e
                ))
            })?;

        Ok(SeedOutcome::Generated(hosts.len()))
    }
}

/// Second whitespace-delimited field of every line after the first.
/// Lines without a second field contribute nothing.
pub fn extract_hostnames(table: &str) -> Vec<String> {
    table
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().nth(1))
        .map(str::to_string)
        .collect()
}
