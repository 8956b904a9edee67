use crate::core::{Result, SetupError};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SYSTEM_HOSTS_FILE: &str = "/etc/hosts";
pub const DEFAULT_TEMP_DIR: &str = "/tmp";
pub const DEFAULT_PROBE_PORT: u16 = 22;
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

pub const SEED_HOST_FILE_NAME: &str = "hostfile";
pub const WORKING_HOST_FILE_NAME: &str = "hostfile";
pub const SEGMENT_HOST_FILE_NAME: &str = "hostfile_segment";

/// Host preparation configuration
///
/// Everything the provisioner, validator and persister need, resolved once
/// before the run starts. Nothing downstream reads the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupConfig {
    /// Hostname of the coordinator (master) host
    pub master_hostname: String,

    /// Directory receiving the working and segment host files
    pub temp_dir: PathBuf,

    /// Unvalidated candidate host list, created if missing
    pub seed_host_file: PathBuf,

    /// Hosts table used to generate the seed file
    pub system_hosts_file: PathBuf,

    /// Port probed on every candidate host
    pub probe_port: u16,

    /// Upper bound on a single connect attempt
    pub probe_timeout: Duration,

    /// Reject multi-host runs whose reachable set lacks the master
    pub require_reachable_master: bool,
}

impl SetupConfig {
    pub fn new(
        master_hostname: impl Into<String>,
        temp_dir: impl Into<PathBuf>,
        seed_host_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            master_hostname: master_hostname.into(),
            temp_dir: temp_dir.into(),
            seed_host_file: seed_host_file.into(),
            system_hosts_file: PathBuf::from(DEFAULT_SYSTEM_HOSTS_FILE),
            probe_port: DEFAULT_PROBE_PORT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            require_reachable_master: false,
        }
    }

    pub fn system_hosts_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_hosts_file = path.into();
        self
    }

    pub fn probe_port(mut self, port: u16) -> Self {
        self.probe_port = port;
        self
    }

    pub fn probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn require_reachable_master(mut self, require: bool) -> Self {
        self.require_reachable_master = require;
        self
    }

    /// Output file listing every reachable host, master included.
    pub fn working_host_file(&self) -> PathBuf {
        self.temp_dir.join(WORKING_HOST_FILE_NAME)
    }

    /// Output file listing the reachable segment hosts only.
    pub fn segment_host_file(&self) -> PathBuf {
        self.temp_dir.join(SEGMENT_HOST_FILE_NAME)
    }

    /// Resolve the configuration from the process environment.
    ///
    /// Reads `HOSTNAME` (required), `HOME` for the seed file and `TMPDIR`
    /// for the output directory.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::resolve(ConfigOverrides::default(), lookup)
    }

    /// Resolve the configuration, preferring `overrides` over the lookup.
    pub fn resolve<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let master_hostname = match overrides.master_hostname.or_else(|| non_empty("HOSTNAME")) {
            Some(master) => master,
            None => {
                return Err(SetupError::Config(
                    "The environment variable 'HOSTNAME' for master host is not set".to_string(),
                ));
            }
        };

        let temp_dir = overrides
            .temp_dir
            .or_else(|| non_empty("TMPDIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TEMP_DIR));

        let seed_host_file = match overrides.seed_host_file {
            Some(path) => path,
            None => match non_empty("HOME") {
                Some(home) => Path::new(&home).join(SEED_HOST_FILE_NAME),
                None => {
                    return Err(SetupError::Config(
                        "The environment variable 'HOME' is not set and no seed host file was given"
                            .to_string(),
                    ));
                }
            },
        };

        let mut config = Self::new(master_hostname, temp_dir, seed_host_file);
        if let Some(path) = overrides.system_hosts_file {
            config = config.system_hosts_file(path);
        }
        if let Some(port) = overrides.probe_port {
            config = config.probe_port(port);
        }
        if let Some(ms) = overrides.probe_timeout_ms {
            config = config.probe_timeout(Duration::from_millis(ms));
        }
        if let Some(require) = overrides.require_reachable_master {
            config = config.require_reachable_master(require);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.master_hostname.trim().is_empty() {
            return Err(SetupError::Config("Master hostname cannot be empty".to_string()));
        }

        if self.temp_dir.as_os_str().is_empty() {
            return Err(SetupError::Config("Temp directory cannot be empty".to_string()));
        }

        if self.seed_host_file.as_os_str().is_empty() {
            return Err(SetupError::Config("Seed host file cannot be empty".to_string()));
        }

        if self.seed_host_file == self.working_host_file()
            || self.seed_host_file == self.segment_host_file()
        {
            return Err(SetupError::Config(format!(
                "Seed host file {} would be overwritten by the working host files",
                self.seed_host_file.display()
            )));
        }

        if self.probe_port == 0 {
            return Err(SetupError::Config("probe_port must be > 0".to_string()));
        }

        if self.probe_timeout.is_zero() {
            return Err(SetupError::Config("probe_timeout must be > 0".to_string()));
        }

        Ok(())
    }
}

/// Partial configuration, as read from a JSON file or the command line.
///
/// Unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigOverrides {
    pub master_hostname: Option<String>,
    pub temp_dir: Option<PathBuf>,
    pub seed_host_file: Option<PathBuf>,
    pub system_hosts_file: Option<PathBuf>,
    pub probe_port: Option<u16>,
    pub probe_timeout_ms: Option<u64>,
    pub require_reachable_master: Option<bool>,
}

impl ConfigOverrides {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            SetupError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            SetupError::Config(format!("Invalid config file {}: {}", path.display(), e))
        })
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw)
            .map_err(|e| SetupError::Config(format!("Invalid config file: {}", e)))
    }

    /// Layer `higher` on top of `self`; fields set in `higher` win.
    pub fn merge(self, higher: ConfigOverrides) -> Self {
        Self {
            master_hostname: higher.master_hostname.or(self.master_hostname),
            temp_dir: higher.temp_dir.or(self.temp_dir),
            seed_host_file: higher.seed_host_file.or(self.seed_host_file),
            system_hosts_file: higher.system_hosts_file.or(self.system_hosts_file),
            probe_port: higher.probe_port.or(self.probe_port),
            probe_timeout_ms: higher.probe_timeout_ms.or(self.probe_timeout_ms),
            require_reachable_master: higher
                .require_reachable_master
                .or(self.require_reachable_master),
        }
    }
}
