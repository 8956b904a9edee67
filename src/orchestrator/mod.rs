//! Installation steps that consume the persisted host files
//!
//! Key exchange always runs against the working host file. Multi-host
//! installs additionally push the binaries to every segment host and fix up
//! the product symlink there.

pub mod runner;

use crate::core::{InstallationTopology, Result, SetupError};
use crate::storage::read_host_file;
use std::path::{Path, PathBuf};
use tracing::info;

pub use runner::{CommandRunner, CommandSpec, ProcessRunner, RecordingRunner};

pub const DEFAULT_LINK_PATH: &str = "/usr/local/greenplum-db";

/// Where the installed product lives on every host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Installation root; hosts the `bin/` tools and is the symlink target
    pub gphome: PathBuf,

    /// Stable path pointing at the versioned installation
    pub link_path: PathBuf,
}

impl OrchestratorConfig {
    pub fn new(gphome: impl Into<PathBuf>) -> Self {
        Self {
            gphome: gphome.into(),
            link_path: PathBuf::from(DEFAULT_LINK_PATH),
        }
    }

    pub fn link_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.link_path = path.into();
        self
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("GPHOME").filter(|v| !v.trim().is_empty()) {
            Some(gphome) => Ok(Self::new(gphome)),
            None => Err(SetupError::Config(
                "The environment variable 'GPHOME' is not set".to_string(),
            )),
        }
    }

    fn tool(&self, name: &str) -> PathBuf {
        self.gphome.join("bin").join(name)
    }
}

pub struct Orchestrator<R> {
    config: OrchestratorConfig,
    runner: R,
}

impl<R: CommandRunner> Orchestrator<R> {
    pub fn new(config: OrchestratorConfig, runner: R) -> Self {
        Self { config, runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Commands for every downstream step, in execution order.
    ///
    /// Symlink targets are read back from the segment host file rather than
    /// taken from memory, so the plan reflects exactly what was persisted.
    pub fn plan(&self, topology: &InstallationTopology) -> Result<Vec<CommandSpec>> {
        let mut commands = vec![self.key_exchange(&topology.working_host_file)];

        if topology.mode.is_multi() {
            commands.push(self.segment_install(&topology.segment_host_file));
            for host in read_host_file(&topology.segment_host_file)? {
                commands.extend(self.relink(&host));
            }
        }
        Ok(commands)
    }

    /// Run every planned step; the first failing command stops the run.
    pub fn run(&mut self, topology: &InstallationTopology) -> Result<()> {
        let commands = self.plan(topology)?;
        info!(steps = commands.len(), mode = %topology.mode, "running installation steps");
        for command in &commands {
            self.runner.run(command)?;
        }
        Ok(())
    }

    fn key_exchange(&self, working_host_file: &Path) -> CommandSpec {
        CommandSpec::new(self.config.tool("gpssh-exkeys"))
            .arg("-f")
            .arg(working_host_file.display().to_string())
    }

    fn segment_install(&self, segment_host_file: &Path) -> CommandSpec {
        CommandSpec::new(self.config.tool("gpseginstall"))
            .arg("-f")
            .arg(segment_host_file.display().to_string())
    }

    fn relink(&self, host: &str) -> [CommandSpec; 2] {
        let link = self.config.link_path.display();
        [
            CommandSpec::new("ssh").arg(host).arg(format!("rm -rf {}", link)),
            CommandSpec::new("ssh")
                .arg(host)
                .arg(format!("ln -s {} {}", self.config.gphome.display(), link)),
        ]
    }
}
