use crate::config::SetupConfig;
use crate::core::{InstallationTopology, Result};
use crate::hosts::{HostFileProvisioner, ReachabilityProbe, SeedOutcome, TcpProbe};
use crate::storage::WorkingSetPersister;
use crate::topology::TopologyValidator;
use tracing::info;

/// One host preparation run.
///
/// Wires the provisioner, validator and persister from a single resolved
/// configuration and runs them strictly in that order. A failure in any
/// phase stops the run before the next one starts, so an invalid topology
/// never reaches the host files.
pub struct HostSetup<P> {
    config: SetupConfig,
    provisioner: HostFileProvisioner,
    validator: TopologyValidator<P>,
    persister: WorkingSetPersister,
}

impl HostSetup<TcpProbe> {
    /// Probe hosts over TCP using the configured port and timeout.
    pub fn new(config: SetupConfig) -> Result<Self> {
        let probe = TcpProbe::new(config.probe_port, config.probe_timeout);
        Self::with_probe(config, probe)
    }
}

impl<P: ReachabilityProbe> HostSetup<P> {
    pub fn with_probe(config: SetupConfig, probe: P) -> Result<Self> {
        config.validate()?;
        let provisioner = HostFileProvisioner::new(&config.system_hosts_file);
        let validator =
            TopologyValidator::new(probe).require_reachable_master(config.require_reachable_master);
        let persister =
            WorkingSetPersister::new(config.working_host_file(), config.segment_host_file());

        Ok(Self {
            config,
            provisioner,
            validator,
            persister,
        })
    }

    pub fn config(&self) -> &SetupConfig {
        &self.config
    }

    pub fn ensure_seed_host_file(&self) -> Result<SeedOutcome> {
        self.provisioner
            .ensure_seed_host_file(&self.config.seed_host_file)
    }

    /// Provision, probe, classify and persist.
    pub fn prepare(&self) -> Result<InstallationTopology> {
        info!(master = %self.config.master_hostname, "setting up and checking the hosts");
        self.ensure_seed_host_file()?;

        let validated = self
            .validator
            .validate(&self.config.seed_host_file, &self.config.master_hostname)?;

        self.persister
            .persist(&validated.validated_hosts, &validated.segment_hosts)?;

        Ok(InstallationTopology {
            seed_host_file: self.config.seed_host_file.clone(),
            master_hostname: self.config.master_hostname.clone(),
            mode: validated.mode,
            validated_hosts: validated.validated_hosts,
            segment_hosts: validated.segment_hosts,
            working_host_file: self.persister.working_path().to_path_buf(),
            segment_host_file: self.persister.segment_path().to_path_buf(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TopologyMode;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_prepare_generates_seed_from_hosts_table() {
        let dir = TempDir::new().unwrap();
        let table = dir.path().join("hosts");
        fs::write(&table, "127.0.0.1 localhost\n10.0.0.1 mdw\n10.0.0.2 sdw1\n10.0.0.3 sdw2\n")
            .unwrap();
        let config = SetupConfig::new("mdw", dir.path(), dir.path().join("seed"))
            .system_hosts_file(&table);

        let setup = HostSetup::with_probe(config, |_: &str| true).unwrap();
        let topology = setup.prepare().unwrap();

        assert_eq!(topology.mode, TopologyMode::Multi);
        assert_eq!(fs::read_to_string(dir.path().join("seed")).unwrap(), "mdw\nsdw1\nsdw2\n");
        assert_eq!(fs::read_to_string(&topology.working_host_file).unwrap(), "mdw\nsdw1\nsdw2\n");
        assert_eq!(fs::read_to_string(&topology.segment_host_file).unwrap(), "sdw1\nsdw2\n");
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let dir = TempDir::new().unwrap();
        let config = SetupConfig::new("", dir.path(), dir.path().join("seed"));
        assert!(HostSetup::with_probe(config, |_: &str| true).is_err());
    }
}
