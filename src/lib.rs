// ============================================================================
// gphostprep Library
// ============================================================================

pub mod config;
pub mod core;
pub mod facade;
pub mod hosts;
pub mod orchestrator;
pub mod storage;
pub mod topology;

// Re-export main types for convenience
pub use crate::config::{ConfigOverrides, SetupConfig};
pub use crate::core::{InstallationTopology, Result, SetupError, TopologyFailure, TopologyMode, ValidatedHosts};
pub use facade::HostSetup;
pub use hosts::{HostFileProvisioner, ReachabilityProbe, SeedOutcome, TcpProbe};
pub use storage::WorkingSetPersister;
pub use topology::TopologyValidator;

// ============================================================================
// One-call entry point
// ============================================================================

/// Run provisioning, validation and persistence against the real network.
///
/// Configuration is resolved from the process environment (`HOSTNAME`,
/// `HOME`, `TMPDIR`).
///
/// # Examples
///
/// ```no_run
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let topology = gphostprep::prepare_hosts()?;
/// println!("{} install on {} hosts", topology.mode, topology.host_count());
/// # Ok(())
/// # }
/// ```
pub fn prepare_hosts() -> Result<InstallationTopology> {
    let config = SetupConfig::from_env()?;
    HostSetup::new(config)?.prepare()
}

/// Same as [`prepare_hosts`] with an explicit configuration and probe.
///
/// # Examples
///
/// ```
/// use gphostprep::{SetupConfig, TopologyMode};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::TempDir::new()?;
/// let seed = dir.path().join("seed");
/// std::fs::write(&seed, "mdw\n")?;
///
/// let config = SetupConfig::new("mdw", dir.path(), &seed);
/// let topology = gphostprep::prepare_hosts_with(config, |_: &str| true)?;
/// assert_eq!(topology.mode, TopologyMode::Single);
/// # Ok(())
/// # }
/// ```
pub fn prepare_hosts_with<P: ReachabilityProbe>(
    config: SetupConfig,
    probe: P,
) -> Result<InstallationTopology> {
    HostSetup::with_probe(config, probe)?.prepare()
}
