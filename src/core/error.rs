use std::path::PathBuf;
use thiserror::Error;

/// Reasons a candidate host set is rejected as an installation topology.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyFailure {
    #[error("No hosts are reachable from the hostfile {}, check the hosts", .seed.display())]
    NoReachableHosts { seed: PathBuf },

    #[error("Master host '{master}' is not reachable from the hostfile {}, check the hosts", .seed.display())]
    MasterUnreachable { seed: PathBuf, master: String },

    #[error("There is an odd number of segment hosts ({0}), installation cannot continue")]
    OddSegmentCount(usize),

    #[error("No segment host found, installation cannot continue")]
    NoSegmentHosts,
}

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provisioning failure: {0}")]
    Provisioning(String),

    #[error("Topology failure: {0}")]
    Topology(#[from] TopologyFailure),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Command failure: {0}")]
    Command(String),
}

pub type Result<T> = std::result::Result<T, SetupError>;

impl SetupError {
    /// The topology invariant that was violated, if this is a topology failure.
    pub fn topology(&self) -> Option<&TopologyFailure> {
        match self {
            Self::Topology(failure) => Some(failure),
            _ => None,
        }
    }
}
