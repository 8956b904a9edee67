use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Installation shape derived from the reachable host set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopologyMode {
    Single,
    Multi,
}

impl TopologyMode {
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi)
    }
}

impl fmt::Display for TopologyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => write!(f, "single"),
            Self::Multi => write!(f, "multi"),
        }
    }
}

/// Result of probing and classifying the seed host list.
///
/// `segment_hosts` is always the subsequence of `validated_hosts` that is not
/// the master, in probe order. Duplicates in the seed file are kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedHosts {
    pub mode: TopologyMode,
    pub validated_hosts: Vec<String>,
    pub segment_hosts: Vec<String>,
}

/// Everything one run learned about the installation hosts.
///
/// Built once per run: provisioning, probing, classification, persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationTopology {
    pub seed_host_file: PathBuf,
    pub master_hostname: String,
    pub mode: TopologyMode,
    pub validated_hosts: Vec<String>,
    pub segment_hosts: Vec<String>,
    pub working_host_file: PathBuf,
    pub segment_host_file: PathBuf,
}

impl InstallationTopology {
    pub fn is_single(&self) -> bool {
        self.mode == TopologyMode::Single
    }

    pub fn host_count(&self) -> usize {
        self.validated_hosts.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segment_hosts.len()
    }
}
