pub mod error;
pub mod types;

pub use error::{Result, SetupError, TopologyFailure};
pub use types::{InstallationTopology, TopologyMode, ValidatedHosts};
