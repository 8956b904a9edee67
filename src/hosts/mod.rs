pub mod probe;
pub mod provision;

pub use probe::{ReachabilityProbe, TcpProbe};
pub use provision::{HostFileProvisioner, SeedOutcome, extract_hostnames};
