pub mod host_setup;

pub use host_setup::HostSetup;
