pub mod validator;

pub use validator::{TopologyValidator, classify, read_seed_hosts};
