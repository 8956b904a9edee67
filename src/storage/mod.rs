pub mod working_set;

pub use working_set::{WorkingSetPersister, persist, read_host_file, replace_host_file};
