pub mod app;

use clap::{Args, Parser, Subcommand};
use gphostprep::config::ConfigOverrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gphostprep")]
#[command(about = "Discover, validate and record the hosts of a Greenplum installation")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// JSON file with configuration defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Master hostname (defaults to $HOSTNAME)
    #[arg(long, global = true)]
    pub master: Option<String>,

    /// Directory for the working host files (defaults to $TMPDIR or /tmp)
    #[arg(long, global = true)]
    pub temp_dir: Option<PathBuf>,

    /// Candidate host list (defaults to $HOME/hostfile)
    #[arg(long, global = true)]
    pub seed_file: Option<PathBuf>,

    /// Hosts table used to generate a missing seed file
    #[arg(long, global = true)]
    pub hosts_table: Option<PathBuf>,

    /// Port probed on every host
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Connect timeout per probe, in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Fail multi-host runs when the master itself is unreachable
    #[arg(long, global = true)]
    pub require_master: bool,

    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            master_hostname: self.master.clone(),
            temp_dir: self.temp_dir.clone(),
            seed_host_file: self.seed_file.clone(),
            system_hosts_file: self.hosts_table.clone(),
            probe_port: self.port,
            probe_timeout_ms: self.timeout_ms,
            require_reachable_master: self.require_master.then_some(true),
        }
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Only make sure the seed host file exists
    Seed,
    /// Probe the seed hosts and write the working host files
    Prepare {
        /// Print the resulting topology as JSON
        #[arg(long)]
        json: bool,
    },
    /// Prepare, then exchange keys and install on the segment hosts
    Setup {
        /// Installation root (defaults to $GPHOME)
        #[arg(long)]
        gphome: Option<PathBuf>,
        /// Symlink pointing at the installation on every segment host
        #[arg(long)]
        link_path: Option<PathBuf>,
        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
    },
}
