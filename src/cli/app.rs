use super::{Cli, Command};
use anyhow::{Context, Result};
use gphostprep::config::{ConfigOverrides, SetupConfig};
use gphostprep::orchestrator::{
    CommandRunner, Orchestrator, OrchestratorConfig, ProcessRunner, RecordingRunner,
};
use gphostprep::{HostSetup, InstallationTopology, SeedOutcome};
use std::path::PathBuf;
use tracing::info;

pub struct App {
    cli: Cli,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    pub fn verbose(&self) -> bool {
        self.cli.global.verbose
    }

    pub fn run(&self) -> Result<()> {
        let config = self.resolve_config()?;
        let setup = HostSetup::new(config).context("invalid host configuration")?;

        match &self.cli.command {
            Command::Seed => {
                let seed = &setup.config().seed_host_file;
                match setup
                    .ensure_seed_host_file()
                    .with_context(|| format!("cannot provision {}", seed.display()))?
                {
                    SeedOutcome::Existing => println!("Using existing host file {}", seed.display()),
                    SeedOutcome::Generated(n) => {
                        println!("Generated host file {} with {} hosts", seed.display(), n)
                    }
                }
                Ok(())
            }
            Command::Prepare { json } => {
                let topology = setup.prepare().context("host validation failed")?;
                if *json {
                    println!("{}", serde_json::to_string_pretty(&topology)?);
                } else {
                    print_summary(&topology);
                }
                Ok(())
            }
            Command::Setup {
                gphome,
                link_path,
                dry_run,
            } => {
                let orchestrator_config = orchestrator_config(gphome.clone(), link_path.clone())?;
                let topology = setup.prepare().context("host validation failed")?;
                print_summary(&topology);

                if *dry_run {
                    let mut orchestrator =
                        Orchestrator::new(orchestrator_config, RecordingRunner::default());
                    orchestrator.run(&topology)?;
                    for command in &orchestrator.runner().commands {
                        println!("{}", command);
                    }
                    return Ok(());
                }

                run_steps(Orchestrator::new(orchestrator_config, ProcessRunner), &topology)
            }
        }
    }

    /// Flags override the config file, which overrides the environment.
    fn resolve_config(&self) -> Result<SetupConfig> {
        let file = match &self.cli.global.config {
            Some(path) => ConfigOverrides::from_file(path)?,
            None => ConfigOverrides::default(),
        };
        let overrides = file.merge(self.cli.global.overrides());
        Ok(SetupConfig::resolve(overrides, |key| std::env::var(key).ok())?)
    }
}

fn orchestrator_config(gphome: Option<PathBuf>, link_path: Option<PathBuf>) -> Result<OrchestratorConfig> {
    let config = match gphome {
        Some(gphome) => OrchestratorConfig::new(gphome),
        None => OrchestratorConfig::from_env()?,
    };
    Ok(match link_path {
        Some(path) => config.link_path(path),
        None => config,
    })
}

fn run_steps<R: CommandRunner>(mut orchestrator: Orchestrator<R>, topology: &InstallationTopology) -> Result<()> {
    orchestrator
        .run(topology)
        .context("installation step failed")?;
    info!("host setup completed");
    Ok(())
}

fn print_summary(topology: &InstallationTopology) {
    println!("Installation mode: {}", topology.mode);
    println!("Master host: {}", topology.master_hostname);
    println!(
        "Reachable hosts ({}): {}",
        topology.host_count(),
        topology.validated_hosts.join(", ")
    );
    println!(
        "Segment hosts ({}): {}",
        topology.segment_count(),
        topology.segment_hosts.join(", ")
    );
    println!("Working host file: {}", topology.working_host_file.display());
    println!("Segment host file: {}", topology.segment_host_file.display());
}
