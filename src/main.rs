mod cli;

use crate::cli::Cli;
use crate::cli::app::App;
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let app = App::new(Cli::parse());
    init_tracing(app.verbose());
    app.run()
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "gphostprep=debug" } else { "gphostprep=info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
