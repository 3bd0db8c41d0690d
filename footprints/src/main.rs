use clap::Parser;
use footprints::config::Config;
use tracing_subscriber::{fmt, EnvFilter};

fn main() -> anyhow::Result<()> {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    tracing::debug!(config = ?config, "Starting with configuration");

    let outputs = footprints::extract::run(&config)?;
    for output in &outputs {
        println!("{}", output.display());
    }

    Ok(())
}
