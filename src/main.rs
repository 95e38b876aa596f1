use anyhow::Result;
use clap::Parser;
use linkpages::build::build;
use linkpages::config::Config;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Renders a static detail page for every link in a curated collection.
#[derive(Parser)]
#[command(name = "linkpages", version, about)]
struct Cli {
    /// Project directory. It and its parents are searched for
    /// `linkpages.yaml`; without one, the defaults apply to this directory.
    #[arg(default_value = ".")]
    root: PathBuf,

    /// Log debug diagnostics to stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        true => EnvFilter::new("linkpages=debug"),
        false => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_directory(&cli.root)?;
    build(&config, &mut std::io::stdout().lock())?;
    Ok(())
}
