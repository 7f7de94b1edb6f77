use clap::Parser;
use scenarios::{init_tracing, threads, Args};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = args.load_config()?;

    threads::run(args.scenario, &config)?;
    tracing::info!("all scenarios completed");
    Ok(())
}
