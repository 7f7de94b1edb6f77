use clap::Parser;
use conduit::asynchronous::Scheduler;
use scenarios::{init_tracing, tasks, Args};

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let config = args.load_config()?;

    let scheduler = Scheduler::new(&config.scheduler)?;
    let spawner = scheduler.spawner();
    scheduler.block_on(tasks::run(&spawner, args.scenario, &config))?;
    tracing::info!("all scenarios completed");
    Ok(())
}
