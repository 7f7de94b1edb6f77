//! The channel, select, worker pool and fan-in scenarios, runnable on either
//! `conduit` backend.
//!
//! [`threads`] drives them with OS threads, [`tasks`] with tokio tasks on an explicit
//! scheduler. Both binaries share the command line defined here.

use clap::{Parser, ValueEnum};
use conduit::Config;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod tasks;
pub mod threads;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Scenario {
    All,
    Unbuffered,
    Buffered,
    Closing,
    Range,
    BasicSelect,
    MultipleReady,
    SelectDefault,
    SelectTimeout,
    SelectLoop,
    Directional,
    SelectSend,
    WorkerPool,
    FanIn,
    PingPong,
    SafeCounter,
    WaitGroup,
}

impl Scenario {
    /// Every concrete scenario, in the order `all` runs them.
    pub const EACH: [Scenario; 16] = [
        Scenario::Unbuffered,
        Scenario::Buffered,
        Scenario::Closing,
        Scenario::Range,
        Scenario::BasicSelect,
        Scenario::MultipleReady,
        Scenario::SelectDefault,
        Scenario::SelectTimeout,
        Scenario::SelectLoop,
        Scenario::Directional,
        Scenario::SelectSend,
        Scenario::WorkerPool,
        Scenario::FanIn,
        Scenario::PingPong,
        Scenario::SafeCounter,
        Scenario::WaitGroup,
    ];

    pub fn expand(self) -> Vec<Scenario> {
        match self {
            Scenario::All => Scenario::EACH.to_vec(),
            one => vec![one],
        }
    }
}

#[derive(Debug, Parser)]
#[command(about = "Channel, select, worker pool and fan-in scenarios")]
pub struct Args {
    /// Which scenario to run.
    #[arg(short, long, value_enum, default_value_t = Scenario::All)]
    pub scenario: Scenario,

    /// TOML file overriding scheduler and pool settings.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

impl Args {
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let config = match &self.config {
            Some(path) => Config::from_path(path)?,
            None => Config::default(),
        };
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }
}

/// Installs the fmt subscriber, filtered by `RUST_LOG` and defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
