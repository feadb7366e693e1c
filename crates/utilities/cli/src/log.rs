//! Logging arguments and the tracing subscriber.

use crate::{CliError, CliResult};
use clap::{ArgAction, Args};
use tracing_subscriber::{EnvFilter, filter::LevelFilter};

/// Logging arguments.
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogArgs {
    /// Verbosity level: `-v` info, `-vv` debug, `-vvv` trace. Warnings and errors are always
    /// shown. `RUST_LOG` takes precedence when set.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbosity: u8,
}

impl LogArgs {
    /// Installs the global tracing subscriber at the configured verbosity.
    pub fn init_tracing(&self) -> CliResult<()> {
        init_tracing_subscriber(self.verbosity, None::<EnvFilter>)
    }
}

/// Maps a `-v` count onto a level filter.
pub const fn verbosity_level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// Installs a fmt subscriber as the global default.
///
/// Without an explicit `env_filter`, directives are read from `RUST_LOG` and fall back to the
/// level of `verbosity`.
pub fn init_tracing_subscriber(
    verbosity: u8,
    env_filter: Option<impl Into<EnvFilter>>,
) -> CliResult<()> {
    let filter = env_filter.map(Into::into).unwrap_or_else(|| {
        EnvFilter::builder()
            .with_default_directive(verbosity_level(verbosity).into())
            .from_env_lossy()
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| CliError::Tracing(e.to_string()))
}
