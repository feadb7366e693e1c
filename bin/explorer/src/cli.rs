//! The explorer CLI.

use crate::config::{ExplorerConfig, FileConfig, Overrides};
use anyhow::{Context as _, Result};
use chainscope_api::{ApiState, router, serve};
use chainscope_cli::{LogArgs, MetricsArgs, cli_styles};
use chainscope_client::AlloyChainClientBuilder;
use chainscope_validators::RpcValidatorSource;
use clap::Parser;
use std::{net::IpAddr, path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use url::Url;

/// Read-only explorer backend for an EVM chain.
#[derive(Parser, Clone, Debug)]
#[command(author, version, about, styles = cli_styles(), long_about = None)]
pub struct Cli {
    /// Logging arguments.
    #[command(flatten)]
    pub log: LogArgs,
    /// Prometheus arguments.
    #[command(flatten)]
    pub metrics: MetricsArgs,
    /// TOML file supplying any of the settings below. Flags win over the file.
    #[arg(long, short = 'c', env = "CHAINSCOPE_CONFIG")]
    pub config: Option<PathBuf>,
    /// URL of the JSON-RPC endpoint of the node.
    #[arg(long, env = "CHAINSCOPE_RPC_URL")]
    pub rpc_url: Option<Url>,
    /// Address the HTTP API binds to. Defaults to `0.0.0.0`.
    #[arg(long, env = "CHAINSCOPE_LISTEN_ADDR")]
    pub listen_addr: Option<IpAddr>,
    /// Port the HTTP API binds to. Defaults to `8080`.
    #[arg(long, short = 'p', env = "CHAINSCOPE_PORT")]
    pub port: Option<u16>,
    /// Deadline of every API request in seconds. Defaults to `12`.
    #[arg(long, env = "CHAINSCOPE_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,
    /// Transport timeout of every JSON-RPC call in seconds. Defaults to `15`.
    #[arg(long, env = "CHAINSCOPE_RPC_TIMEOUT_SECS")]
    pub rpc_timeout_secs: Option<u64>,
    /// Blocks fetched concurrently by the chain-wide feeds. Defaults to `20`.
    #[arg(long, env = "CHAINSCOPE_SCAN_BATCH_SIZE")]
    pub scan_batch_size: Option<usize>,
    /// Concurrent validator detail lookups. Defaults to `6`.
    #[arg(long, env = "CHAINSCOPE_VALIDATOR_CONCURRENCY")]
    pub validator_concurrency: Option<usize>,
}

impl Cli {
    /// Runs the explorer until interrupted.
    pub fn run(self) -> Result<()> {
        self.log.init_tracing()?;
        let config = self.resolve()?;
        if let Some(addr) = self.metrics.init_metrics()? {
            chainscope_scanner::Metrics::init();
            chainscope_validators::Metrics::init();
            chainscope_api::Metrics::init();
            debug!(target: "explorer", %addr, "Metrics enabled");
        }

        tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .context("Failed to build the tokio runtime")?
            .block_on(Self::run_server(config))
    }

    /// Merges the flags over the `--config` file.
    pub fn resolve(&self) -> Result<ExplorerConfig> {
        let file = self.config.as_deref().map(FileConfig::load).transpose()?.unwrap_or_default();
        ExplorerConfig::resolve(
            Overrides {
                rpc_url: self.rpc_url.clone(),
                listen_addr: self.listen_addr,
                port: self.port,
                request_timeout_secs: self.request_timeout_secs,
                rpc_timeout_secs: self.rpc_timeout_secs,
                scan_batch_size: self.scan_batch_size,
                validator_concurrency: self.validator_concurrency,
            },
            file,
        )
    }

    async fn run_server(config: ExplorerConfig) -> Result<()> {
        let client = AlloyChainClientBuilder::new(config.rpc_url.clone())
            .timeout(config.rpc_timeout)
            .build()?;
        let source =
            RpcValidatorSource::new(client.provider().clone(), config.validator_methods.clone());
        let state = ApiState::new(Arc::new(client), Arc::new(source), config.api);

        let listener = TcpListener::bind(config.listen)
            .await
            .with_context(|| format!("Failed to bind {}", config.listen))?;
        info!(
            target: "explorer",
            rpc = %config.rpc_url,
            listen = %config.listen,
            request_timeout = ?config.api.request_timeout,
            batch = config.api.scan_batch_size,
            "Starting chainscope"
        );

        serve(listener, router(state), async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!(target: "explorer", %err, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            info!(target: "explorer", "Shutting down");
        })
        .await
        .context("HTTP server failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_flags() {
        let cli = Cli::parse_from([
            "chainscope",
            "--rpc-url",
            "http://localhost:8545",
            "--port",
            "3000",
            "--request-timeout-secs",
            "5",
            "-vv",
        ]);
        assert_eq!(cli.log.verbosity, 2);

        let config = cli.resolve().unwrap();
        assert_eq!(config.listen.port(), 3000);
        assert_eq!(config.api.request_timeout, Duration::from_secs(5));
        assert_eq!(config.api.validator_concurrency, 6);
    }

    #[test]
    fn test_command_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_port_and_metrics_port_are_distinct() {
        let cli = Cli::parse_from([
            "chainscope",
            "--rpc-url",
            "http://localhost:8545",
            "-p",
            "9999",
            "--metrics-port",
            "9090",
        ]);
        assert_eq!(cli.port, Some(9999));
        assert_eq!(cli.metrics.metrics_port, Some(9090));
        assert_eq!(cli.resolve().unwrap().listen.port(), 9999);
    }

    #[test]
    fn test_rejects_bad_url() {
        assert!(Cli::try_parse_from(["chainscope", "--rpc-url", "not a url"]).is_err());
    }
}
