//! The TOML configuration file and its merge with the command line.

use anyhow::{Context as _, Result};
use chainscope_api::ApiConfig;
use chainscope_client::{DEFAULT_REQUEST_TIMEOUT, DEFAULT_RPC_TIMEOUT};
use chainscope_scanner::DEFAULT_BATCH_SIZE;
use chainscope_validators::{DEFAULT_VALIDATOR_CONCURRENCY, ValidatorMethods};
use serde::Deserialize;
use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::Path,
    time::Duration,
};
use url::Url;

/// Default port of the HTTP API.
pub const DEFAULT_PORT: u16 = 8080;

/// Settings read from a `--config` file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    /// URL of the JSON-RPC endpoint.
    pub rpc_url: Option<Url>,
    /// Address the API binds to.
    pub listen_addr: Option<IpAddr>,
    /// Port the API binds to.
    pub port: Option<u16>,
    /// Deadline of every API request, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Transport timeout of every JSON-RPC call, in seconds.
    pub rpc_timeout_secs: Option<u64>,
    /// Blocks fetched concurrently by the chain-wide feeds.
    pub scan_batch_size: Option<usize>,
    /// Concurrent validator detail lookups.
    pub validator_concurrency: Option<usize>,
    /// Validator JSON-RPC method names.
    pub validator_methods: Option<ValidatorMethods>,
}

impl FileConfig {
    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }
}

/// The effective configuration of the explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplorerConfig {
    /// URL of the JSON-RPC endpoint.
    pub rpc_url: Url,
    /// Socket the API binds to.
    pub listen: SocketAddr,
    /// Transport timeout of every JSON-RPC call.
    pub rpc_timeout: Duration,
    /// API tunables.
    pub api: ApiConfig,
    /// Validator JSON-RPC method names.
    pub validator_methods: ValidatorMethods,
}

/// Values given on the command line. `None` defers to the file, then to the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// URL of the JSON-RPC endpoint.
    pub rpc_url: Option<Url>,
    /// Address the API binds to.
    pub listen_addr: Option<IpAddr>,
    /// Port the API binds to.
    pub port: Option<u16>,
    /// Deadline of every API request, in seconds.
    pub request_timeout_secs: Option<u64>,
    /// Transport timeout of every JSON-RPC call, in seconds.
    pub rpc_timeout_secs: Option<u64>,
    /// Blocks fetched concurrently by the chain-wide feeds.
    pub scan_batch_size: Option<usize>,
    /// Concurrent validator detail lookups.
    pub validator_concurrency: Option<usize>,
}

impl ExplorerConfig {
    /// Merges command line values over the file.
    ///
    /// Fails only if no RPC URL is given anywhere.
    pub fn resolve(cli: Overrides, file: FileConfig) -> Result<Self> {
        let rpc_url = cli
            .rpc_url
            .or(file.rpc_url)
            .context("No RPC URL configured, pass --rpc-url or set rpc-url in the config file")?;
        let listen_addr =
            cli.listen_addr.or(file.listen_addr).unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = cli.port.or(file.port).unwrap_or(DEFAULT_PORT);

        Ok(Self {
            rpc_url,
            listen: SocketAddr::new(listen_addr, port),
            rpc_timeout: cli
                .rpc_timeout_secs
                .or(file.rpc_timeout_secs)
                .map_or(DEFAULT_RPC_TIMEOUT, Duration::from_secs),
            api: ApiConfig {
                request_timeout: cli
                    .request_timeout_secs
                    .or(file.request_timeout_secs)
                    .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs),
                scan_batch_size: cli
                    .scan_batch_size
                    .or(file.scan_batch_size)
                    .unwrap_or(DEFAULT_BATCH_SIZE),
                validator_concurrency: cli
                    .validator_concurrency
                    .or(file.validator_concurrency)
                    .unwrap_or(DEFAULT_VALIDATOR_CONCURRENCY),
            },
            validator_methods: file.validator_methods.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_defaults() {
        let overrides = Overrides { rpc_url: Some(url("http://node:8545")), ..Default::default() };
        let config = ExplorerConfig::resolve(overrides, FileConfig::default()).unwrap();
        assert_eq!(config.listen, SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));
        assert_eq!(config.rpc_timeout, Duration::from_secs(15));
        assert_eq!(config.api, ApiConfig::default());
        assert_eq!(config.validator_methods, ValidatorMethods::default());
    }

    #[test]
    fn test_missing_rpc_url() {
        assert!(ExplorerConfig::resolve(Overrides::default(), FileConfig::default()).is_err());
    }

    #[test]
    fn test_cli_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
rpc-url = "http://file:8545"
port = 9000
scan-batch-size = 5
request-timeout-secs = 30

[validator-methods]
list = ["custom_list"]
"#
        )
        .unwrap();
        let file = FileConfig::load(file.path()).unwrap();

        let overrides = Overrides { port: Some(7000), ..Default::default() };
        let config = ExplorerConfig::resolve(overrides, file).unwrap();
        assert_eq!(config.rpc_url, url("http://file:8545"));
        assert_eq!(config.listen.port(), 7000);
        assert_eq!(config.api.scan_batch_size, 5);
        assert_eq!(config.api.request_timeout, Duration::from_secs(30));
        assert_eq!(config.validator_methods.list, vec!["custom_list".to_string()]);
        assert_eq!(config.validator_methods.detail, ValidatorMethods::default().detail);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rpc_endpoint = \"http://node\"").unwrap();
        assert!(FileConfig::load(file.path()).is_err());
    }
}
