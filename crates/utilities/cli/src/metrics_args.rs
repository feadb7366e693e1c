//! Prometheus exporter arguments.

use crate::{CliResult, init_prometheus_server};
use clap::Args;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Prometheus exporter arguments.
#[derive(Args, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsArgs {
    /// Port of the Prometheus endpoint. Metrics are disabled when absent.
    #[arg(long = "metrics-port", env = "CHAINSCOPE_METRICS_PORT")]
    pub metrics_port: Option<u16>,
    /// Address the Prometheus endpoint binds to.
    #[arg(long = "metrics-addr", env = "CHAINSCOPE_METRICS_ADDR", default_value = "0.0.0.0")]
    pub metrics_addr: IpAddr,
}

impl Default for MetricsArgs {
    fn default() -> Self {
        Self { metrics_port: None, metrics_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED) }
    }
}

impl MetricsArgs {
    /// Starts the exporter if a port is configured.
    pub fn init_metrics(&self) -> CliResult<Option<SocketAddr>> {
        self.metrics_port
            .map(|port| init_prometheus_server(self.metrics_addr, port))
            .transpose()
            .map_err(Into::into)
    }
}
