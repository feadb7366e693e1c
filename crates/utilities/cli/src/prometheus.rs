//! Utilities for spinning up a prometheus metrics server.

use crate::PrometheusError;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, SocketAddr, TcpListener};

/// Starts a Prometheus metrics server on `addr:metrics_port` and installs it as the global
/// recorder. Port `0` binds an OS-assigned port.
///
/// Returns the address the exporter listens on.
pub fn init_prometheus_server(
    addr: IpAddr,
    metrics_port: u16,
) -> Result<SocketAddr, PrometheusError> {
    let listen_addr = if metrics_port == 0 {
        // The builder binds its own socket, so reserve a port and release it again.
        let listener = TcpListener::bind((addr, 0))?;
        listener.local_addr()?
    } else {
        SocketAddr::from((addr, metrics_port))
    };

    PrometheusBuilder::new().with_http_listener(listen_addr).install()?;

    info!(target: "prometheus", "Serving metrics at: http://{}", listen_addr);
    Ok(listen_addr)
}
