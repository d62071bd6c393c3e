//! Command-line and environment configuration for the balancer binary.

use anyhow::Context;
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use crate::ring::{DEFAULT_NUM_SLOTS, DEFAULT_VIRTUAL_NODES, RingConfig};

/// Consistent-hash load balancer with automatic node recovery.
#[derive(Parser, Debug, Clone)]
#[command(name = "ring-balancer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address the control surface listens on
    #[arg(short, long, default_value = "0.0.0.0:5000", env = "BALANCER_BIND")]
    pub bind: SocketAddr,

    /// Number of slots on the hash ring
    #[arg(long, default_value_t = DEFAULT_NUM_SLOTS, env = "BALANCER_NUM_SLOTS")]
    pub num_slots: usize,

    /// Virtual nodes placed per server
    #[arg(long, default_value_t = DEFAULT_VIRTUAL_NODES, env = "BALANCER_VIRTUAL_NODES")]
    pub virtual_nodes: usize,

    /// Upper bound on every provisioning, health-check and invocation call
    #[arg(long, default_value = "2000", env = "BALANCER_CALL_TIMEOUT_MS")]
    pub call_timeout_ms: u64,

    /// Interface the backend nodes bind to
    #[arg(long, default_value = "127.0.0.1", env = "BALANCER_BACKEND_HOST")]
    pub backend_host: IpAddr,

    /// Nodes to start with (comma-separated), e.g. S1,S2,S3
    #[arg(long, value_delimiter = ',', env = "BALANCER_NODES")]
    pub nodes: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "RUST_LOG")]
    pub log_level: String,
}

impl Cli {
    pub fn ring_config(&self) -> anyhow::Result<RingConfig> {
        let config = RingConfig::new(self.num_slots, self.virtual_nodes);
        config
            .validate()
            .map_err(anyhow::Error::msg)
            .context("invalid ring configuration")?;
        Ok(config)
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Initial node names with blanks dropped.
    pub fn initial_nodes(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["ring-balancer"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_overrides_are_applied() {
        let cli = parse(&[
            "--bind",
            "127.0.0.1:6000",
            "--num-slots",
            "64",
            "--virtual-nodes",
            "4",
            "--call-timeout-ms",
            "250",
            "--nodes",
            "S1, S2,,S3",
        ]);

        assert_eq!(cli.bind.port(), 6000);
        assert_eq!(cli.ring_config().unwrap(), RingConfig::new(64, 4));
        assert_eq!(cli.call_timeout(), Duration::from_millis(250));
        assert_eq!(cli.initial_nodes(), vec!["S1", "S2", "S3"]);
    }

    #[test]
    fn test_defaults_match_ring_defaults() {
        let cli = parse(&["--bind", "127.0.0.1:5000"]);

        assert_eq!(cli.ring_config().unwrap(), RingConfig::default());
        assert_eq!(cli.num_slots, DEFAULT_NUM_SLOTS);
        assert_eq!(cli.virtual_nodes, DEFAULT_VIRTUAL_NODES);
    }

    #[test]
    fn test_invalid_ring_is_rejected() {
        let cli = parse(&["--num-slots", "4", "--virtual-nodes", "9"]);

        let err = cli.ring_config().unwrap_err();
        assert!(format!("{:#}", err).contains("cannot exceed"));
    }
}
