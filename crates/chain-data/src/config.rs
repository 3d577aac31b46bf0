//! Binder configuration.
//!
//! Loaded from `ODIN_*` environment variables (a `.env` file is honoured).
//! Missing or malformed values fall back to the defaults below.

use std::time::Duration;

use log::warn;

const DEFAULT_LOCAL_RPC_URL: &str = "http://localhost:9933";
const DEFAULT_LOCAL_WS_URL: &str = "ws://localhost:9944";
const DEFAULT_REMOTE_RPC_URL: &str = "http://cennznet-node-0.centrality.me:9933";
const DEFAULT_REMOTE_WS_URL: &str = "ws://cennznet-node-0.centrality.me:9944";

/// Block height polling cadence.
const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

/// Latency probe cadence.
const DEFAULT_PROBE_PERIOD_MS: u64 = 10_000;

const DEFAULT_FULL_SIGNAL_MS: u64 = 100;
const DEFAULT_MEDIUM_SIGNAL_MS: u64 = 300;

/// Which node the wallet talks to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Network {
    #[default]
    Local,
    Remote,
}

/// JSON-RPC and WebSocket URLs of one node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoint {
    pub rpc_url: String,
    pub ws_url: String,
}

/// Local and remote node endpoints.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Endpoints {
    pub local: Endpoint,
    pub remote: Endpoint,
}

impl Endpoints {
    pub fn active(&self, network: Network) -> &Endpoint {
        match network {
            Network::Local => &self.local,
            Network::Remote => &self.remote,
        }
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            local: Endpoint {
                rpc_url: DEFAULT_LOCAL_RPC_URL.to_string(),
                ws_url: DEFAULT_LOCAL_WS_URL.to_string(),
            },
            remote: Endpoint {
                rpc_url: DEFAULT_REMOTE_RPC_URL.to_string(),
                ws_url: DEFAULT_REMOTE_WS_URL.to_string(),
            },
        }
    }
}

/// Latency upper bounds for each signal level.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignalThresholds {
    /// Latencies below this are a full signal.
    pub full_below: Duration,
    /// Latencies below this (and not full) are a medium signal.
    pub medium_below: Duration,
}

impl Default for SignalThresholds {
    fn default() -> Self {
        Self {
            full_below: Duration::from_millis(DEFAULT_FULL_SIGNAL_MS),
            medium_below: Duration::from_millis(DEFAULT_MEDIUM_SIGNAL_MS),
        }
    }
}

/// Connectivity probe settings.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectivityConfig {
    pub probe_period: Duration,
    pub thresholds: SignalThresholds,
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_period: Duration::from_millis(DEFAULT_PROBE_PERIOD_MS),
            thresholds: SignalThresholds::default(),
        }
    }
}

/// Binder configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BinderConfig {
    pub network: Network,
    pub endpoints: Endpoints,
    /// Interval used by poll-mode descriptors without their own.
    pub poll_interval: Duration,
    pub connectivity: ConnectivityConfig,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            endpoints: Endpoints::default(),
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            connectivity: ConnectivityConfig::default(),
        }
    }
}

impl BinderConfig {
    /// Load from the process environment, after reading `.env` if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let millis = |key: &str, default: Duration| match lookup(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    warn!("Ignoring invalid {}={:?}, using {:?}", key, raw, default);
                    default
                }
            },
        };

        let network = match lookup("ODIN_NETWORK").as_deref().map(str::trim) {
            None => defaults.network,
            Some(value) if value.eq_ignore_ascii_case("local") => Network::Local,
            Some(value) if value.eq_ignore_ascii_case("remote") => Network::Remote,
            Some(value) => {
                warn!("Ignoring unknown ODIN_NETWORK={:?}, using local", value);
                Network::Local
            }
        };

        let endpoints = Endpoints {
            local: Endpoint {
                rpc_url: string("ODIN_LOCAL_RPC_URL", &defaults.endpoints.local.rpc_url),
                ws_url: string("ODIN_LOCAL_WS_URL", &defaults.endpoints.local.ws_url),
            },
            remote: Endpoint {
                rpc_url: string("ODIN_REMOTE_RPC_URL", &defaults.endpoints.remote.rpc_url),
                ws_url: string("ODIN_REMOTE_WS_URL", &defaults.endpoints.remote.ws_url),
            },
        };

        let mut thresholds = SignalThresholds {
            full_below: millis(
                "ODIN_SIGNAL_FULL_MS",
                defaults.connectivity.thresholds.full_below,
            ),
            medium_below: millis(
                "ODIN_SIGNAL_MEDIUM_MS",
                defaults.connectivity.thresholds.medium_below,
            ),
        };
        if thresholds.medium_below < thresholds.full_below {
            warn!(
                "Medium signal bound {:?} is below full bound {:?}, using defaults",
                thresholds.medium_below, thresholds.full_below
            );
            thresholds = SignalThresholds::default();
        }

        Self {
            network,
            endpoints,
            poll_interval: millis("ODIN_POLL_INTERVAL_MS", defaults.poll_interval),
            connectivity: ConnectivityConfig {
                probe_period: millis(
                    "ODIN_LATENCY_PROBE_MS",
                    defaults.connectivity.probe_period,
                ),
                thresholds,
            },
        }
    }

    /// Endpoint of the configured network.
    pub fn active_endpoint(&self) -> &Endpoint {
        self.endpoints.active(self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = BinderConfig::from_lookup(lookup(&[]));
        assert_eq!(config, BinderConfig::default());
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.active_endpoint().rpc_url, "http://localhost:9933");
    }

    #[test]
    fn test_remote_network_selects_remote_endpoint() {
        let config = BinderConfig::from_lookup(lookup(&[
            ("ODIN_NETWORK", "Remote"),
            ("ODIN_REMOTE_WS_URL", "ws://node.example:9944"),
        ]));
        assert_eq!(config.network, Network::Remote);
        assert_eq!(config.active_endpoint().ws_url, "ws://node.example:9944");
    }

    #[test]
    fn test_durations_parse_and_fall_back() {
        let config = BinderConfig::from_lookup(lookup(&[
            ("ODIN_POLL_INTERVAL_MS", "2500"),
            ("ODIN_LATENCY_PROBE_MS", "soon"),
            ("ODIN_SIGNAL_FULL_MS", "0"),
        ]));
        assert_eq!(config.poll_interval, Duration::from_millis(2500));
        assert_eq!(config.connectivity.probe_period, Duration::from_secs(10));
        assert_eq!(
            config.connectivity.thresholds.full_below,
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_inverted_thresholds_reset() {
        let config = BinderConfig::from_lookup(lookup(&[
            ("ODIN_SIGNAL_FULL_MS", "500"),
            ("ODIN_SIGNAL_MEDIUM_MS", "200"),
        ]));
        assert_eq!(config.connectivity.thresholds, SignalThresholds::default());
    }

    #[test]
    fn test_unknown_network_falls_back_to_local() {
        let config = BinderConfig::from_lookup(lookup(&[("ODIN_NETWORK", "mainnet")]));
        assert_eq!(config.network, Network::Local);
    }
}
