//! Node connectivity signal.
//!
//! A probe source is called on a fixed period and the round-trip latency is
//! mapped onto a signal level shown next to the node status.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::config::{BinderConfig, SignalThresholds};
use crate::models::SourceDescriptor;
use crate::source::ChainDataSource;

/// Signal strength derived from probe latency.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum SignalLevel {
    /// No successful probe yet, or the last probe was rejected.
    Offline,
    Weak,
    Medium,
    Full,
}

impl SignalLevel {
    /// Map a probe latency onto a level.
    pub fn classify(latency: Duration, thresholds: &SignalThresholds) -> Self {
        if latency < thresholds.full_below {
            Self::Full
        } else if latency < thresholds.medium_below {
            Self::Medium
        } else {
            Self::Weak
        }
    }

    /// Number of bars: 3 for full down to 0 for offline.
    pub fn level(self) -> u8 {
        match self {
            Self::Offline => 0,
            Self::Weak => 1,
            Self::Medium => 2,
            Self::Full => 3,
        }
    }
}

impl fmt::Display for SignalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Offline => write!(f, "offline"),
            Self::Weak => write!(f, "weak"),
            Self::Medium => write!(f, "medium"),
            Self::Full => write!(f, "full"),
        }
    }
}

/// Background latency probe publishing a [`SignalLevel`].
///
/// Stops on [`stop`](Self::stop) or when dropped.
pub struct ConnectivityMonitor {
    level: watch::Receiver<SignalLevel>,
    task: JoinHandle<()>,
}

impl ConnectivityMonitor {
    /// Start probing `probe` on the configured period.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn(
        source: Arc<dyn ChainDataSource>,
        probe: SourceDescriptor,
        config: &BinderConfig,
    ) -> Self {
        let (tx, level) = watch::channel(SignalLevel::Offline);
        let period = config.connectivity.probe_period;
        let thresholds = config.connectivity.thresholds.clone();
        let endpoint = config.active_endpoint().ws_url.clone();

        info!(
            "Connectivity probe for {} every {:?} via '{}'",
            endpoint,
            period,
            probe.name()
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let started = Instant::now();
                let next = match source.call(probe.name(), probe.params()).await {
                    Ok(_) => SignalLevel::classify(started.elapsed(), &thresholds),
                    Err(error) => {
                        debug!("Connectivity probe to {} failed: {}", endpoint, error);
                        SignalLevel::Offline
                    }
                };

                let previous = tx.send_replace(next);
                if previous != next {
                    info!("Signal to {} changed: {} -> {}", endpoint, previous, next);
                }
            }
        });

        Self { level, task }
    }

    /// Most recently published level.
    pub fn level(&self) -> SignalLevel {
        *self.level.borrow()
    }

    /// Receiver that observes every level change.
    pub fn watch(&self) -> watch::Receiver<SignalLevel> {
        self.level.clone()
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ChainDataError;
    use crate::models::RawValue;
    use crate::source::MockChainSource;

    #[test]
    fn test_classify_boundaries() {
        let thresholds = SignalThresholds::default();
        assert_eq!(
            SignalLevel::classify(Duration::ZERO, &thresholds),
            SignalLevel::Full
        );
        assert_eq!(
            SignalLevel::classify(Duration::from_millis(99), &thresholds),
            SignalLevel::Full
        );
        assert_eq!(
            SignalLevel::classify(Duration::from_millis(100), &thresholds),
            SignalLevel::Medium
        );
        assert_eq!(
            SignalLevel::classify(Duration::from_millis(299), &thresholds),
            SignalLevel::Medium
        );
        assert_eq!(
            SignalLevel::classify(Duration::from_millis(300), &thresholds),
            SignalLevel::Weak
        );
        assert_eq!(
            SignalLevel::classify(Duration::from_secs(30), &thresholds),
            SignalLevel::Weak
        );
    }

    #[test]
    fn test_levels() {
        assert_eq!(SignalLevel::Full.level(), 3);
        assert_eq!(SignalLevel::Medium.level(), 2);
        assert_eq!(SignalLevel::Weak.level(), 1);
        assert_eq!(SignalLevel::Offline.level(), 0);
        assert!(SignalLevel::Full > SignalLevel::Weak);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_tracks_probe_latency() {
        let source = MockChainSource::new();
        source
            .respond_with("getBlockNumber", RawValue::BlockNumber(1))
            .delay("getBlockNumber", Duration::from_millis(150));

        let monitor = ConnectivityMonitor::spawn(
            Arc::new(source.clone()),
            SourceDescriptor::one_shot("getBlockNumber"),
            &BinderConfig::default(),
        );
        assert_eq!(monitor.level(), SignalLevel::Offline);

        let mut rx = monitor.watch();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SignalLevel::Medium);
    }

    #[tokio::test(start_paused = true)]
    async fn test_monitor_reports_offline_on_rejection() {
        let source = MockChainSource::new();
        source
            .respond_with("getBlockNumber", RawValue::BlockNumber(1))
            .respond(
                "getBlockNumber",
                Err(ChainDataError::rejected("getBlockNumber", "refused")),
            );

        let monitor = ConnectivityMonitor::spawn(
            Arc::new(source.clone()),
            SourceDescriptor::one_shot("getBlockNumber"),
            &BinderConfig::default(),
        );

        let mut rx = monitor.watch();
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SignalLevel::Full);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), SignalLevel::Offline);

        monitor.stop();
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.call_count("getBlockNumber"), 2);
    }
}
