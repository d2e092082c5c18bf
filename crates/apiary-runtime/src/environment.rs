//! Environment threat generator.
//!
//! An optional background task that plays the world outside the hive:
//! it reports threats of random severity on a jittered interval until it is
//! stopped or the threat queue shuts down. Disabled by default so tests can
//! inject threats deterministically through `Colony::report_threat`.

use apiary_core::config::EnvironmentConfig;
use apiary_core::metrics::ColonyMetrics;
use apiary_core::threats::ThreatQueue;
use apiary_core::types::{Severity, ThreatEvent};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info};

/// Background producer of random-severity threats.
pub struct ThreatGenerator {
    threats: Arc<ThreatQueue>,
    metrics: Arc<ColonyMetrics>,
    config: EnvironmentConfig,
    stop: watch::Receiver<bool>,
}

impl ThreatGenerator {
    pub fn new(
        threats: Arc<ThreatQueue>,
        metrics: Arc<ColonyMetrics>,
        config: EnvironmentConfig,
        stop: watch::Receiver<bool>,
    ) -> Self {
        Self {
            threats,
            metrics,
            config,
            stop,
        }
    }

    pub async fn run(mut self) {
        info!("threat generator started");
        loop {
            let delay = self.config.mean_interval + jitter(self.config.jitter);
            tokio::select! {
                _ = sleep(delay) => {}
                _ = stop_raised(&mut self.stop) => break,
            }
            if *self.stop.borrow() {
                break;
            }

            let severity = sample_severity(&self.config.severity_weights);
            match self.threats.report(ThreatEvent::new(severity)).await {
                Ok(arrived_at) => {
                    self.metrics.record_threat_reported();
                    debug!(%severity, arrived_at, "threat generated");
                }
                // Queue shut down: the colony is stopping.
                Err(_) => break,
            }
        }
        info!("threat generator stopped");
    }
}

/// Resolve when the stop flag is raised (or the sender is gone).
async fn stop_raised(stop: &mut watch::Receiver<bool>) {
    loop {
        if *stop.borrow() {
            return;
        }
        if stop.changed().await.is_err() {
            return;
        }
    }
}

fn jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    let mut rng = rand::thread_rng();
    Duration::from_millis(rng.gen_range(0..=max_ms))
}

fn sample_severity(weights: &[u32; 3]) -> Severity {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return Severity::Low;
    }
    let roll = rand::thread_rng().gen_range(0..total);
    severity_for_roll(weights, roll)
}

/// Map a roll in `0..sum(weights)` to a severity class. Weights are ordered
/// [Low, Medium, High].
fn severity_for_roll(weights: &[u32; 3], roll: u32) -> Severity {
    if roll < weights[0] {
        Severity::Low
    } else if roll < weights[0] + weights[1] {
        Severity::Medium
    } else {
        Severity::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::timeout;

    #[test]
    fn roll_boundaries_map_to_the_right_class() {
        let weights = [6, 3, 1];
        assert_eq!(severity_for_roll(&weights, 0), Severity::Low);
        assert_eq!(severity_for_roll(&weights, 5), Severity::Low);
        assert_eq!(severity_for_roll(&weights, 6), Severity::Medium);
        assert_eq!(severity_for_roll(&weights, 8), Severity::Medium);
        assert_eq!(severity_for_roll(&weights, 9), Severity::High);
    }

    #[test]
    fn zero_weights_fall_back_to_low() {
        assert_eq!(sample_severity(&[0, 0, 0]), Severity::Low);
    }

    #[tokio::test]
    async fn generator_reports_until_stopped() {
        let threats = Arc::new(ThreatQueue::new());
        let metrics = Arc::new(ColonyMetrics::new());
        let (stop_tx, stop_rx) = watch::channel(false);
        let generator = ThreatGenerator::new(
            Arc::clone(&threats),
            Arc::clone(&metrics),
            EnvironmentConfig {
                enabled: true,
                mean_interval: Duration::from_millis(1),
                jitter: Duration::ZERO,
                severity_weights: [1, 1, 1],
            },
            stop_rx,
        );
        let task = tokio::spawn(generator.run());

        timeout(Duration::from_secs(5), async {
            while metrics.snapshot().threats_reported < 3 {
                sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("generator produced nothing");

        stop_tx.send(true).unwrap();
        timeout(Duration::from_secs(5), task)
            .await
            .expect("generator ignored stop")
            .unwrap();
        assert!(threats.backlog().await >= 3);
    }

    #[tokio::test]
    async fn generator_exits_when_the_queue_shuts_down() {
        let threats = Arc::new(ThreatQueue::new());
        let metrics = Arc::new(ColonyMetrics::new());
        threats.shutdown().await;

        let (_stop_tx, stop_rx) = watch::channel(false);
        let generator = ThreatGenerator::new(
            threats,
            metrics,
            EnvironmentConfig {
                enabled: true,
                mean_interval: Duration::from_millis(1),
                jitter: Duration::ZERO,
                severity_weights: [1, 0, 0],
            },
            stop_rx,
        );
        timeout(Duration::from_secs(5), tokio::spawn(generator.run()))
            .await
            .expect("generator did not observe queue shutdown")
            .unwrap();
    }
}
