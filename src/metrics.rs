//! Performance metrics for the prediction service.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for the inference service
pub struct ServiceMetrics {
    /// Total predictions served
    pub predictions: AtomicU64,
    /// Predictions that came back FRAUD
    pub fraud_verdicts: AtomicU64,
    /// Requests rejected as invalid input
    pub invalid_inputs: AtomicU64,
    /// End-to-end handler latencies (microseconds)
    latencies: RwLock<Vec<u64>>,
    /// Probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for throughput calculation
    start_time: Instant,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self {
            predictions: AtomicU64::new(0),
            fraud_verdicts: AtomicU64::new(0),
            invalid_inputs: AtomicU64::new(0),
            latencies: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a served prediction
    pub fn record_prediction(&self, latency: Duration, probability: f64, is_fraud: bool) {
        self.predictions.fetch_add(1, Ordering::Relaxed);
        if is_fraud {
            self.fraud_verdicts.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut latencies) = self.latencies.write() {
            latencies.push(latency.as_micros() as u64);
            // Bound memory under sustained load
            if latencies.len() > 10_000 {
                latencies.drain(0..5_000);
            }
        }

        let bucket = (probability * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Record a request rejected before scoring
    pub fn record_invalid_input(&self) {
        self.invalid_inputs.fetch_add(1, Ordering::Relaxed);
    }

    /// Latency statistics over the retained window
    pub fn latency_stats(&self) -> LatencyStats {
        let latencies = match self.latencies.read() {
            Ok(l) => l,
            Err(_) => return LatencyStats::default(),
        };
        if latencies.is_empty() {
            return LatencyStats::default();
        }

        let mut sorted = latencies.clone();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        LatencyStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
        }
    }

    /// Predictions per second since startup
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Probability histogram, ten equal buckets over [0, 1]
    pub fn probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|b| *b)
            .unwrap_or([0; 10])
    }

    /// Log a summary of service activity
    pub fn print_summary(&self) {
        let predictions = self.predictions.load(Ordering::Relaxed);
        let fraud = self.fraud_verdicts.load(Ordering::Relaxed);
        let invalid = self.invalid_inputs.load(Ordering::Relaxed);
        let fraud_rate = if predictions > 0 {
            (fraud as f64 / predictions as f64) * 100.0
        } else {
            0.0
        };
        let stats = self.latency_stats();

        info!(
            predictions,
            fraud_verdicts = fraud,
            fraud_rate = format!("{fraud_rate:.1}%"),
            invalid_inputs = invalid,
            throughput = format!("{:.1} req/s", self.throughput()),
            "Service summary"
        );
        info!(
            mean_us = stats.mean_us,
            p50_us = stats.p50_us,
            p95_us = stats.p95_us,
            p99_us = stats.p99_us,
            "Prediction latency"
        );

        let distribution = self.probability_distribution();
        let total: u64 = distribution.iter().sum();
        if total > 0 {
            for (i, &count) in distribution.iter().enumerate() {
                let pct = (count as f64 / total as f64) * 100.0;
                info!(
                    bucket = format!("{:.1}-{:.1}", i as f64 / 10.0, (i + 1) as f64 / 10.0),
                    count,
                    pct = format!("{pct:.1}%"),
                    "Probability bucket"
                );
            }
        }
    }
}

impl Default for ServiceMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Handler latency statistics
#[derive(Debug, Default)]
pub struct LatencyStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}

/// Periodic metrics summary task
pub struct MetricsReporter {
    metrics: std::sync::Arc<ServiceMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: std::sync::Arc<ServiceMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Run the reporting loop
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_recording() {
        let metrics = ServiceMetrics::new();

        metrics.record_prediction(Duration::from_micros(120), 0.82, true);
        metrics.record_prediction(Duration::from_micros(90), 0.12, false);
        metrics.record_invalid_input();

        assert_eq!(metrics.predictions.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.fraud_verdicts.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.invalid_inputs.load(Ordering::Relaxed), 1);

        let distribution = metrics.probability_distribution();
        assert_eq!(distribution[8], 1);
        assert_eq!(distribution[1], 1);
    }

    #[test]
    fn test_latency_stats() {
        let metrics = ServiceMetrics::new();
        for us in [100_u64, 200, 300, 400] {
            metrics.record_prediction(Duration::from_micros(us), 0.5, false);
        }

        let stats = metrics.latency_stats();
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean_us, 250);
        assert_eq!(stats.p50_us, 300);
    }
}
