//! ## arbor-telemetry::metrics
//! **Prometheus counters and latency histogram for parsing**

use std::time::Duration;

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub documents_parsed: IntCounter,
    pub parse_failures: IntCounter,
    pub bytes_parsed: IntCounter,
    pub parse_latency: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        let documents_parsed =
            IntCounter::new("arbor_documents_parsed_total", "Documents parsed successfully")?;
        let parse_failures =
            IntCounter::new("arbor_parse_failures_total", "Documents rejected with an error")?;
        let bytes_parsed = IntCounter::new("arbor_bytes_parsed_total", "Source bytes read")?;
        let parse_latency = Histogram::with_opts(
            HistogramOpts::new("arbor_parse_latency_seconds", "Time spent parsing one document")
                .buckets(vec![1e-6, 1e-5, 1e-4, 1e-3, 1e-2, 1e-1, 1.0]),
        )?;

        registry.register(Box::new(documents_parsed.clone()))?;
        registry.register(Box::new(parse_failures.clone()))?;
        registry.register(Box::new(bytes_parsed.clone()))?;
        registry.register(Box::new(parse_latency.clone()))?;

        Ok(Self {
            registry,
            documents_parsed,
            parse_failures,
            bytes_parsed,
            parse_latency,
        })
    }

    /// Counts one parse attempt of `bytes` source bytes that took `elapsed`.
    pub fn record_parse(&self, bytes: usize, elapsed: Duration, success: bool) {
        if success {
            self.documents_parsed.inc();
        } else {
            self.parse_failures.inc();
        }
        self.bytes_parsed.inc_by(bytes as u64);
        self.parse_latency.observe(elapsed.as_secs_f64());
    }

    /// Text exposition of every registered metric.
    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_successes_and_failures() {
        let metrics = MetricsRecorder::new().unwrap();
        metrics.record_parse(100, Duration::from_micros(50), true);
        metrics.record_parse(20, Duration::from_micros(5), false);

        assert_eq!(metrics.documents_parsed.get(), 1);
        assert_eq!(metrics.parse_failures.get(), 1);
        assert_eq!(metrics.bytes_parsed.get(), 120);
        assert_eq!(metrics.parse_latency.get_sample_count(), 2);

        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("arbor_documents_parsed_total 1"));
        assert!(text.contains("arbor_parse_latency_seconds_bucket"));
    }
}
