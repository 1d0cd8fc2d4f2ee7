use metrics::{Label, SharedString, Unit};
use std::time::Duration;

/// Names of the three series recorded for every observed call: a success counter, an error
/// counter and a duration histogram. Each series is labelled with the called `method`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallMetrics {
    /// Counter of calls returning `Ok`.
    pub success_total: &'static str,
    /// Counter of calls returning `Err`.
    pub error_total: &'static str,
    /// Histogram of call durations in seconds.
    pub duration_seconds: &'static str,
}

impl CallMetrics {
    /// Describes the series, `subject` being a short human readable name such as
    /// `"indexer storage"`.
    pub fn describe(&self, subject: &str) {
        metrics::describe_counter!(
            self.success_total,
            Unit::Count,
            SharedString::from(format!("Total number of successful {subject} requests"))
        );
        metrics::describe_counter!(
            self.error_total,
            Unit::Count,
            SharedString::from(format!("Total number of failed {subject} requests"))
        );
        metrics::describe_histogram!(
            self.duration_seconds,
            Unit::Seconds,
            SharedString::from(format!("Duration of {subject} requests"))
        );
    }

    /// Registers every series of `method` with a zero value.
    pub fn zero(&self, method: &'static str, labels: &[Label]) {
        let labels = Self::labels(method, labels);
        metrics::counter!(self.success_total, labels.clone()).increment(0);
        metrics::counter!(self.error_total, labels.clone()).increment(0);
        metrics::histogram!(self.duration_seconds, labels).record(0.0);
    }

    /// Records the outcome of a single call.
    pub fn record<T, E>(
        &self,
        method: &'static str,
        labels: &[Label],
        result: &Result<T, E>,
        elapsed: Duration,
    ) {
        let labels = Self::labels(method, labels);
        let counter = if result.is_ok() { self.success_total } else { self.error_total };
        metrics::counter!(counter, labels.clone()).increment(1);
        metrics::histogram!(self.duration_seconds, labels).record(elapsed.as_secs_f64());
    }

    fn labels(method: &'static str, labels: &[Label]) -> Vec<Label> {
        let mut all = Vec::with_capacity(labels.len() + 1);
        all.push(Label::new("method", method));
        all.extend_from_slice(labels);
        all
    }
}
