/// Defines a contract for types that periodically publish gauges.
///
/// Counters and histograms are recorded where the event happens; reporters cover state that is
/// only known by looking at it, such as the persisted progress of every source.
pub trait MetricsReporter {
    /// Reports the current state of the implementing type.
    fn report_metrics(&self);
}
