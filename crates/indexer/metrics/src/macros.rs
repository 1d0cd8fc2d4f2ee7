/// Runs `$call`, records its outcome against a [`CallMetrics`](crate::CallMetrics) and returns
/// the result unchanged.
///
/// Extra `key => value` pairs are attached as labels next to the `method` label.
///
/// # Example
/// ```ignore
/// observe_metrics_for_result!(Metrics::STORAGE, "import_batch", db.import(), "source" => id);
/// ```
#[macro_export]
macro_rules! observe_metrics_for_result {
    ($metrics:expr, $method:expr, $call:expr $(, $key:expr => $value:expr )* $(,)?) => {{
        let started = ::std::time::Instant::now();
        let result = $call;
        $metrics.record(
            $method,
            &[$( ::metrics::Label::new($key, ::std::string::ToString::to_string(&$value)) ),*],
            &result,
            started.elapsed(),
        );
        result
    }};
}

/// Async flavour of [`observe_metrics_for_result!`]: awaits `$call` before recording.
#[macro_export]
macro_rules! observe_metrics_for_result_async {
    ($metrics:expr, $method:expr, $call:expr $(, $key:expr => $value:expr )* $(,)?) => {{
        let started = ::std::time::Instant::now();
        let result = $call.await;
        $metrics.record(
            $method,
            &[$( ::metrics::Label::new($key, ::std::string::ToString::to_string(&$value)) ),*],
            &result,
            started.elapsed(),
        );
        result
    }};
}
