/// Sink for named scalar series tagged with the iteration index.
///
/// Logging is observability, not control: the signatures are infallible and
/// implementations are expected to swallow their own failures — a broken
/// sink must never abort training.
pub trait TrainLogger {
    /// Records one scalar under `tag` at iteration `it`.
    fn scalar(&mut self, tag: &str, value: f64, it: usize);

    /// Records several related scalars under a shared `tag` (e.g. train vs
    /// eval curves of the same metric).
    fn scalars(&mut self, tag: &str, series: &[(&str, f64)], it: usize);
}

/// Discards everything.  The default when no sink is attached.
#[derive(Debug, Default)]
pub struct NullLogger;

impl TrainLogger for NullLogger {
    fn scalar(&mut self, _tag: &str, _value: f64, _it: usize) {}

    fn scalars(&mut self, _tag: &str, _series: &[(&str, f64)], _it: usize) {}
}
