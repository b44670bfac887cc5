use crate::metrics::measurement::Measurement;

/// Streaming, sample-count-weighted accumulator over `Measurement`s.
///
/// Per-sample metric fields are weighted by the batch size passed to
/// `update`; the two timing fields are weighted by one call each (a batch of
/// 32 costs one data fetch, not 32).  Only incremental sums are kept —
/// memory is O(1) in the length of the stream.
#[derive(Debug, Default)]
pub struct AverageMeter {
    /// Number of `update` calls (the weight for timing fields).
    count: usize,
    /// Σ n over all updates (the weight for per-sample fields).
    total_weight: usize,
    sum_silog: f64,
    sum_squared_rel: f64,
    sum_absrel: f64,
    sum_irmse: f64,
    sum_loss: f64,
    sum_data_time: f64,
    sum_gpu_time: f64,
    sum_valid: usize,
}

impl AverageMeter {
    pub fn new() -> AverageMeter {
        AverageMeter::default()
    }

    /// Zeroes all running state.  The next `average()` is invalid until at
    /// least one `update` has been folded in.
    pub fn reset(&mut self) {
        *self = AverageMeter::default();
    }

    /// Folds one weighted observation into the running sums.
    ///
    /// `n` is the batch size behind `result`.  An `n == 0` update is a no-op
    /// so it can never corrupt the running state (real batches are always at
    /// least one sample by construction of the data collaborator).
    pub fn update(&mut self, result: &Measurement, gpu_time: f64, data_time: f64, n: usize) {
        if n == 0 {
            return;
        }
        let w = n as f64;
        self.sum_silog += result.silog * w;
        self.sum_squared_rel += result.squared_rel * w;
        self.sum_absrel += result.absrel * w;
        self.sum_irmse += result.irmse * w;
        self.sum_loss += result.loss * w;
        self.sum_data_time += data_time;
        self.sum_gpu_time += gpu_time;
        self.sum_valid += result.valid_count;
        self.total_weight += n;
        self.count += 1;
    }

    /// The weighted running mean as a derived `Measurement`.  Pure; callable
    /// any number of times.
    ///
    /// # Panics
    /// Panics on a meter with no updates.  The loop guarantees at least one
    /// update per phase, so reaching the assert is a contract violation —
    /// failing loudly beats returning a garbage average.
    pub fn average(&self) -> Measurement {
        assert!(
            self.count > 0,
            "AverageMeter::average() called with no recorded updates"
        );
        let w = self.total_weight as f64;
        let c = self.count as f64;
        Measurement {
            silog: self.sum_silog / w,
            squared_rel: self.sum_squared_rel / w,
            absrel: self.sum_absrel / w,
            irmse: self.sum_irmse / w,
            loss: self.sum_loss / w,
            data_time: self.sum_data_time / c,
            gpu_time: self.sum_gpu_time / c,
            valid_count: self.sum_valid,
        }
    }

    /// Number of `update` calls folded in since the last reset.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Σ n over all updates since the last reset.
    pub fn total_weight(&self) -> usize {
        self.total_weight
    }
}
