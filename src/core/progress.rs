use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts finished units across concurrent tasks and reports every
/// `every`-th one as `Processed N/M <unit>...`.
pub struct Progress {
    unit: &'static str,
    total: usize,
    every: usize,
    done: AtomicUsize,
}

impl Progress {
    pub fn new(unit: &'static str, total: usize, every: usize) -> Self {
        Self {
            unit,
            total,
            every: every.max(1),
            done: AtomicUsize::new(0),
        }
    }

    /// Records one finished unit. Returns the progress line when this unit
    /// lands on the reporting interval.
    pub fn advance(&self) -> Option<String> {
        let finished = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        (finished % self.every == 0)
            .then(|| format!("Processed {}/{} {}...", finished, self.total, self.unit))
    }

    /// Like [`Progress::advance`], printing the line to stderr.
    pub fn tick(&self) {
        if let Some(line) = self.advance() {
            eprintln!("{}", line);
        }
    }
}
