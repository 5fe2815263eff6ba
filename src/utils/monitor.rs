use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct RunStats {
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub cpu_usage: f32,
    pub elapsed_time: Duration,
}

#[cfg(feature = "cli")]
pub struct RunMonitor {
    system: std::sync::Mutex<sysinfo::System>,
    pid: Option<sysinfo::Pid>,
    start_time: Instant,
    peak_memory: std::sync::atomic::AtomicU64,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        use sysinfo::{RefreshKind, System};

        let mut system = System::new_with_specifics(RefreshKind::everything());
        system.refresh_all();

        Self {
            system: std::sync::Mutex::new(system),
            pid: sysinfo::get_current_pid().ok(),
            start_time: Instant::now(),
            peak_memory: std::sync::atomic::AtomicU64::new(0),
            enabled,
        }
    }

    pub fn stats(&self) -> Option<RunStats> {
        use std::sync::atomic::Ordering;

        if !self.enabled {
            return None;
        }

        let mut system = self.system.lock().ok()?;
        system.refresh_all();
        let process = system.process(self.pid?)?;
        let memory_mb = process.memory() / 1024 / 1024;
        let peak = self
            .peak_memory
            .fetch_max(memory_mb, Ordering::Relaxed)
            .max(memory_mb);

        Some(RunStats {
            memory_usage_mb: memory_mb,
            peak_memory_mb: peak,
            cpu_usage: process.cpu_usage(),
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_phase(&self, phase: &str, items: usize) {
        if let Some(stats) = self.stats() {
            tracing::info!(
                "📊 {} - {} items, CPU: {:.1}%, Memory: {}MB, Peak: {}MB, Time: {:?}",
                phase,
                items,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.elapsed_time
            );
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.stats() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB",
                stats.elapsed_time,
                stats.peak_memory_mb
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// Without the cli feature there is no sysinfo; only elapsed time is reported.
#[cfg(not(feature = "cli"))]
pub struct RunMonitor {
    start_time: Instant,
    enabled: bool,
}

#[cfg(not(feature = "cli"))]
impl RunMonitor {
    pub fn new(enabled: bool) -> Self {
        Self {
            start_time: Instant::now(),
            enabled,
        }
    }

    pub fn stats(&self) -> Option<RunStats> {
        self.enabled.then(|| RunStats {
            memory_usage_mb: 0,
            peak_memory_mb: 0,
            cpu_usage: 0.0,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    pub fn log_phase(&self, phase: &str, items: usize) {
        if let Some(stats) = self.stats() {
            tracing::info!("📊 {} - {} items, Time: {:?}", phase, items, stats.elapsed_time);
        }
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.stats() {
            tracing::info!("📊 Final Stats - Total Time: {:?}", stats.elapsed_time);
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for RunMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
