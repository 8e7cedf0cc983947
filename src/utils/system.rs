/// Process memory usage used by the ticker's two-tier eviction policy.
use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System};

/// Reads the resident set size of the current process on demand.
///
/// Holds its own `System` handle rather than a cached one: refreshing just the
/// current process is cheap and keeps the ticker free of shared mutable state
/// beyond the pool.
pub struct MemoryReader {
    system: System,
    pid: Option<Pid>,
}

impl MemoryReader {
    pub fn new() -> Self {
        let system =
            System::new_with_specifics(RefreshKind::nothing().with_processes(ProcessRefreshKind::everything()));
        let pid = sysinfo::get_current_pid().ok();
        Self { system, pid }
    }

    /// Current process RSS in bytes, or 0 if the platform can't report it.
    pub fn current_usage_bytes(&mut self) -> u64 {
        self.system.refresh_processes(sysinfo::ProcessesToUpdate::All, true);

        self.pid
            .and_then(|pid| self.system.process(pid))
            .map(|process| process.memory())
            .unwrap_or(0)
    }
}

impl Default for MemoryReader {
    fn default() -> Self {
        Self::new()
    }
}
