use sysinfo::{MemoryRefreshKind, RefreshKind, System};

/// System memory at one point in a run, in MB.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemorySample {
    pub used_mb: u64,
}

pub fn sample_memory() -> MemorySample {
    let mut sys = System::new_with_specifics(
        RefreshKind::nothing().with_memory(MemoryRefreshKind::everything()),
    );
    sys.refresh_memory();
    // sysinfo reports bytes
    let total_mb = sys.total_memory() / (1024 * 1024);
    let avail_mb = sys.available_memory() / (1024 * 1024);
    MemorySample {
        used_mb: total_mb.saturating_sub(avail_mb),
    }
}
