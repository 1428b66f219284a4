use crate::error::{GridError, Result};
use sysinfo::{CpuRefreshKind, RefreshKind, System};

/// CPU brand string, physical core count and logical thread count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuSummary {
    pub model: String,
    pub cores: usize,
    pub threads: usize,
}

pub fn collect() -> Result<CpuSummary> {
    let refresh = RefreshKind::nothing().with_cpu(CpuRefreshKind::everything());
    let sys = System::new_with_specifics(refresh);

    let cpus = sys.cpus();
    let model = cpus
        .first()
        .map(|cpu| cpu.brand().trim().to_string())
        .unwrap_or_default();
    if model.is_empty() {
        return Err(GridError::specs("CPU model name not found"));
    }

    Ok(CpuSummary {
        model,
        cores: System::physical_core_count().unwrap_or(0),
        threads: cpus.len(),
    })
}
