use crate::core::system_info::{Metrics, Specs};
use crate::error::Result;

pub use crate::core::miner::MinerMonitor;

/// Source of host hardware information.
///
/// Implementations may block on sysfs reads or helper tools; async callers
/// should run them on the blocking pool.
pub trait SpecsReader: Send + Sync {
    fn read_specs(&self) -> Result<Specs>;
    fn read_metrics(&self) -> Result<Metrics>;
}
