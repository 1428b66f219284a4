use chrono::Utc;
use log::warn;

use super::types::{Metrics, Specs};
use super::{cpu, memory, motherboard, power, temperature};
use crate::app::ports::SpecsReader;
use crate::error::Result;
use crate::observability;

/// Collect the full hardware description. Fails only when the CPU model is unreadable.
pub fn read_specs() -> Result<Specs> {
    let cpu = cpu::collect().map_err(|e| {
        warn!("specs read_specs: {}", e);
        observability::capture_error(&e, &[("component", "specs"), ("operation", "read_specs")]);
        e
    })?;

    Ok(Specs {
        model: cpu.model,
        cores: cpu.cores,
        threads: cpu.threads,
        motherboard: motherboard::read_motherboard(),
        cpu_temp: temperature::read_cpu_temp(),
        cpu_wattage: power::read_cpu_wattage(),
        ram: memory::read_ram(),
        ram_speed: memory::read_ram_speed(),
    })
}

/// Sample the sensors that change over time.
pub fn read_metrics() -> Metrics {
    Metrics {
        cpu_temp: temperature::read_cpu_temp(),
        cpu_wattage: power::read_cpu_wattage(),
        time: Utc::now(),
    }
}

/// [`SpecsReader`] backed by the local machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSpecsReader;

impl SpecsReader for SystemSpecsReader {
    fn read_specs(&self) -> Result<Specs> {
        read_specs()
    }

    fn read_metrics(&self) -> Result<Metrics> {
        Ok(read_metrics())
    }
}
