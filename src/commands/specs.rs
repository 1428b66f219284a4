use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::system_info::read_specs;
use crate::ui::messages;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let specs = read_specs().context("Failed to collect system specs")?;

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&specs)?);
        return Ok(());
    }

    println!("{}", specs.model.white().bold());
    println!();
    messages::field("Cores", &specs.cores.to_string());
    messages::field("Threads", &specs.threads.to_string());
    messages::field("CPU Temp", &specs.cpu_temp);
    messages::field("CPU Power", &specs.cpu_wattage);
    messages::field("RAM", &specs.ram);
    messages::field("RAM Speed", &specs.ram_speed);
    messages::field("Motherboard", &specs.motherboard);

    Ok(())
}
