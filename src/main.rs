use anyhow::Result;
use clap::{Arg, Command};

use grid_node::commands;

fn cli() -> Command {
    Command::new("grid-node")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Supervises an xmrig miner and reports its status")
        .disable_version_flag(true)
        .arg(
            Arg::new("version")
                .short('v')
                .short_alias('V')
                .long("version")
                .help("Print version information")
                .action(clap::ArgAction::SetTrue)
        )
        .args(commands::run::args())
        .args_conflicts_with_subcommands(true)
        .subcommand(
            Command::new("run")
                .about("Run the miner supervisor, HTTP API and notifier (default)")
                .args(commands::run::args())
        )
        .subcommand(
            Command::new("specs")
                .about("Print the host hardware summary")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print as JSON")
                        .action(clap::ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("version")
                .about("Shows version information")
        )
}

fn main() -> Result<()> {
    grid_node::init_logging();

    let matches = cli().get_matches();

    if matches.get_flag("version") {
        return commands::version();
    }

    match matches.subcommand() {
        Some(("run", sub_matches)) => commands::run(sub_matches),
        Some(("specs", sub_matches)) => commands::specs(sub_matches),
        Some(("version", _)) => commands::version(),
        _ => commands::run(&matches),
    }
}
