use std::time::Duration;

pub const DEFAULT_PROGRAM: &str = "xmrig";
pub const DEFAULT_RESTART_DELAY: Duration = Duration::from_secs(5);

/// Production xmrig arguments used when none are supplied.
pub const DEFAULT_ARGS: &[&str] = &[
    "--url=tokyo:3333",
    "--user=%H",
    "--pass=%H",
    "--algo=rx/monero",
    "--cpu-priority=5",
    "--randomx-1gb-pages",
    "--huge-pages",
    "--no-color",
    "--print-time=5",
];

/// Launch parameters for the supervised miner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Program name looked up on `PATH`, or a path to the executable.
    pub program: String,
    pub args: Vec<String>,
    pub restart_delay: Duration,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args: default_args(),
            restart_delay: DEFAULT_RESTART_DELAY,
        }
    }
}

impl SupervisorConfig {
    pub fn new(args: Vec<String>, restart_delay: Duration) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            args,
            restart_delay,
        }
        .normalized()
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self.normalized()
    }

    /// Fill in defaults for anything left empty or zero.
    pub fn normalized(mut self) -> Self {
        if self.program.trim().is_empty() {
            self.program = DEFAULT_PROGRAM.to_string();
        }
        if self.args.is_empty() {
            self.args = default_args();
        }
        if self.restart_delay.is_zero() {
            self.restart_delay = DEFAULT_RESTART_DELAY;
        }
        self
    }
}

pub fn default_args() -> Vec<String> {
    DEFAULT_ARGS.iter().map(|arg| arg.to_string()).collect()
}
