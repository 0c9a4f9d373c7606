//! Shell command: the interactive menu on stdin/stdout.

use std::io;

use anyhow::Result;

use crate::Config;
use crate::shell::{Shell, system_clock};

/// Runs the interactive shell until the operator exits.
///
/// Nothing is persisted; employees and attendance live only as long as the
/// session.
pub fn run(config: Config) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut shell = Shell::new(stdin.lock(), stdout.lock(), config, system_clock());
    shell.run()
}
