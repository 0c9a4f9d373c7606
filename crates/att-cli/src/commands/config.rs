//! Config command for showing the resolved configuration.

use std::io::Write;

use anyhow::Result;

use crate::Config;
use crate::config::dirs_config_path;

pub fn run<W: Write>(writer: &mut W, config: &Config) -> Result<()> {
    if let Some(dir) = dirs_config_path() {
        writeln!(writer, "# {}", dir.join("config.toml").display())?;
    }
    writeln!(writer, "timestamp_format = {:?}", config.timestamp_format)?;
    writeln!(writer, "date_format = {:?}", config.date_format)?;
    writeln!(writer, "default_to_now = {}", config.default_to_now)?;
    Ok(())
}
