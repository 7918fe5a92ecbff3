//! Logging setup for the CLI. Writes to the terminal always, and
//! additionally to a rotating log file under the tool's config
//! directory once built in release mode.

use anyhow::Result;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode, WriteLogger};

pub fn init(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if cfg!(debug_assertions) {
        TermLogger::init(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto)?;
        return Ok(());
    }

    let log_path = mapconv_core::paths::init_config_path()?.join("mapconv_cli.log");
    CombinedLogger::init(vec![
        TermLogger::new(level, Config::default(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(level, Config::default(), std::fs::File::create(log_path)?),
    ])?;
    Ok(())
}
