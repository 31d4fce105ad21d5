use crossterm::{
    ExecutableCommand,
    event::{self, Event},
    style::{Color, ResetColor, SetForegroundColor},
    terminal,
};
use env_logger::Builder;
use log::{Level, debug, info};
use std::io::{self, Write};

pub const LOG_LEVEL_ENV: &str = "UNITY_EXTRACTOR_LOG_LEVEL";

pub fn level_for_verbosity(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn setup_logger(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let env = env_logger::Env::default().filter_or(LOG_LEVEL_ENV, level_for_verbosity(verbosity));

    Builder::from_env(env)
        .format(|buf, record| {
            let level_color = match record.level() {
                Level::Error => "31", // Red
                Level::Warn => "33",  // Yellow
                Level::Info => "32",  // Green
                Level::Debug => "36", // Cyan
                Level::Trace => "35", // Magenta
            };

            writeln!(
                buf,
                "\x1B[{}m[{}]\x1B[0m [{}] {}",
                level_color,
                record.level(),
                buf.timestamp(),
                record.args()
            )
        })
        .format_timestamp_secs()
        .try_init()
}

/// Writes one line to stdout in `color`.
pub fn print_colored(color: Color, text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(SetForegroundColor(color))?;
    writeln!(stdout, "{}", text)?;
    stdout.execute(ResetColor)?;
    Ok(())
}

pub fn print_welcome_message() -> io::Result<()> {
    let mut stdout = io::stdout();

    writeln!(stdout)?;
    stdout.execute(SetForegroundColor(Color::Cyan))?;
    writeln!(stdout, "{}", "=".repeat(60))?;
    writeln!(stdout, "UNITY PROJECT EXTRACTOR v{}", env!("CARGO_PKG_VERSION"))?;
    writeln!(stdout, "{}", "=".repeat(60))?;
    stdout.execute(ResetColor)?;

    debug!("Debug logging enabled");
    info!("Starting Unity extractor...");
    Ok(())
}

/// Blocks until any key is pressed, so a double-clicked console window stays open.
pub fn wait_for_keypress() -> io::Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "\nPress any key to exit...")?;
    stdout.flush()?;

    terminal::enable_raw_mode()?;
    let result = loop {
        match event::read() {
            Ok(Event::Key(_)) => break Ok(()),
            Ok(_) => continue,
            Err(e) => break Err(e),
        }
    };
    terminal::disable_raw_mode()?;
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Once;

    static INIT: Once = Once::new();

    #[test]
    fn test_setup_logger() {
        INIT.call_once(|| {
            assert!(setup_logger(0).is_ok());
        });
    }

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), "warn");
        assert_eq!(level_for_verbosity(1), "info");
        assert_eq!(level_for_verbosity(2), "debug");
        assert_eq!(level_for_verbosity(7), "debug");
    }
}
