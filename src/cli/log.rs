//! Logging setup: fern dispatch to stderr.

use std::sync::OnceLock;

use colored::*;
use log::{Level, LevelFilter};
use regex::Regex;
use time::macros::format_description;
use time::OffsetDateTime;

fn log_spec_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<module>[a-zA-Z_][a-zA-Z0-9_]*(?:::[a-zA-Z_][a-zA-Z0-9_]*)*)(?:=(?P<level>[a-zA-Z]+))?$")
            .expect("log spec pattern is valid")
    })
}

fn base_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Parse a `MODULE[=LEVEL]` logging spec.
///
/// Modules are relative to this crate (`config::parse` targets
/// `confobj::config::parse`). The level defaults to `debug`.
pub fn parse_log_spec(spec: &str) -> Result<(String, LevelFilter), String> {
    let caps = log_spec_re()
        .captures(spec)
        .ok_or_else(|| format!("Invalid log spec '{}', expected MODULE[=LEVEL]", spec))?;
    let module = &caps["module"];
    let level = match caps.name("level") {
        Some(level) => level
            .as_str()
            .parse::<LevelFilter>()
            .map_err(|_| format!("Invalid log level '{}' in '{}'", level.as_str(), spec))?,
        None => LevelFilter::Debug,
    };
    let crate_name = env!("CARGO_CRATE_NAME");
    let target = if module == crate_name || module.starts_with(&format!("{}::", crate_name)) {
        module.to_string()
    } else {
        format!("{}::{}", crate_name, module)
    };
    Ok((target, level))
}

fn colored_level(level: Level) -> ColoredString {
    match level {
        Level::Error => "ERROR".bright_red(),
        Level::Warn => "WARN ".yellow(),
        Level::Info => "INFO ".green(),
        Level::Debug => "DEBUG".blue(),
        Level::Trace => "TRACE".dimmed(),
    }
}

fn timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    now.format(format_description!(
        "[hour]:[minute]:[second].[subsecond digits:3]"
    ))
    .unwrap_or_default()
}

pub fn setup(verbose: u8, logs: Vec<&str>, log_time: bool) -> Result<(), String> {
    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            let prefix = if log_time {
                format!("{} ", timestamp().as_str().dimmed())
            } else {
                String::new()
            };
            out.finish(format_args!(
                "{}{} {}: {}",
                prefix,
                colored_level(record.level()),
                record.target(),
                message
            ))
        })
        .level(base_level(verbose));

    for spec in logs {
        let (module, level) = parse_log_spec(spec)?;
        dispatch = dispatch.level_for(module, level);
    }

    dispatch
        .chain(std::io::stderr())
        .apply()
        .map_err(|e| format!("Failed to set up logging: {}", e))
}

// =============================================================================
// Unit Tests
// =============================================================================
