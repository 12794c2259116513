mod def;
include!(concat!(env!("OUT_DIR"), "/rustc_version.rs"));
use clap::Parser;
use std::path::PathBuf;

use crate::config::{self, Document, Node};
use crate::store::ConfigFile;
use def::Actions;
use output::Reporter;

pub mod log;
mod output;

impl From<config::Error> for String {
    fn from(e: config::Error) -> Self {
        e.to_string()
    }
}

/// Invocation settings shared by every action.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Configuration file to load and save.
    pub config: PathBuf,
    pub quiet: bool,
    pub dry_run: bool,
    /// Keep a timestamped copy before overwriting.
    pub backup: bool,
}

impl From<&def::Args> for Settings {
    fn from(args: &def::Args) -> Self {
        Self {
            config: args.config.clone(),
            quiet: args.quiet,
            dry_run: args.dry_run,
            backup: !args.no_backup,
        }
    }
}

pub fn run() -> Result<bool, String> {
    let cli = def::Args::parse();

    // Split log strings upon comma, trim them and flatten all in
    // `logs`, remove empty values
    let logs = cli.log.clone().unwrap_or_default();
    let logs = logs
        .iter()
        .flat_map(|log| log.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<&str>>();

    log::setup(cli.verbose, logs, cli.log_time)?;

    if cli.color && cli.no_color {
        return Err("Cannot use both --color and --no-color".to_string());
    }
    if cli.color {
        colored::control::set_override(true);
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    if cli.version {
        println!("version: {}", env!("CARGO_PKG_VERSION"));
        println!("Rust: {}", RUSTC_VERSION);
        return Ok(true);
    }

    let settings = Settings::from(&cli);
    match &cli.action {
        Some(action) => Ok(execute(action, &settings)?),
        None => Err("Missing action".to_string()),
    }
}

/// Run one action against the configured file.
///
/// `Ok(false)` means the queried thing was absent, or the command did not
/// apply (missing section to remove, invalid file to validate).
fn execute(action: &Actions, settings: &Settings) -> Result<bool, config::Error> {
    let report = Reporter::new(settings.quiet);
    let file = ConfigFile::new(&settings.config);

    let (mut doc, original) = match (action, file.load()) {
        (Actions::Validate, Err(config::Error::Parse(msg))) => {
            eprintln!("Config validation failed: {}", msg);
            return Ok(false);
        }
        (_, loaded) => loaded?,
    };

    match action {
        Actions::GetValue {
            section,
            key,
            default,
            syntax,
        } => {
            let fallback = default.as_deref().map(Node::from);
            return match config::get_value_or(&doc, section, key, fallback.as_ref()) {
                Some(value) => {
                    output::print_value(value, *syntax)?;
                    Ok(true)
                }
                None => {
                    ::log::debug!("{}[{}] not found", section, key);
                    Ok(false)
                }
            };
        }
        Actions::HasSection { section } => {
            let exists = config::has_section(&doc, section);
            report.flag(exists);
            return Ok(exists);
        }
        Actions::HasKey { section, key } => {
            let exists = config::has_key(&doc, section, key);
            report.flag(exists);
            return Ok(exists);
        }
        Actions::Validate => {
            if original.is_none() {
                ::log::info!("{} does not exist, nothing to validate", file.path().display());
            }
            report.info("Configuration is valid");
            return Ok(true);
        }
        Actions::SetValue {
            section,
            key,
            value,
        } => {
            config::set_value(&mut doc, section, key, value)?;
            report.info(format!("Set {}[{}] = {}", section, key, value));
        }
        Actions::CreateSection { section } => {
            config::create_section(&mut doc, section)?;
            report.info(format!("Created section {}", section));
        }
        Actions::RemoveSection { section } => {
            if !config::remove_section(&mut doc, section)? {
                report.info(format!("Section {} not found", section));
                return Ok(false);
            }
            report.info(format!("Removed section {}", section));
        }
        Actions::SetMultipleValues { section, pairs } => {
            let count = config::set_multiple_values(&mut doc, section, pairs)?;
            report.info(format!("Set {} values in {}", count, section));
        }
        Actions::MergeConfigFromFile {
            file: source,
            section,
        } => {
            config::merge_from_file(source, &mut doc, section)?;
            report.info(format!("Merged {} into {}", source.display(), section));
        }
        Actions::MergeConfigFromStdin { section } => {
            let text = std::io::read_to_string(std::io::stdin())
                .map_err(|e| config::Error::Io(format!("Failed to read stdin: {}", e)))?;
            config::merge_from_text(&text, &mut doc, section).map_err(|e| match e {
                config::Error::Parse(msg) => {
                    config::Error::Parse(format!("Failed to parse stdin: {}", msg))
                }
                other => other,
            })?;
            report.info(format!("Merged stdin config into {}", section));
        }
    }

    persist(&file, &doc, original.as_deref(), settings, report)?;
    Ok(true)
}

/// Save `doc` unless nothing changed. In dry-run mode show the pending
/// change instead.
fn persist(
    file: &ConfigFile,
    doc: &Document,
    original: Option<&str>,
    settings: &Settings,
    report: Reporter,
) -> Result<(), config::Error> {
    let text = config::serialize(doc)?;

    if settings.dry_run {
        if !settings.quiet {
            let name = file.path().display().to_string();
            print!("{}", output::render_diff(original.unwrap_or(""), &text, &name));
        }
        report.info("(dry-run mode - no changes saved)");
        return Ok(());
    }

    if original == Some(text.as_str()) {
        ::log::info!("{} unchanged, not saving", file.path().display());
        return Ok(());
    }
    file.save(&text, settings.backup)?;
    Ok(())
}
