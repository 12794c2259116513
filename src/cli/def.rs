use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::SectionPath;

const EXAMPLES: &str = "\
Examples:
  confobj get-value '[Station]' location
  confobj set-value '[Station]' location 'Test Site'
  confobj has-section '[StdReport][Belchertown]'
  confobj set-multiple-values '[Station]' latitude=51.5 longitude=-0.12
  confobj merge-config-from-file accumulator.conf '[Accumulator]'
  confobj -n merge-config-from-stdin '[StdReport][Belchertown]' < extras.conf

Section paths are one or more bracketed names, outermost first.";

/// Reads and edits nested-section INI configuration files
#[derive(Parser)]
#[command(author, about, long_about=None, disable_version_flag(true), after_help = EXAMPLES)]
pub struct Args {
    /// force color mode (defaults to check tty)
    #[arg(long)]
    pub color: bool,

    /// force no-color mode (defaults to check tty)
    #[arg(long)]
    pub no_color: bool,

    /// display version and quit
    #[arg(short = 'V', long = "version")]
    pub version: bool,

    /// prepend time to each log line
    #[arg(long)]
    pub log_time: bool,

    /// Turn general verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configure component wise logging (MODULE[=LEVEL])
    #[arg(long, short, action = clap::ArgAction::Append)]
    pub log: Option<Vec<String>>,

    /// Configuration file to operate on
    #[arg(short, long, default_value = "/data/weewx.conf")]
    pub config: PathBuf,

    /// suppress informational output
    #[arg(short, long)]
    pub quiet: bool,

    /// show the pending change instead of saving it
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// do not keep a timestamped copy of the file before saving
    #[arg(long)]
    pub no_backup: bool,

    #[command(subcommand)]
    pub action: Option<Actions>,
}

#[derive(Subcommand)]
pub enum Actions {
    /// Print the value of a key
    GetValue {
        /// Section path like "[Station]" or "[StdReport][Belchertown]"
        #[clap(name = "SECTION")]
        section: SectionPath,

        /// Key name
        #[clap(name = "KEY")]
        key: String,

        /// Printed when the section or key is missing
        #[clap(name = "DEFAULT")]
        default: Option<String>,

        /// Print lists and sections in config file syntax
        #[arg(short, long)]
        syntax: bool,
    },
    /// Set a key to a string value, creating sections as needed
    SetValue {
        #[clap(name = "SECTION")]
        section: SectionPath,

        #[clap(name = "KEY")]
        key: String,

        #[clap(name = "VALUE")]
        value: String,
    },
    /// Check whether a section exists
    HasSection {
        #[clap(name = "SECTION")]
        section: SectionPath,
    },
    /// Check whether a key exists in a section
    HasKey {
        #[clap(name = "SECTION")]
        section: SectionPath,

        #[clap(name = "KEY")]
        key: String,
    },
    /// Create a section and any missing parents
    CreateSection {
        #[clap(name = "SECTION")]
        section: SectionPath,
    },
    /// Remove a section and everything below it
    RemoveSection {
        #[clap(name = "SECTION")]
        section: SectionPath,
    },
    /// Set several key=value pairs in one section
    SetMultipleValues {
        #[clap(name = "SECTION")]
        section: SectionPath,

        /// Pairs split on the first '='
        #[clap(name = "PAIR", required = true)]
        pairs: Vec<String>,
    },
    /// Merge a file with a single root section into a section
    MergeConfigFromFile {
        /// Configuration file to merge
        #[clap(name = "FILE")]
        file: PathBuf,

        /// Target section path, its first name must match the file's root
        #[clap(name = "SECTION")]
        section: SectionPath,
    },
    /// Merge configuration text read from stdin into a section
    MergeConfigFromStdin {
        #[clap(name = "SECTION")]
        section: SectionPath,
    },
    /// Check that the configuration file parses
    Validate,
}
