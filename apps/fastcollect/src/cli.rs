use std::path::PathBuf;

use clap::Parser;

use crate::config::Config;

/// Collect static files into a bucket, skipping files whose content is unchanged
#[derive(Parser, Debug)]
#[command(name = "fastcollect")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file (default: fastcollect.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Show what would be copied without uploading
    #[arg(long)]
    pub dry_run: bool,

    /// Extra ignore pattern (repeatable)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore: Vec<String>,

    /// Do not skip CVS folders, dotfiles and `*~` backups
    #[arg(long)]
    pub no_default_ignore: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Layers command-line flags over the loaded configuration.
    pub fn apply(&self, config: &mut Config) {
        if self.dry_run {
            config.dry_run = true;
        }
        if self.no_default_ignore {
            config.use_default_ignore_patterns = false;
        }
        config.ignore_patterns.extend(self.ignore.iter().cloned());
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}
