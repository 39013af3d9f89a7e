//! Module describing all possible commands and sub-commands to the `heli-dash` driver
//!
//! Every data command takes the CSV file as argument and writes either a table (`stats`,
//! `days`) or a chart specification in JSON (`heatmap`, `route`, `render`) to stdout or to
//! the file given with `-o`.
//!
//! `completion` is here just to configure the various shells completion system.
//!

use std::path::PathBuf;

use clap::{crate_authors, crate_description, crate_name, crate_version, Parser};
use clap_complete::shells::Shell;

/// CLI options
#[derive(Parser)]
#[clap(name = crate_name!(), about = crate_description!())]
#[clap(version = crate_version!(), author = crate_authors!())]
pub struct Opts {
    /// configuration file.
    #[clap(short = 'c', long)]
    pub config: Option<PathBuf>,
    /// Output file.
    #[clap(short = 'o', long)]
    pub output: Option<PathBuf>,
    /// Hierarchical output for traces.
    #[clap(long)]
    pub use_tree: bool,
    /// Also log into hourly files in that directory.
    #[clap(long)]
    pub use_file: Option<String>,
    /// Verbose mode.
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
    /// Sub-commands (see below).
    #[clap(subcommand)]
    pub subcmd: SubCommand,
}

// ------

/// All sub-commands:
///
/// `completion SHELL`
/// `config`
/// `days FILE`
/// `heatmap FILE`
/// `render [--all-days] FILE`
/// `route [-d DAY] FILE`
/// `stats FILE`
/// `version`
///
#[derive(Debug, Parser)]
pub enum SubCommand {
    /// Generate Completion stuff
    Completion(ComplOpts),
    /// Display the configuration in use
    Config,
    /// List days with activity
    Days(FileOpts),
    /// Write the heatmap of visited cells
    Heatmap(FileOpts),
    /// Write the whole dashboard
    Render(RenderOpts),
    /// Write the routes for one day
    Route(RouteOpts),
    /// Display statistics
    Stats(FileOpts),
    /// List all package versions
    Version,
}

// ------

#[derive(Debug, Parser)]
pub struct FileOpts {
    /// CSV file with position reports
    pub file: PathBuf,
}

/// Options for a single day.
///
#[derive(Debug, Parser)]
pub struct RouteOpts {
    /// Day as YYYY-MM-DD, default is taken from the configuration
    #[clap(short = 'd', long)]
    pub day: Option<String>,
    /// CSV file with position reports
    pub file: PathBuf,
}

#[derive(Debug, Parser)]
pub struct RenderOpts {
    /// Include the routes of every active day
    #[clap(long)]
    pub all_days: bool,
    /// CSV file with position reports
    pub file: PathBuf,
}

// ------

/// Options to generate completion files at runtime
///
#[derive(Debug, Parser)]
pub struct ComplOpts {
    #[clap(value_parser)]
    pub shell: Shell,
}
