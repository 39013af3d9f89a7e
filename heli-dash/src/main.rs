use std::fs;
use std::io;
use std::path::Path;

use clap::{crate_authors, crate_description, crate_version, CommandFactory, Parser};
use clap_complete::generate;
use eyre::{eyre, Result};
use tracing::{debug, info, trace};

use heli_dash::{load_config, run, DashConfig, Opts, RenderCache, Settings, Status, SubCommand};
use pegasus_common::{init_logging, parse_day};

/// Binary name, using a different binary name
pub const NAME: &str = env!("CARGO_BIN_NAME");
/// Binary version
pub const VERSION: &str = crate_version!();
/// Authors
pub const AUTHORS: &str = crate_authors!();

fn main() -> Result<()> {
    let opts = Opts::parse();

    // Initialise logging.
    //
    init_logging(NAME, opts.use_tree, opts.use_file.clone())?;

    // Banner
    //
    if opts.verbose > 0 {
        banner()?;
    }

    // Load and validate configuration, built-in defaults if there is none.
    //
    let (cfg, settings) = load_config(opts.config.as_deref())?;
    trace!("{settings:?}");

    handle_subcmd(&opts, &cfg, &settings)
}

pub fn handle_subcmd(opts: &Opts, cfg: &DashConfig, settings: &Settings) -> Result<()> {
    let output = opts.output.as_deref();

    match &opts.subcmd {
        // Handle `stats file`
        //
        SubCommand::Stats(fopts) => {
            trace!("stats");

            let bundle = run(&fopts.file, settings)?;
            write_output(output, &bundle.stats.to_string())?;
        }

        // Handle `days file`
        //
        SubCommand::Days(fopts) => {
            trace!("days");

            let bundle = run(&fopts.file, settings)?;
            let days = bundle
                .stats
                .active_days
                .iter()
                .map(|d| d.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            write_output(output, &days)?;
        }

        // Handle `heatmap file`
        //
        SubCommand::Heatmap(fopts) => {
            trace!("heatmap");

            let bundle = run(&fopts.file, settings)?;
            let fig = bundle.heatmap(settings);
            write_output(output, &serde_json::to_string_pretty(&fig)?)?;
        }

        // Handle `route [-d day] file`
        //
        SubCommand::Route(ropts) => {
            trace!("route");

            let bundle = run(&ropts.file, settings)?;
            let day = match &ropts.day {
                Some(day) => parse_day(day).map_err(|_| Status::BadDay(day.to_owned()))?,
                None => bundle
                    .initial_day(settings.initial_day)
                    .ok_or_else(|| eyre!("no data in {:?}, specify a day", ropts.file))?,
            };
            info!("routes for {day}");

            let route = bundle.route(day, settings);
            write_output(output, &serde_json::to_string_pretty(&route)?)?;
        }

        // Handle `render [--all-days] file`
        //
        // Every route goes through the cache, only the first access runs the pipeline.
        //
        SubCommand::Render(ropts) => {
            trace!("render");

            let mut cache = RenderCache::new();
            let bundle = cache.get(&ropts.file, settings)?;
            let mut page = bundle.page(settings, &[]);

            if ropts.all_days {
                page.routes = bundle
                    .stats
                    .active_days
                    .iter()
                    .map(|&day| {
                        cache
                            .get(&ropts.file, settings)
                            .map(|b| b.route(day, settings))
                    })
                    .collect::<Result<Vec<_>>>()?;
                debug!("{} loads, {} hits", cache.loads(), cache.hits());
            }
            write_output(output, &serde_json::to_string_pretty(&page)?)?;
        }

        // Standalone completion generation
        //
        // NOTE: you can generate UNIX shells completion on Windows and vice-versa.  Not worth
        //       trying to limit depending on the OS.
        //
        SubCommand::Completion(copts) => {
            let generator = copts.shell;
            generate(generator, &mut Opts::command(), NAME, &mut io::stdout());
        }

        // Handle `config`
        //
        SubCommand::Config => {
            trace!("config");

            write_output(output, &hcl::to_string(cfg)?)?;
        }

        // Standalone `version` command
        //
        SubCommand::Version => {
            eprintln!("Modules: ");
            eprintln!("\t{}", version());
            eprintln!("\t{}", pegasus_common::version());
        }
    }
    Ok(())
}

/// Write into the output file if any, stdout otherwise.
///
fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(fname) => {
            info!("writing {fname:?}");
            fs::write(fname, text)?;
        }
        None => println!("{text}"),
    }
    Ok(())
}

/// Return our version number
///
#[inline]
pub fn version() -> String {
    format!("{}/{}", NAME, VERSION)
}

/// Display banner
///
fn banner() -> Result<()> {
    Ok(eprintln!(
        r##"
{}/{} by {}
{}
"##,
        NAME,
        VERSION,
        AUTHORS,
        crate_description!()
    ))
}
