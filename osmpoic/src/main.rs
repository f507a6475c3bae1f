mod args;
mod config;
mod exec;
mod parallel;
mod pipeline;
mod stats;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Parser;
use colored::*;
use itertools::Itertools;
use log::{error, info};
use osmpoi::LabelSpec;

use crate::pipeline::{process_category, Layout, RunConfig};
use crate::stats::Stats;

type Error = Box<dyn std::error::Error>;

fn run(args: args::Args) -> Result<(), Error> {
    let catalog = config::load(&args.config)?;
    if catalog.categories.is_empty() {
        return Err(format!("no categories configured in {}", args.config.display()).into());
    }

    let pbf = match args.input {
        Some(ref path) => path.clone(),
        None => default_extract(&args.work_dir)?,
    };
    if !pbf.is_file() {
        return Err(format!("extract {} does not exist", pbf.display()).into());
    }
    info!("processing {}", pbf.display());
    info!(
        "{} categories, thinning {}",
        catalog.categories.len(),
        if args.no_filter {
            "off".red().bold()
        } else {
            "on".green().bold()
        }
    );

    let cfg = RunConfig {
        pbf,
        layout: Layout::new(&args.work_dir),
        filtering: !args.no_filter,
        labels: LabelSpec::new(args.label_tags.clone()),
        osmosis_bin: args.osmosis_bin.clone(),
        gpsbabel_bin: args.gpsbabel_bin.clone(),
    };

    let num_workers = if args.parallel {
        args.workers.unwrap_or_else(default_num_workers)
    } else {
        1
    };
    if args.parallel {
        info!("processing on {} workers", num_workers);
    }

    let started = Instant::now();
    let outcomes = parallel::parallel_process(
        "Processing categories...",
        catalog.categories,
        num_workers,
        |spec| {
            let result = process_category(&cfg, &spec);
            (spec, result)
        },
    );

    let mut stats = Stats::default();
    let mut failed = Vec::new();
    for (spec, result) in outcomes {
        match result {
            Ok(category_stats) => stats += category_stats,
            Err(e) => {
                error!("[{}] {}", spec.name, e);
                stats += Stats {
                    num_categories: 1,
                    num_failed: 1,
                    ..Default::default()
                };
                failed.push(spec.name);
            }
        }
    }

    info!("done in {:.1?}", started.elapsed());
    println!("{}", stats);

    if !failed.is_empty() {
        return Err(format!(
            "{} of {} categories failed: {}",
            failed.len(),
            stats.num_categories,
            failed.iter().join(", ")
        )
        .into());
    }
    Ok(())
}

/// Picks the alphabetically first pbf extract in the work directory.
fn default_extract(dir: &Path) -> Result<PathBuf, Error> {
    let mut extracts = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| format!("cannot read {}: {}", dir.display(), e))? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("pbf") {
            extracts.push(path);
        }
    }
    extracts.sort();
    extracts
        .into_iter()
        .next()
        .ok_or_else(|| format!("no *.pbf extract found in {}", dir.display()).into())
}

fn default_num_workers() -> usize {
    num_cpus::get().saturating_sub(2).max(1)
}

fn main() {
    let args = args::Args::parse();
    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_module_path(false)
        .format_timestamp_nanos()
        .init();

    if let Err(e) = run(args) {
        eprintln!("{}: {}", "Error".red(), e);
        std::process::exit(1);
    }
}
