use std::path::PathBuf;

use clap::Parser;

/// Compiler of OpenStreetMap POI extracts into Garmin gpi POI databases
#[derive(Debug, Parser)]
#[clap(about, version, author)]
pub struct Args {
    /// Verbose mode (-v, -vv, -vvv, etc.)
    #[clap(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Input OSM pbf extract; defaults to the first *.pbf file in the work
    /// directory
    pub input: Option<PathBuf>,

    /// Category configuration file
    #[arg(long, default_value = "POIs.yaml")]
    pub config: PathBuf,

    /// Directory holding the osm_raw, osm_filtered, GPI and Icons trees
    #[arg(long, default_value = ".")]
    pub work_dir: PathBuf,

    /// Keep every extracted node instead of thinning clusters
    #[arg(long)]
    pub no_filter: bool,

    /// Process categories on a pool of worker threads
    #[arg(short, long)]
    pub parallel: bool,

    /// Number of workers for --parallel; defaults to all cores but two
    #[arg(long, requires = "parallel")]
    pub workers: Option<usize>,

    /// Tag keys whose values make up the display label, in display order
    #[arg(
        long,
        value_delimiter = ',',
        default_values_t = osmpoi::DEFAULT_LABEL_KEYS.iter().map(|s| s.to_string())
    )]
    pub label_tags: Vec<String>,

    /// Extractor executable
    #[arg(long, default_value = "osmosis")]
    pub osmosis_bin: PathBuf,

    /// Converter executable
    #[arg(long, default_value = "gpsbabel")]
    pub gpsbabel_bin: PathBuf,
}
