//! The per-category pipeline: extract, thin, serialize, convert.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use osmpoi::{filter_nodes, read_node_list, write_node_list, LabelSpec};
use thiserror::Error;

use crate::config::CategorySpec;
use crate::exec::{self, ExecError};
use crate::stats::Stats;

/// Run-wide configuration shared by all category jobs.
#[derive(Debug)]
pub struct RunConfig {
    pub pbf: PathBuf,
    pub layout: Layout,
    pub filtering: bool,
    pub labels: LabelSpec,
    pub osmosis_bin: PathBuf,
    pub gpsbabel_bin: PathBuf,
}

/// Work directory layout.
///
/// Every path is keyed by the category name, so category jobs running in
/// parallel never touch the same file.
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }

    /// The extractor's output for a category.
    pub fn raw_osm(&self, category: &str) -> PathBuf {
        self.root.join("osm_raw").join(format!("{}.osm", category))
    }

    /// The thinned and labeled node list for a category.
    pub fn filtered_osm(&self, category: &str) -> PathBuf {
        self.root
            .join("osm_filtered")
            .join(format!("filtered_{}.osm", category))
    }

    /// The final gpi database for a category.
    pub fn gpi(&self, category: &str) -> PathBuf {
        self.root.join("GPI").join(format!("{}.gpi", category))
    }

    /// The icon bitmap the converter embeds for a category.
    pub fn icon(&self, category: &str) -> PathBuf {
        self.root.join("Icons").join(format!("{}.bmp", category))
    }
}

/// Failure of one category job.
#[derive(Debug, Error)]
pub enum CategoryError {
    #[error("extraction failed: {0}")]
    Extraction(ExecError),
    #[error("node list {} is malformed: {source}", .path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: osmpoi::Error,
    },
    #[error("cannot write node list {}: {source}", .path.display())]
    Serialize {
        path: PathBuf,
        #[source]
        source: osmpoi::Error,
    },
    #[error("conversion failed: {0}")]
    Conversion(ExecError),
    #[error("{}", fs_message(.action, .path, .source))]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        source: io::Error,
    },
}

/// Permission problems get a dedicated message, everything else carries
/// the io error verbatim.
fn fs_message(action: &str, path: &Path, source: &io::Error) -> String {
    if source.kind() == io::ErrorKind::PermissionDenied {
        format!("permission denied: cannot {} {}", action, path.display())
    } else {
        format!("cannot {} {}: {}", action, path.display(), source)
    }
}

/// Runs one category end to end.
///
/// Every step's failure is confined to this category; siblings keep
/// running.
pub fn process_category(cfg: &RunConfig, spec: &CategorySpec) -> Result<Stats, CategoryError> {
    let raw_path = cfg.layout.raw_osm(&spec.name);
    ensure_parent_dir(&raw_path)?;
    info!(
        "[{}] extracting nodes matching `{}`",
        spec.name, spec.tag_filter
    );
    exec::run_checked(&mut exec::osmosis_extract(
        &cfg.osmosis_bin,
        &cfg.pbf,
        &spec.tag_filter,
        &raw_path,
    ))
    .map_err(CategoryError::Extraction)?;

    let nodes = read_node_list(&raw_path).map_err(|source| CategoryError::Document {
        path: raw_path.clone(),
        source,
    })?;
    let num_extracted = nodes.len();

    let threshold = if cfg.filtering {
        spec.threshold_meters
    } else {
        0.0
    };
    if !cfg.filtering {
        debug!("[{}] thinning disabled, keeping every node", spec.name);
    }
    let thinned = filter_nodes(nodes, threshold, &cfg.labels);
    info!(
        "[{}] kept {} of {} nodes (suppression radius {} m)",
        spec.name,
        thinned.pois.len(),
        num_extracted,
        threshold
    );

    let filtered_path = cfg.layout.filtered_osm(&spec.name);
    ensure_parent_dir(&filtered_path)?;
    write_node_list(&filtered_path, &thinned.pois).map_err(|source| CategoryError::Serialize {
        path: filtered_path.clone(),
        source,
    })?;
    debug!("[{}] wrote {}", spec.name, filtered_path.display());

    let icon_path = cfg.layout.icon(&spec.name);
    ensure_parent_dir(&icon_path)?;
    let gpi_path = cfg.layout.gpi(&spec.name);
    ensure_parent_dir(&gpi_path)?;
    exec::run_checked(&mut exec::gpsbabel_convert(
        &cfg.gpsbabel_bin,
        &filtered_path,
        &spec.name,
        &icon_path,
        &gpi_path,
    ))
    .map_err(CategoryError::Conversion)?;
    info!("[{}] created {}", spec.name, gpi_path.display());

    Ok(Stats {
        num_categories: 1,
        num_failed: 0,
        num_extracted,
        num_retained: thinned.pois.len(),
    })
}

fn ensure_parent_dir(path: &Path) -> Result<(), CategoryError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| CategoryError::Filesystem {
            action: "create directory",
            path: dir.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
