//! Category catalog loaded from the POIs.yaml configuration.
//!
//! The file maps category names to a pair of suppression radius and
//! extractor tag filter:
//!
//! ```yaml
//! Water: [500, "amenity.drinking_water"]
//! Campsite: [0, "tourism.camp_site,tourism.caravan_site"]
//! ```
//!
//! Categories are processed in file order, so the catalog keeps it.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use thiserror::Error;

/// One configured POI category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySpec {
    /// Name keying the work files, the gpi category and the icon.
    pub name: String,
    /// Minimum distance in meters between two retained nodes.
    pub threshold_meters: f64,
    /// Extractor tag filter expression selecting the category's nodes.
    pub tag_filter: String,
}

/// All configured categories, in file order.
#[derive(Debug, Default)]
pub struct Catalog {
    pub categories: Vec<CategorySpec>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("category `{0}`: threshold is not a finite number")]
    BadThreshold(String),
    #[error("category `{0}`: empty tag filter expression")]
    EmptyTagFilter(String),
    #[error("category name `{0}` must not contain `/`, `\\` or `,`")]
    BadName(String),
    #[error("empty category name")]
    EmptyName,
}

/// Loads and validates the catalog.
pub fn load(path: &Path) -> Result<Catalog, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let catalog: Catalog = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    for spec in &catalog.categories {
        validate(spec)?;
    }
    Ok(catalog)
}

/// The name keys filenames and the converter's category option, so a few
/// characters are off limits.
fn validate(spec: &CategorySpec) -> Result<(), ConfigError> {
    if spec.name.is_empty() {
        return Err(ConfigError::EmptyName);
    }
    if spec.name.contains(|c| matches!(c, '/' | '\\' | ',')) {
        return Err(ConfigError::BadName(spec.name.clone()));
    }
    if !spec.threshold_meters.is_finite() {
        return Err(ConfigError::BadThreshold(spec.name.clone()));
    }
    if spec.tag_filter.trim().is_empty() {
        return Err(ConfigError::EmptyTagFilter(spec.name.clone()));
    }
    Ok(())
}

impl<'de> Deserialize<'de> for Catalog {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = Catalog;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a mapping from category name to [radius-in-meters, tag-filter]")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Catalog, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut categories = Vec::new();
                let mut seen = HashSet::new();
                while let Some((name, (threshold_meters, tag_filter))) =
                    map.next_entry::<String, (f64, String)>()?
                {
                    if !seen.insert(name.clone()) {
                        return Err(de::Error::custom(format!("duplicate category `{}`", name)));
                    }
                    categories.push(CategorySpec {
                        name,
                        threshold_meters,
                        tag_filter,
                    });
                }
                Ok(Catalog { categories })
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}
