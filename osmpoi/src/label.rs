//! Composition of display labels from node tags.

use itertools::Itertools;

use crate::osmxml::Tag;

/// Tag keys whose values make up a node's display label, in display order.
pub const DEFAULT_LABEL_KEYS: [&str; 4] = ["amenity", "shop", "website", "opening_hours"];

/// Number of characters after which a label value is broken onto a new line.
///
/// Small GPS displays fit roughly this many characters per line.
const WRAP_WIDTH: usize = 35;

/// Ordered whitelist of tag keys that make up a node's display label.
#[derive(Debug, Clone)]
pub struct LabelSpec {
    keys: Vec<String>,
}

impl Default for LabelSpec {
    fn default() -> Self {
        Self::new(DEFAULT_LABEL_KEYS.iter().map(|s| s.to_string()).collect())
    }
}

impl LabelSpec {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    /// Composes the display label for a node with the given tags.
    ///
    /// Values of whitelisted keys are wrapped every 35 characters and joined
    /// with `'\n'` in whitelist order. Keys missing from the node are
    /// skipped; if the node carries a key twice, the first occurrence wins.
    /// A node without any whitelisted tag gets an empty label.
    pub fn compose(&self, tags: &[Tag]) -> String {
        self.keys
            .iter()
            .filter_map(|key| tags.iter().find(|tag| &tag.key == key))
            .map(|tag| wrap(&tag.value, WRAP_WIDTH))
            .join("\n")
    }
}

/// Breaks `value` onto a new line after every `width` characters.
fn wrap(value: &str, width: usize) -> String {
    let mut wrapped = String::with_capacity(value.len() + value.len() / width);
    for (i, c) in value.chars().enumerate() {
        if i > 0 && i % width == 0 {
            wrapped.push('\n');
        }
        wrapped.push(c);
    }
    wrapped
}
