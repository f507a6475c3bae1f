//! Thins a node list and writes the filtered result to stdout.
//!
//! Demonstrates
//!
//!  * reading an extractor's node list
//!  * thinning clustered nodes by a suppression radius
//!  * serializing the labeled result
//!
//! LICENSE
//!
//! The code in this example file is released into the Public Domain.

use osmpoi::{filter_nodes, read_node_list, write_node_list_to, LabelSpec};

use std::io;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("USAGE: thin <nodes.osm> [radius-in-meters]")?;
    let radius = match std::env::args().nth(2) {
        Some(arg) => arg.parse()?,
        None => 100.0,
    };

    let nodes = read_node_list(Path::new(&path))?;
    let num_read = nodes.len();
    let thinned = filter_nodes(nodes, radius, &LabelSpec::default());
    eprintln!("kept {} of {} nodes", thinned.pois.len(), num_read);

    let stdout = io::stdout();
    write_node_list_to(stdout.lock(), &thinned.pois)?;
    Ok(())
}
