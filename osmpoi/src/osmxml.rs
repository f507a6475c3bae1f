//! Reading and writing of OSM XML node lists.
//!
//! The reader consumes what an extractor produces for a node-only extract:
//! an `<osm>` root with `<node lat=".." lon="..">` elements carrying
//! `<tag k=".." v=".."/>` children. The writer emits the filtered list the
//! downstream converter consumes. The converter reads the waypoint name
//! from the `id` attribute, so the composed display label rides there,
//! with line breaks encoded as `&#xA;` to survive attribute-value
//! normalization.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::name::QName;
use quick_xml::{Reader, Writer};
use thiserror::Error;

use crate::filter::Poi;
use crate::geo::Coord;

/// A key/value tag attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// A node as read from the extractor's output, in document order.
#[derive(Debug, Clone)]
pub struct RawNode {
    /// The source document's `id` attribute, kept for diagnostics.
    pub id: String,
    pub coord: Coord,
    pub tags: Vec<Tag>,
}

/// Errors produced while reading or writing node lists.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),
    #[error("node `{id}`: missing attribute `{attr}`")]
    MissingAttr { id: String, attr: &'static str },
    #[error("node `{id}`: attribute `{attr}` is not a number: `{value}`")]
    BadNumber {
        id: String,
        attr: &'static str,
        value: String,
    },
    #[error("node `{id}`: coordinate ({lat}, {lon}) is out of range")]
    CoordOutOfRange { id: String, lat: f64, lon: f64 },
}

/// Reads a node list from a file, preserving node and tag order.
pub fn read_node_list(path: &Path) -> Result<Vec<RawNode>, Error> {
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_node_list_from(BufReader::new(file))
}

/// Reads a node list from any buffered input.
///
/// Elements other than `node` and `tag` are skipped, as are tags with a
/// missing key or value. Nodes with unusable coordinates fail the whole
/// document.
pub fn read_node_list_from<R: BufRead>(input: R) -> Result<Vec<RawNode>, Error> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut nodes = Vec::new();
    let mut current: Option<RawNode> = None;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Eof => break,
            Event::Start(e) if e.name().as_ref() == b"node" => {
                current = Some(parse_node(&e)?);
            }
            Event::Empty(e) if e.name().as_ref() == b"node" => {
                nodes.push(parse_node(&e)?);
            }
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == b"tag" => {
                if let Some(node) = current.as_mut() {
                    if let Some(tag) = parse_tag(&e)? {
                        node.tags.push(tag);
                    }
                }
            }
            Event::End(e) if e.name().as_ref() == b"node" => {
                if let Some(node) = current.take() {
                    nodes.push(node);
                }
            }
            _ => {}
        }
        buf.clear();
    }
    Ok(nodes)
}

fn parse_node(e: &BytesStart) -> Result<RawNode, Error> {
    let id = attr_value(e, b"id")?.unwrap_or_default();
    let lat = coord_attr(e, &id, "lat")?;
    let lon = coord_attr(e, &id, "lon")?;
    let coord = Coord { lat, lon };
    if !coord.is_valid() {
        return Err(Error::CoordOutOfRange { id, lat, lon });
    }
    Ok(RawNode {
        id,
        coord,
        tags: Vec::new(),
    })
}

fn coord_attr(e: &BytesStart, id: &str, attr: &'static str) -> Result<f64, Error> {
    let value = attr_value(e, attr.as_bytes())?.ok_or_else(|| Error::MissingAttr {
        id: id.to_string(),
        attr,
    })?;
    value.parse().map_err(|_| Error::BadNumber {
        id: id.to_string(),
        attr,
        value,
    })
}

fn parse_tag(e: &BytesStart) -> Result<Option<Tag>, Error> {
    let key = attr_value(e, b"k")?;
    let value = attr_value(e, b"v")?;
    Ok(match (key, value) {
        (Some(key), Some(value)) => Some(Tag { key, value }),
        _ => None,
    })
}

fn attr_value(event: &BytesStart, key: &[u8]) -> Result<Option<String>, quick_xml::Error> {
    for attr in event.attributes().with_checks(false) {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Writes the filtered node list to a file.
pub fn write_node_list(path: &Path, pois: &[Poi]) -> Result<(), Error> {
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut out = BufWriter::new(file);
    write_node_list_to(&mut out, pois)?;
    out.flush().map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the filtered node list to any output.
pub fn write_node_list_to<W: Write>(out: W, pois: &[Poi]) -> Result<(), Error> {
    let mut writer = Writer::new_with_indent(out, b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let mut osm = BytesStart::new("osm");
    osm.push_attribute(("version", "0.6"));
    osm.push_attribute(("generator", "osmpoi"));
    writer.write_event(Event::Start(osm))?;

    for poi in pois {
        let mut node = BytesStart::new("node");
        node.push_attribute(label_attribute(&poi.label));
        node.push_attribute(("lat", poi.coord.lat.to_string().as_str()));
        node.push_attribute(("lon", poi.coord.lon.to_string().as_str()));

        if poi.tags.is_empty() {
            writer.write_event(Event::Empty(node))?;
        } else {
            writer.write_event(Event::Start(node))?;
            for tag in &poi.tags {
                let mut t = BytesStart::new("tag");
                t.push_attribute(("k", tag.key.as_str()));
                t.push_attribute(("v", tag.value.as_str()));
                writer.write_event(Event::Empty(t))?;
            }
            writer.write_event(Event::End(BytesEnd::new("node")))?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new("osm")))?;
    Ok(())
}

/// Builds the raw `id` attribute carrying the display label.
///
/// The value is escaped here and must not be escaped again by the writer,
/// otherwise the `&#xA;` line breaks would turn into literal text.
fn label_attribute(label: &str) -> Attribute<'static> {
    let value = escape(label).replace('\n', "&#xA;").into_bytes();
    Attribute {
        key: QName(b"id"),
        value: Cow::Owned(value),
    }
}
