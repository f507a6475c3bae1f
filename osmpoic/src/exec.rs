//! Invocation of the external extractor and converter.
//!
//! Commands are built as argument vectors and never pass through a shell.
//! Both tools are chatty, so output is captured and only attached to the
//! error when a tool fails.

use std::io;
use std::path::Path;
use std::process::{Command, ExitStatus};

use log::{debug, trace};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("cannot launch `{tool}`: {source}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },
    #[error("`{tool}` failed ({status}):\n{output}")]
    Failed {
        tool: String,
        status: ExitStatus,
        output: String,
    },
}

/// Builds the extractor invocation selecting one category's nodes from the
/// pbf extract into an OSM XML node list.
pub fn osmosis_extract(osmosis: &Path, pbf: &Path, tag_filter: &str, out: &Path) -> Command {
    let mut cmd = Command::new(osmosis);
    cmd.arg("--read-pbf")
        .arg(pbf)
        .arg("--node-key-value")
        .arg(format!("keyValueList={}", tag_filter))
        .arg("--write-xml")
        .arg(out);
    cmd
}

/// Builds the converter invocation turning a node list into a gpi database.
///
/// The category name and the icon bitmap ride in the output format options;
/// `unique=0` keeps equally named waypoints apart.
pub fn gpsbabel_convert(
    gpsbabel: &Path,
    input: &Path,
    category: &str,
    icon: &Path,
    out: &Path,
) -> Command {
    let mut cmd = Command::new(gpsbabel);
    cmd.arg("-i")
        .arg("osm")
        .arg("-f")
        .arg(input)
        .arg("-o")
        .arg(format!(
            "garmin_gpi,category={},bitmap={},unique=0",
            category,
            icon.display()
        ))
        .arg("-F")
        .arg(out);
    cmd
}

/// Runs a tool to completion, capturing its output.
///
/// A non-zero exit status turns into [`ExecError::Failed`] carrying the
/// combined stdout and stderr.
pub fn run_checked(cmd: &mut Command) -> Result<(), ExecError> {
    let tool = tool_name(cmd);
    debug!("running {:?}", cmd);
    let output = cmd.output().map_err(|source| ExecError::Launch {
        tool: tool.clone(),
        source,
    })?;

    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    let combined = combined.trim_end().to_string();

    if !output.status.success() {
        return Err(ExecError::Failed {
            tool,
            status: output.status,
            output: combined,
        });
    }
    if !combined.is_empty() {
        trace!("{} output:\n{}", tool, combined);
    }
    Ok(())
}

fn tool_name(cmd: &Command) -> String {
    let program = cmd.get_program();
    Path::new(program)
        .file_name()
        .unwrap_or(program)
        .to_string_lossy()
        .into_owned()
}
