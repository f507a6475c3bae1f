//! End-to-end runs of the binary against stub extractor and converter
//! executables.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::tempdir;

/// Emits a fixed node list with two nodes 45 m apart and a third 1.1 km
/// away, or fails for anything extracted into a `Broken` path.
const OSMOSIS_STUB: &str = r#"#!/bin/sh
out="$6"
case "$out" in
*Broken*)
    echo "simulated extraction failure" >&2
    exit 1
    ;;
esac
cat > "$out" <<'EOF'
<?xml version='1.0' encoding='UTF-8'?>
<osm version="0.6" generator="osmosis">
  <node id="1" version="1" lat="0" lon="0">
    <tag k="amenity" v="drinking_water"/>
  </node>
  <node id="2" version="1" lat="0" lon="0.0004"/>
  <node id="3" version="1" lat="0" lon="0.01"/>
</osm>
EOF
"#;

/// Copies its input to the output so the gpi artifact can be inspected.
const GPSBABEL_STUB: &str = "#!/bin/sh\ncp \"$4\" \"$8\"\n";

fn write_stub(path: &Path, script: &str) {
    fs::write(path, script).unwrap();
    let mut perms = fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms).unwrap();
}

fn setup(work: &Path, config: &str) {
    fs::write(work.join("POIs.yaml"), config).unwrap();
    fs::write(work.join("extract.pbf"), b"not a real pbf").unwrap();
    fs::create_dir(work.join("bin")).unwrap();
    write_stub(&work.join("bin/osmosis"), OSMOSIS_STUB);
    write_stub(&work.join("bin/gpsbabel"), GPSBABEL_STUB);
}

fn run_osmpoic(work: &Path, extra: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_osmpoic"))
        .args([
            "--config",
            "POIs.yaml",
            "--osmosis-bin",
            "bin/osmosis",
            "--gpsbabel-bin",
            "bin/gpsbabel",
        ])
        .args(extra)
        .current_dir(work)
        .output()
        .unwrap()
}

#[test]
fn thins_and_labels_the_extracted_nodes() {
    let work = tempdir().unwrap();
    setup(work.path(), "Water: [100, \"amenity.drinking_water\"]\n");

    let output = run_osmpoic(work.path(), &[]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let filtered =
        fs::read_to_string(work.path().join("osm_filtered/filtered_Water.osm")).unwrap();
    // The first node keeps its label, the second is 45 m away and dropped,
    // the third is far enough to survive.
    assert!(filtered.contains(r#"id="drinking_water""#));
    assert!(!filtered.contains("0.0004"));
    assert!(filtered.contains(r#"lon="0.01""#));

    let converted = fs::read_to_string(work.path().join("GPI/Water.gpi")).unwrap();
    assert_eq!(converted, filtered);
}

#[test]
fn no_filter_keeps_every_node() {
    let work = tempdir().unwrap();
    setup(work.path(), "Water: [100, \"amenity.drinking_water\"]\n");

    let output = run_osmpoic(work.path(), &["--no-filter"]);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let filtered =
        fs::read_to_string(work.path().join("osm_filtered/filtered_Water.osm")).unwrap();
    assert!(filtered.contains("0.0004"));
    assert!(filtered.contains(r#"id="drinking_water""#));
}

#[test]
fn failing_category_does_not_stop_the_others() {
    let work = tempdir().unwrap();
    setup(
        work.path(),
        "Broken: [100, \"amenity.bench\"]\nWater: [100, \"amenity.drinking_water\"]\n",
    );

    let output = run_osmpoic(work.path(), &["extract.pbf"]);
    assert!(!output.status.success());
    assert!(work.path().join("GPI/Water.gpi").exists());
    assert!(!work.path().join("GPI/Broken.gpi").exists());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Broken"), "stderr: {}", stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 failed"), "stdout: {}", stdout);
}

#[test]
fn parallel_mode_reports_the_same_failures() {
    let work = tempdir().unwrap();
    setup(
        work.path(),
        "Broken: [100, \"amenity.bench\"]\nWater: [100, \"amenity.drinking_water\"]\n",
    );

    let output = run_osmpoic(work.path(), &["--parallel", "--workers", "2"]);
    assert!(!output.status.success());
    assert!(work.path().join("GPI/Water.gpi").exists());
    assert!(!work.path().join("GPI/Broken.gpi").exists());
}
