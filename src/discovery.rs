//! Checker bundle and checker file discovery.
//!
//! Discovery resolves which bundles run, and in what sequence. The same
//! two-tier rule applies at both levels: entries named in an ordering
//! manifest come first, in manifest order; a manifest entry with no
//! matching directory or file is reported and skipped; everything else on
//! disk follows, in directory-read order (stable within a run).

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::logger::Logger;

/// Root-level ordering manifest, `order.toml` in a checks root.
#[derive(Debug, Clone, Default, Deserialize)]
struct RootManifest {
    #[serde(default)]
    order: Vec<String>,
}

/// File name of the root ordering manifest
pub const ROOT_MANIFEST_NAME: &str = "order.toml";

/// Read the ordering manifest of one checks root.
///
/// A missing manifest means no explicit order; an unparseable one is
/// reported and treated the same way.
fn load_root_order(root: &Path, logger: &dyn Logger) -> Vec<String> {
    let path = root.join(ROOT_MANIFEST_NAME);
    let contents = match std::fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(_) => return Vec::new(),
    };
    match toml::from_str::<RootManifest>(&contents) {
        Ok(manifest) => manifest.order,
        Err(e) => {
            logger.error(&format!(
                "Could not parse ordering manifest {}: {}",
                path.display(),
                e
            ));
            Vec::new()
        }
    }
}

/// Discover bundle directories under one or more checks roots.
///
/// Roots are processed in the given sequence (the format's default root
/// first, then any additional roots), each contributing its manifest-named
/// bundles first and its remaining subdirectories afterwards.
pub fn discover_bundles(roots: &[PathBuf], logger: &dyn Logger) -> Vec<PathBuf> {
    let mut bundles = Vec::new();
    for root in roots {
        discover_bundles_in_root(root, &mut bundles, logger);
    }
    bundles
}

fn discover_bundles_in_root(root: &Path, bundles: &mut Vec<PathBuf>, logger: &dyn Logger) {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) => {
            logger.error(&format!(
                "Could not read checks root {}: {}",
                root.display(),
                e
            ));
            return;
        }
    };

    // (name, path) pairs in directory-read order
    let mut candidates: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with('.') {
            continue;
        }
        candidates.push((name.to_string(), path));
    }

    let order = load_root_order(root, logger);
    let mut assigned = vec![false; candidates.len()];

    for wanted in &order {
        match candidates.iter().position(|(name, _)| name == wanted) {
            Some(index) => {
                if !assigned[index] {
                    assigned[index] = true;
                    bundles.push(candidates[index].1.clone());
                }
            }
            None => {
                logger.error(&format!(
                    "Provided bundle {} is defined in order but cannot be found.",
                    wanted
                ));
            }
        }
    }

    for (index, (_, path)) in candidates.iter().enumerate() {
        if !assigned[index] {
            bundles.push(path.clone());
        }
    }
}

/// Discover checker descriptor files (`check_*.toml`) inside one bundle
/// directory, applying the bundle's ordering manifest.
///
/// A manifest entry may reference either a bare unit name (`check_foo`)
/// or a full file name (`check_foo.toml`).
pub fn discover_checker_files(
    bundle_dir: &Path,
    order: &[String],
    logger: &dyn Logger,
) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(bundle_dir) {
        Ok(entries) => entries,
        Err(e) => {
            logger.error(&format!(
                "Could not read bundle directory {}: {}",
                bundle_dir.display(),
                e
            ));
            return Vec::new();
        }
    };

    let mut candidates: Vec<(String, PathBuf)> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with("check_") && name.ends_with(".toml") {
            candidates.push((name.to_string(), path));
        }
    }

    let mut files = Vec::new();
    let mut assigned = vec![false; candidates.len()];

    for wanted in order {
        let full_name = format!("{}.toml", wanted);
        let position = candidates
            .iter()
            .position(|(name, _)| name == wanted || name == &full_name);
        match position {
            Some(index) => {
                if !assigned[index] {
                    assigned[index] = true;
                    files.push(candidates[index].1.clone());
                }
            }
            None => {
                logger.error(&format!(
                    "Provided checker {} is defined in order but cannot be found.",
                    wanted
                ));
            }
        }
    }

    for (index, (_, path)) in candidates.iter().enumerate() {
        if !assigned[index] {
            files.push(path.clone());
        }
    }

    files
}

/// Unit name of a checker descriptor file: its stem, e.g. `check_road_ids`
pub fn checker_unit_name(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}
