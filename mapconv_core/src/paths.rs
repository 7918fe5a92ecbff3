//! Centralized path resolution.
//!
//! Every component that needs a file path goes through here instead of
//! building one locally, so there is exactly one place that knows the
//! on-disk layout of a working directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

use crate::error::{ConvertError, Result};

const QUALIFIER: &str = "";
const ORGANISATION: &str = "";
const PROGRAM_NAME: &str = "Legacy Map Converter";

/// Root of the source-map tree for `map_name`, under `source_root`.
pub fn map_dir(source_root: &Path, map_name: &str) -> PathBuf {
    source_root.join(map_name)
}

pub fn control_points_con(source_root: &Path, map_name: &str) -> PathBuf {
    map_dir(source_root, map_name).join("Conquest").join("ControlPoints.con")
}

pub fn soldier_spawns_con(source_root: &Path, map_name: &str) -> PathBuf {
    map_dir(source_root, map_name).join("Conquest").join("SoldierSpawns.con")
}

pub fn object_spawns_con(source_root: &Path, map_name: &str) -> PathBuf {
    map_dir(source_root, map_name).join("Conquest").join("ObjectSpawns.con")
}

pub fn static_objects_con(source_root: &Path, map_name: &str) -> PathBuf {
    map_dir(source_root, map_name).join("StaticObjects.con")
}

pub fn heightmap_raw(source_root: &Path, map_name: &str) -> PathBuf {
    map_dir(source_root, map_name).join("Heightdata").join("HeightMap.raw")
}

/// Path to the target-editor asset catalog document.
pub fn catalog_path(output_root: &Path) -> PathBuf {
    output_root.join("catalog.json")
}

/// Path to the optional explicit mapping table document.
pub fn mapping_path(output_root: &Path) -> PathBuf {
    output_root.join("mapping.json")
}

/// Path the emitted scene file is written to for a given map.
pub fn scene_path(output_root: &Path, map_name: &str) -> PathBuf {
    output_root.join(format!("{map_name}.tscn"))
}

/// Path the packaged experience JSON is written to for a given map.
pub fn experience_path(output_root: &Path, map_name: &str) -> PathBuf {
    output_root.join(format!("{map_name}.experience.json"))
}

/// Path the run report JSON is written to for a given map.
pub fn report_path(output_root: &Path, map_name: &str) -> PathBuf {
    output_root.join(format!("{map_name}.report.json"))
}

/// Process-lifetime config directory, for cached/derived data such as a
/// serialized terrain height-grid cache.
#[must_use = "Many things depend on this folder existing. So better check this worked."]
pub fn init_config_path() -> Result<PathBuf> {
    match ProjectDirs::from(QUALIFIER, ORGANISATION, PROGRAM_NAME) {
        Some(proj_dirs) => {
            let config_path = proj_dirs.config_dir().to_path_buf();
            std::fs::create_dir_all(&config_path)?;
            Ok(config_path)
        }
        None => Err(ConvertError::IOError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "could not resolve a config directory for this platform",
        ))),
    }
}

/// Writes `contents` to `path` atomically via a temp-file-plus-rename,
/// so a crashed run never leaves a half-written artifact.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;
    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("out")
    ));
    std::fs::write(&tmp_path, contents)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}
