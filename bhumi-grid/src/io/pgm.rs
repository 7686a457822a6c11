//! ROS map_server export (PGM image + YAML descriptor).
//!
//! - `{base}.pgm` - Binary PGM (P5) grayscale image, top row first
//! - `{base}.yaml` - map_server metadata pointing at the image
//!
//! Pixel values: free 254, occupied 0, unknown 205.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::CellState;
use crate::grid::MapSnapshot;

use super::IoError;

/// Occupancy threshold written to the descriptor.
const OCCUPIED_THRESH: f32 = 0.65;

/// Free threshold written to the descriptor.
const FREE_THRESH: f32 = 0.196;

/// map_server YAML descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapYaml {
    /// PGM image filename (relative to the YAML file).
    pub image: String,
    /// Meters per pixel (one stored cell).
    pub resolution: f32,
    /// World coordinates of the bottom-left pixel `[x, y, yaw]`.
    pub origin: [f32; 3],
    /// Pixels darker than this are occupied.
    pub negate: u8,
    /// Occupied probability threshold.
    pub occupied_thresh: f32,
    /// Free probability threshold.
    pub free_thresh: f32,
}

impl MapYaml {
    /// Descriptor for `snapshot` stored next to `image`.
    pub fn for_snapshot(snapshot: &MapSnapshot, image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            resolution: snapshot.cell_size,
            origin: [snapshot.origin.x, snapshot.origin.y, 0.0],
            negate: 0,
            occupied_thresh: OCCUPIED_THRESH,
            free_thresh: FREE_THRESH,
        }
    }
}

/// Write a snapshot as binary PGM to any writer.
///
/// Image rows run top to bottom, so grid row `height - 1` comes first.
pub fn write_pgm<W: Write>(snapshot: &MapSnapshot, writer: &mut W) -> Result<(), IoError> {
    let width = snapshot.width;
    let height = snapshot.height;

    let mut pixels = Vec::with_capacity(width * height);
    for row in (0..height).rev() {
        let start = row * width;
        let end = (start + width).min(snapshot.data.len());
        let cells = snapshot.data.get(start..end).unwrap_or_default();
        pixels.extend(
            cells
                .iter()
                .map(|&v| CellState::from_ros_occupancy(v).to_pgm()),
        );
    }
    if pixels.len() != width * height {
        return Err(IoError::InvalidFormat(format!(
            "snapshot has {} cells, expected {}x{}",
            snapshot.data.len(),
            width,
            height
        )));
    }

    write!(writer, "P5\n{} {}\n255\n", width, height)?;
    writer.write_all(&pixels)?;
    Ok(())
}

/// Write a snapshot to a PGM file.
pub fn export_pgm(snapshot: &MapSnapshot, path: &Path) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_pgm(snapshot, &mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write the map_server descriptor for `snapshot`.
pub fn export_yaml(snapshot: &MapSnapshot, path: &Path, image: &str) -> Result<(), IoError> {
    let descriptor = MapYaml::for_snapshot(snapshot, image);
    let mut writer = BufWriter::new(File::create(path)?);
    serde_yaml::to_writer(&mut writer, &descriptor)?;
    writer.flush()?;
    Ok(())
}

/// Write `{base}.pgm` and `{base}.yaml`. Returns both paths.
pub fn export_ros_map(snapshot: &MapSnapshot, base: &Path) -> Result<(PathBuf, PathBuf), IoError> {
    let pgm_path = base.with_extension("pgm");
    let yaml_path = base.with_extension("yaml");
    let image = pgm_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| IoError::InvalidFormat(format!("no file name in {}", base.display())))?;

    export_pgm(snapshot, &pgm_path)?;
    export_yaml(snapshot, &yaml_path, &image)?;

    info!(
        "[Export] wrote {}x{} map to {}",
        snapshot.width,
        snapshot.height,
        yaml_path.display()
    );
    Ok((pgm_path, yaml_path))
}
