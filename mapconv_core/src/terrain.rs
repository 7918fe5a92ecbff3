//! Target Terrain / Terrain Provider: ground height and bounds for the
//! chosen base terrain.

use std::collections::BTreeSet;
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::catalog::AssetCatalog;
use crate::constants::terrain::HEIGHT_GRID_SIZE;
use crate::error::{ConvertError, Result};
use crate::geometry::{Aabb3D, Vector3};

/// A single mesh triangle, vertex positions in world space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MeshTriangle {
    pub a: Vector3,
    pub b: Vector3,
    pub c: Vector3,
}

/// The base terrain mesh this terrain's height grid is derived from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshDescription {
    pub triangles: Vec<MeshTriangle>,
}

impl MeshDescription {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConvertError::TerrainMeshNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

impl MeshDescription {
    pub fn bounds(&self) -> Option<Aabb3D> {
        let mut it = self.triangles.iter().flat_map(|t| [t.a, t.b, t.c]);
        let first = it.next()?;
        let mut min = first;
        let mut max = first;
        for v in it {
            min = Vector3::new(min.x.min(v.x), min.y.min(v.y), min.z.min(v.z));
            max = Vector3::new(max.x.max(v.x), max.y.max(v.y), max.z.max(v.z));
        }
        Some(Aabb3D::new(min, max))
    }
}

/// Barycentric XZ-projected height lookup for `p = (x, z)` against
/// triangle `tri`, or `None` if `p` falls outside the triangle's XZ
/// projection.
fn triangle_height_at(tri: &MeshTriangle, x: f64, z: f64) -> Option<f64> {
    let (x1, z1) = (tri.a.x, tri.a.z);
    let (x2, z2) = (tri.b.x, tri.b.z);
    let (x3, z3) = (tri.c.x, tri.c.z);

    let denom = (z2 - z3) * (x1 - x3) + (x3 - x2) * (z1 - z3);
    if denom.abs() < f64::EPSILON {
        return None;
    }

    let w1 = ((z2 - z3) * (x - x3) + (x3 - x2) * (z - z3)) / denom;
    let w2 = ((z3 - z1) * (x - x3) + (x1 - x3) * (z - z3)) / denom;
    let w3 = 1.0 - w1 - w2;

    const EPS: f64 = -1e-9;
    if w1 >= EPS && w2 >= EPS && w3 >= EPS {
        Some(w1 * tri.a.y + w2 * tri.b.y + w3 * tri.c.y)
    } else {
        None
    }
}

/// Cached per-terrain height grid and metadata, plus the allow-list of
/// asset names usable on it.
#[derive(Debug, Clone)]
pub struct TargetTerrain {
    name: String,
    mesh_bounds: Aabb3D,
    mesh_center: Vector3,
    height_grid: Vec<f32>,
    grid_size: usize,
    allowed_asset_names: BTreeSet<String>,
}

impl TargetTerrain {
    /// Builds a terrain's height grid from its mesh. Fails if the mesh
    /// has no triangles or degenerate bounds.
    pub fn from_mesh(name: impl Into<String>, mesh: &MeshDescription) -> Result<Self> {
        let name = name.into();
        let bounds = mesh.bounds().ok_or_else(|| ConvertError::TerrainError {
            terrain: name.clone(),
            reason: "mesh has no triangles".to_string(),
        })?;

        if bounds.max().x <= bounds.min().x || bounds.max().z <= bounds.min().z {
            return Err(ConvertError::TerrainError { terrain: name, reason: "degenerate XZ bounds".to_string() });
        }

        let grid_size = HEIGHT_GRID_SIZE;
        let min_mesh_y = mesh.triangles.iter().flat_map(|t| [t.a.y, t.b.y, t.c.y]).fold(f64::INFINITY, f64::min);

        let mut height_grid = vec![0.0f32; grid_size * grid_size];
        let (min, max) = (bounds.min(), bounds.max());
        let cell_w = (max.x - min.x) / grid_size as f64;
        let cell_d = (max.z - min.z) / grid_size as f64;

        for row in 0..grid_size {
            let z = min.z + (row as f64 + 0.5) * cell_d;
            for col in 0..grid_size {
                let x = min.x + (col as f64 + 0.5) * cell_w;
                let height = mesh
                    .triangles
                    .iter()
                    .find_map(|tri| triangle_height_at(tri, x, z))
                    .unwrap_or(min_mesh_y);
                height_grid[row * grid_size + col] = height as f32;
            }
        }

        Ok(Self {
            name,
            mesh_center: bounds.center(),
            mesh_bounds: bounds,
            height_grid,
            grid_size,
            allowed_asset_names: BTreeSet::new(),
        })
    }

    /// Populates this terrain's allow-list from a loaded catalog.
    pub fn with_allowed_assets(mut self, catalog: &AssetCatalog, all_asset_names: impl IntoIterator<Item = String>) -> Self {
        self.allowed_asset_names = all_asset_names.into_iter().filter(|n| catalog.is_allowed(n, &self.name)).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn center(&self) -> Vector3 {
        self.mesh_center
    }

    pub fn bounds(&self) -> Aabb3D {
        self.mesh_bounds
    }

    pub fn is_allowed(&self, asset_name: &str) -> bool {
        self.allowed_asset_names.is_empty() || self.allowed_asset_names.contains(asset_name)
    }

    fn grid_value(&self, row: usize, col: usize) -> f64 {
        let row = row.min(self.grid_size - 1);
        let col = col.min(self.grid_size - 1);
        self.height_grid[row * self.grid_size + col] as f64
    }

    /// World height at `(x, z)`. Points outside bounds clamp to the
    /// nearest edge cell; interior queries bilinearly interpolate over
    /// the four surrounding grid cells.
    pub fn height_at(&self, x: f64, z: f64) -> f64 {
        let min = self.mesh_bounds.min();
        let max = self.mesh_bounds.max();
        let cell_w = (max.x - min.x) / self.grid_size as f64;
        let cell_d = (max.z - min.z) / self.grid_size as f64;

        let gx = ((x - min.x) / cell_w - 0.5).clamp(0.0, (self.grid_size - 1) as f64);
        let gz = ((z - min.z) / cell_d - 0.5).clamp(0.0, (self.grid_size - 1) as f64);

        let col0 = gx.floor() as usize;
        let row0 = gz.floor() as usize;
        let col1 = (col0 + 1).min(self.grid_size - 1);
        let row1 = (row0 + 1).min(self.grid_size - 1);

        let fx = gx - col0 as f64;
        let fz = gz - row0 as f64;

        let h00 = self.grid_value(row0, col0);
        let h10 = self.grid_value(row0, col1);
        let h01 = self.grid_value(row1, col0);
        let h11 = self.grid_value(row1, col1);

        let top = h00 * (1.0 - fx) + h10 * fx;
        let bottom = h01 * (1.0 - fx) + h11 * fx;
        top * (1.0 - fz) + bottom * fz
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn flat_terrain(size: f64, y: f64) -> MeshDescription {
        let corners = [
            Vector3::new(-size, y, -size),
            Vector3::new(size, y, -size),
            Vector3::new(size, y, size),
            Vector3::new(-size, y, size),
        ];
        MeshDescription {
            triangles: vec![
                MeshTriangle { a: corners[0], b: corners[1], c: corners[2] },
                MeshTriangle { a: corners[0], b: corners[2], c: corners[3] },
            ],
        }
    }

    #[test]
    fn flat_terrain_reports_constant_height() {
        let mesh = flat_terrain(100.0, 50.0);
        let terrain = TargetTerrain::from_mesh("Flat", &mesh).unwrap();
        assert!((terrain.height_at(0.0, 0.0) - 50.0).abs() < 1e-6);
        assert!((terrain.height_at(-99.0, 99.0) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn queries_outside_bounds_clamp() {
        let mesh = flat_terrain(100.0, 50.0);
        let terrain = TargetTerrain::from_mesh("Flat", &mesh).unwrap();
        assert!((terrain.height_at(10_000.0, 10_000.0) - 50.0).abs() < 1e-6);
    }

    #[test]
    fn off_center_terrain_has_non_zero_center() {
        let y = 10.0;
        let offset = 500.0;
        let corners = [
            Vector3::new(offset - 50.0, y, offset - 50.0),
            Vector3::new(offset + 50.0, y, offset - 50.0),
            Vector3::new(offset + 50.0, y, offset + 50.0),
            Vector3::new(offset - 50.0, y, offset + 50.0),
        ];
        let mesh = MeshDescription {
            triangles: vec![
                MeshTriangle { a: corners[0], b: corners[1], c: corners[2] },
                MeshTriangle { a: corners[0], b: corners[2], c: corners[3] },
            ],
        };
        let terrain = TargetTerrain::from_mesh("Offset", &mesh).unwrap();
        assert!((terrain.center().x - offset).abs() < 1e-6);
        assert!((terrain.center().z - offset).abs() < 1e-6);
    }

    #[test]
    fn degenerate_bounds_is_an_error() {
        let mesh = MeshDescription { triangles: vec![] };
        assert!(TargetTerrain::from_mesh("Empty", &mesh).is_err());
    }
}
