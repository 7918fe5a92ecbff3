//! Core entities shared across the pipeline.

use std::collections::{BTreeMap, BTreeSet};

use getset::{CopyGetters, Getters};
use serde_derive::{Deserialize, Serialize};

use crate::geometry::{Aabb2D, Transform};

/// Team ownership of a gameplay entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Team1,
    Team2,
    Neutral,
}

impl Team {
    pub fn from_source_id(id: i64) -> Self {
        match id {
            1 => Team::Team1,
            2 => Team::Team2,
            _ => Team::Neutral,
        }
    }
}

/// Role a [`ControlPoint`] plays in the emitted scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlPointRole {
    HeadquartersAxis,
    HeadquartersAllies,
    NeutralCapturable,
}

/// Catalog category an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetCategory {
    Tree,
    Building,
    Prop,
    Vehicle,
    StationaryWeapon,
    Spawner,
    Gameplay,
    Terrain,
    Water,
    Other,
}

impl AssetCategory {
    /// Categories a `self` source token is allowed to resolve onto
    /// without crossing into an incompatible family.
    pub fn compatible_targets(self) -> &'static [AssetCategory] {
        match self {
            AssetCategory::Tree => &[AssetCategory::Tree],
            AssetCategory::Building => &[AssetCategory::Building],
            AssetCategory::Prop => &[AssetCategory::Prop, AssetCategory::Building],
            AssetCategory::Vehicle => &[AssetCategory::Vehicle, AssetCategory::Spawner],
            AssetCategory::StationaryWeapon => &[AssetCategory::StationaryWeapon, AssetCategory::Spawner],
            AssetCategory::Spawner => &[AssetCategory::Spawner, AssetCategory::Vehicle],
            AssetCategory::Gameplay => &[AssetCategory::Gameplay],
            AssetCategory::Terrain => &[AssetCategory::Terrain],
            AssetCategory::Water => &[AssetCategory::Water],
            AssetCategory::Other => &[AssetCategory::Other, AssetCategory::Prop],
        }
    }
}

/// A resolved or resolvable target-editor asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct AssetRef {
    pub source_token: String,
    pub target_type: Option<String>,
    pub category: AssetCategory,
    pub restrictions: BTreeSet<String>,
    /// Catalog directory this asset lives under, e.g. `"nature/trees"`.
    pub directory: String,
}

impl AssetRef {
    /// Whether this asset is usable on `base_terrain`: an empty
    /// restriction set means universally allowed.
    pub fn is_allowed_on(&self, base_terrain: &str) -> bool {
        self.restrictions.is_empty() || self.restrictions.contains(base_terrain)
    }
}

/// A scalar value carried in a `PlacedObject`'s free-form `extra` map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Integer(i64),
}

/// A single placed, templated object in a scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, CopyGetters, Getters)]
pub struct PlacedObject {
    #[getset(get_copy = "pub")]
    pub id: i64,
    #[getset(get = "pub")]
    pub template: AssetRef,
    #[getset(get_copy = "pub")]
    pub transform: Transform,
    #[getset(get_copy = "pub")]
    pub team: Team,
    #[getset(get_copy = "pub")]
    pub parent_id: Option<i64>,
    #[getset(get = "pub")]
    pub extra: BTreeMap<String, Scalar>,
}

/// A named gameplay position: a headquarters or a neutral capturable
/// point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct ControlPoint {
    #[getset(get = "pub")]
    pub name: String,
    #[getset(get_copy = "pub")]
    pub position: crate::geometry::Vector3,
    #[getset(get_copy = "pub")]
    pub team: Team,
    #[getset(get_copy = "pub")]
    pub role: ControlPointRole,
}

impl ControlPoint {
    pub fn is_headquarters(&self) -> bool {
        matches!(self.role, ControlPointRole::HeadquartersAxis | ControlPointRole::HeadquartersAllies)
    }
}

/// A deployable infantry position, parented to an owning HQ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnPoint {
    pub position: crate::geometry::Vector3,
    pub rotation: crate::geometry::Rotation,
    pub owner_name: String,
}

/// A periodic vehicle spawner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleSpawner {
    pub source_class: String,
    pub target_vehicle_enum_index: usize,
    pub position: crate::geometry::Vector3,
    pub rotation: crate::geometry::Rotation,
    pub team: Team,
    /// True when this is an air/helipad spawner rather than a ground one.
    pub is_air: bool,
}

/// The immutable result of parsing a source-map directory tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct SourceMap {
    pub name: String,
    pub bounds: Aabb2D,
    pub control_points: Vec<ControlPoint>,
    pub spawn_points: Vec<SpawnPoint>,
    pub vehicle_spawners: Vec<VehicleSpawner>,
    pub static_objects: Vec<PlacedObject>,
    #[serde(skip_serializing, skip_deserializing)]
    pub raw_heightmap: Option<Vec<u8>>,
}

impl SourceMap {
    pub fn centroid_xz(&self) -> (f64, f64) {
        self.bounds.center()
    }
}

/// Fixed target-vehicle enum used to resolve vehicle/spawner tokens.
/// Indices 0..=15 only.
pub const TARGET_VEHICLE_ENUM: [&str; 16] = [
    "Abrams", "Leopard", "Cheetah", "CV90", "Gepard", "UH60", "Eurocopter", "AH64",
    "Vector", "Quadbike", "Flyer60", "JAS39", "F22", "F16", "M2Bradley", "SU57",
];

pub fn target_vehicle_index(name: &str) -> Option<usize> {
    TARGET_VEHICLE_ENUM.iter().position(|&v| v.eq_ignore_ascii_case(name))
}
