//! Scene data model: the in-memory shape the Scene Emitter serializes,
//! one node per gameplay entity plus a combat-area volume and a static
//! container.

use crate::geometry::{Aabb2D, Transform};
use crate::model::Team;

/// An external resource the scene references by path, given a stable
/// integer id in load order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtResource {
    pub id: i64,
    pub path: String,
    pub resource_type: String,
}

/// One emitted node, in the order it appears in the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneNode {
    Root { name: String },
    /// `spawn_children` is the node-path array of this HQ's spawn
    /// points, by name, in emission order.
    Headquarters { name: String, team: Team, transform: Transform, ext_resource_id: i64, spawn_children: Vec<String> },
    CapturePoint { name: String, transform: Transform, ext_resource_id: i64 },
    SpawnPoint { name: String, owner_name: String, transform: Transform },
    VehicleSpawner { name: String, vehicle_enum_index: usize, team: Team, transform: Transform, is_air: bool },
    StationarySpawner { name: String, team: Team, transform: Transform, ext_resource_id: i64 },
    Static { name: String, transform: Transform, ext_resource_id: i64, team: Team },
    /// Container node; `polygon_child` names its [`SceneNode::PolygonVolume`] child.
    CombatArea { name: String, ext_resource_id: i64, floor_y: f64, ceiling_y: f64, polygon_child: String },
    PolygonVolume { name: String, parent: String, ext_resource_id: i64, polygon: Vec<(f64, f64)> },
}

/// A complete scene, ready for the Scene Emitter: external resources,
/// then every node in emission order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub format_version: u32,
    pub ext_resources: Vec<ExtResource>,
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    pub fn new(format_version: u32) -> Self {
        Self { format_version, ext_resources: Vec::new(), nodes: Vec::new() }
    }

    /// Registers `path` as an external resource if not already
    /// present, returning its id either way.
    pub fn intern_resource(&mut self, path: &str, resource_type: &str) -> i64 {
        if let Some(existing) = self.ext_resources.iter().find(|r| r.path == path) {
            return existing.id;
        }
        let id = self.ext_resources.len() as i64 + 1;
        self.ext_resources.push(ExtResource { id, path: path.to_string(), resource_type: resource_type.to_string() });
        id
    }

    pub fn push(&mut self, node: SceneNode) {
        self.nodes.push(node);
    }

    /// Builds the combat-area container node and its polygon-volume
    /// child from a gameplay-object XZ hull, inflated by the standard
    /// buffer and given vertical extent from the target terrain's
    /// height range.
    pub fn combat_area_nodes(
        bounds: Aabb2D,
        floor_y: f64,
        ceiling_y: f64,
        combat_area_resource_id: i64,
        polygon_volume_resource_id: i64,
    ) -> (SceneNode, SceneNode) {
        let polygon = vec![
            (bounds.min_x(), bounds.min_z()),
            (bounds.max_x(), bounds.min_z()),
            (bounds.max_x(), bounds.max_z()),
            (bounds.min_x(), bounds.max_z()),
        ];
        let combat_area = SceneNode::CombatArea {
            name: "CombatArea".to_string(),
            ext_resource_id: combat_area_resource_id,
            floor_y,
            ceiling_y,
            polygon_child: "PolygonVolume".to_string(),
        };
        let polygon_volume = SceneNode::PolygonVolume {
            name: "PolygonVolume".to_string(),
            parent: "CombatArea".to_string(),
            ext_resource_id: polygon_volume_resource_id,
            polygon,
        };
        (combat_area, polygon_volume)
    }
}
