//! Height Snapper: sets every placed object's Y from the target
//! terrain's height grid plus a class-dependent clearance, and clamps
//! any object whose XZ position falls outside the terrain's bounds.

use crate::constants::{clearance, gameplay};
use crate::geometry::Vector3;
use crate::model::SourceMap;
use crate::report::{Note, NoteKind};
use crate::terrain::TargetTerrain;

/// The object classes the Height Snapper treats distinctly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    SpawnPoint,
    VehicleSpawnerGround,
    VehicleSpawnerAir,
    Building,
    Prop,
    Tree,
    CapturePoint,
    Headquarters,
}

impl ObjectKind {
    pub fn clearance_meters(self) -> f64 {
        match self {
            ObjectKind::SpawnPoint => clearance::SPAWN_POINT,
            ObjectKind::VehicleSpawnerGround => clearance::VEHICLE_SPAWNER_GROUND,
            ObjectKind::VehicleSpawnerAir => clearance::VEHICLE_SPAWNER_AIR,
            ObjectKind::Building => clearance::BUILDING,
            ObjectKind::Prop => clearance::PROP,
            ObjectKind::Tree => clearance::TREE,
            ObjectKind::CapturePoint => clearance::CAPTURE_POINT,
            ObjectKind::Headquarters => clearance::HEADQUARTERS,
        }
    }
}

/// Snaps a single position onto `terrain`, clamping XZ into the
/// terrain's bounds first if needed and returning a [`Note`] when it
/// had to.
pub fn snap(terrain: &TargetTerrain, kind: ObjectKind, position: Vector3, token: &str) -> (Vector3, Option<Note>) {
    let bounds = terrain.bounds().xz();
    let (x, z, note) = if bounds.contains(position.x, position.z) {
        (position.x, position.z, None)
    } else {
        let clamped_x = position.x.clamp(bounds.min_x(), bounds.max_x());
        let clamped_z = position.z.clamp(bounds.min_z(), bounds.max_z());
        let note = Note::new(
            NoteKind::BoundsClamp,
            token,
            format!("position ({:.2}, {:.2}) clamped into terrain bounds", position.x, position.z),
        );
        (clamped_x, clamped_z, Some(note))
    };

    let y = terrain.height_at(x, z) + kind.clearance_meters();
    (Vector3::new(x, y, z), note)
}

/// Pulls every spawn point whose XZ distance from its owning control
/// point exceeds the standard reset radius back onto that radius,
/// keeping its original bearing. Spawns already within radius, or
/// whose owner can't be found, are returned unchanged.
pub fn reset_spawns(source_map: &SourceMap) -> Vec<(crate::model::SpawnPoint, bool)> {
    source_map
        .spawn_points
        .iter()
        .map(|spawn| {
            let Some(owner) = source_map.control_points.iter().find(|c| c.name == spawn.owner_name) else {
                return (spawn.clone(), false);
            };

            let dx = spawn.position.x - owner.position.x;
            let dz = spawn.position.z - owner.position.z;
            let distance = (dx * dx + dz * dz).sqrt();

            if distance <= gameplay::SPAWN_RESET_RADIUS_METERS || distance < f64::EPSILON {
                return (spawn.clone(), false);
            }

            let scale = gameplay::SPAWN_RESET_RADIUS_METERS / distance;
            let adjusted = crate::model::SpawnPoint {
                position: Vector3::new(owner.position.x + dx * scale, spawn.position.y, owner.position.z + dz * scale),
                rotation: spawn.rotation,
                owner_name: spawn.owner_name.clone(),
            };
            (adjusted, true)
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::terrain::{MeshDescription, MeshTriangle, TargetTerrain};

    fn flat_terrain(size: f64, y: f64) -> TargetTerrain {
        let corners = [
            Vector3::new(-size, y, -size),
            Vector3::new(size, y, -size),
            Vector3::new(size, y, size),
            Vector3::new(-size, y, size),
        ];
        let mesh = MeshDescription {
            triangles: vec![
                MeshTriangle { a: corners[0], b: corners[1], c: corners[2] },
                MeshTriangle { a: corners[0], b: corners[2], c: corners[3] },
            ],
        };
        TargetTerrain::from_mesh("Flat", &mesh).unwrap()
    }

    #[test]
    fn snap_applies_class_clearance() {
        let terrain = flat_terrain(100.0, 10.0);
        let (snapped, note) = snap(&terrain, ObjectKind::SpawnPoint, Vector3::new(0.0, 0.0, 0.0), "spawn");
        assert!(note.is_none());
        assert!((snapped.y - 11.0).abs() < 1e-6);
    }

    #[test]
    fn snap_is_idempotent() {
        let terrain = flat_terrain(100.0, 10.0);
        let (once, _) = snap(&terrain, ObjectKind::Tree, Vector3::new(5.0, 0.0, 5.0), "tree");
        let (twice, _) = snap(&terrain, ObjectKind::Tree, once, "tree");
        assert!((once.y - twice.y).abs() < 1e-9);
    }

    #[test]
    fn out_of_bounds_position_is_clamped_with_note() {
        let terrain = flat_terrain(100.0, 10.0);
        let (snapped, note) = snap(&terrain, ObjectKind::Prop, Vector3::new(10_000.0, 0.0, 0.0), "prop");
        assert!(note.is_some());
        assert!(snapped.x <= 100.0);
    }

    #[test]
    fn far_spawn_is_pulled_back_onto_the_reset_radius() {
        use crate::geometry::{Aabb2D, Rotation};
        use crate::model::{ControlPoint, ControlPointRole, SpawnPoint, Team};

        let owner = ControlPoint { name: "Base_Axis".into(), position: Vector3::new(0.0, 0.0, 0.0), team: Team::Team1, role: ControlPointRole::HeadquartersAxis };
        let spawn = SpawnPoint { position: Vector3::new(100.0, 0.0, 0.0), rotation: Rotation::IDENTITY, owner_name: "Base_Axis".into() };
        let source_map = SourceMap {
            name: "Test".into(),
            bounds: Aabb2D::new(-200.0, -200.0, 200.0, 200.0),
            control_points: vec![owner],
            spawn_points: vec![spawn],
            vehicle_spawners: vec![],
            static_objects: vec![],
            raw_heightmap: None,
        };

        let reset = reset_spawns(&source_map);
        assert_eq!(reset.len(), 1);
        let (adjusted, changed) = &reset[0];
        assert!(changed);
        let distance = (adjusted.position.x.powi(2) + adjusted.position.z.powi(2)).sqrt();
        assert!((distance - gameplay::SPAWN_RESET_RADIUS_METERS).abs() < 1e-6);
    }

    #[test]
    fn near_spawn_is_left_untouched() {
        use crate::geometry::{Aabb2D, Rotation};
        use crate::model::{ControlPoint, ControlPointRole, SpawnPoint, Team};

        let owner = ControlPoint { name: "Base_Axis".into(), position: Vector3::new(0.0, 0.0, 0.0), team: Team::Team1, role: ControlPointRole::HeadquartersAxis };
        let spawn = SpawnPoint { position: Vector3::new(2.0, 0.0, 0.0), rotation: Rotation::IDENTITY, owner_name: "Base_Axis".into() };
        let source_map = SourceMap {
            name: "Test".into(),
            bounds: Aabb2D::new(-200.0, -200.0, 200.0, 200.0),
            control_points: vec![owner],
            spawn_points: vec![spawn],
            vehicle_spawners: vec![],
            static_objects: vec![],
            raw_heightmap: None,
        };

        let reset = reset_spawns(&source_map);
        let (_, changed) = &reset[0];
        assert!(!changed);
    }
}
