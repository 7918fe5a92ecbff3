//! Scene Emitter: writes a [`Scene`] out as deterministic, byte-stable
//! text — a header, an external-resource table, then one bracketed
//! node block per entity.

use std::fmt::Write as _;

use crate::geometry::format_number;
use crate::model::Team;
use crate::scene::{Scene, SceneNode};

const DECIMAL_PLACES: usize = crate::constants::scene_format::SIGNIFICANT_DIGITS;

fn team_label(team: Team) -> &'static str {
    match team {
        Team::Team1 => "Axis",
        Team::Team2 => "Allies",
        Team::Neutral => "Neutral",
    }
}

fn emit_transform(out: &mut String, transform: crate::geometry::Transform) {
    let values = transform.matrix_values();
    let formatted: Vec<String> = values.iter().map(|v| format_number(*v, DECIMAL_PLACES)).collect();
    let _ = writeln!(out, "transform = Transform3D({})", formatted.join(", "));
}

/// Serializes `scene` into its on-disk text form.
pub fn emit(scene: &Scene) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "[gd_scene format={} load_steps={}]", scene.format_version, scene.ext_resources.len() + 1);
    out.push('\n');

    for res in &scene.ext_resources {
        let _ = writeln!(out, "[ext_resource type=\"{}\" path=\"{}\" id={}]", res.resource_type, res.path, res.id);
    }
    if !scene.ext_resources.is_empty() {
        out.push('\n');
    }

    let mut obj_id = 0i64;
    for node in &scene.nodes {
        obj_id += 1;
        emit_node(&mut out, node, obj_id);
        out.push('\n');
    }

    out
}

fn emit_node(out: &mut String, node: &SceneNode, obj_id: i64) {
    match node {
        SceneNode::Root { name } => {
            let _ = writeln!(out, "[node name=\"{name}\" type=\"Node3D\" index=\"{obj_id}\"]");
        }
        SceneNode::Headquarters { name, team, transform, ext_resource_id, spawn_children } => {
            let _ = writeln!(
                out,
                "[node name=\"{name}\" type=\"Headquarters\" index=\"{obj_id}\" instance=ExtResource({ext_resource_id})]"
            );
            let _ = writeln!(out, "team = \"{}\"", team_label(*team));
            let children: Vec<String> = spawn_children.iter().map(|c| format!("NodePath(\"{c}\")")).collect();
            let _ = writeln!(out, "spawn_points = [{}]", children.join(", "));
            emit_transform(out, *transform);
        }
        SceneNode::CapturePoint { name, transform, ext_resource_id } => {
            let _ = writeln!(
                out,
                "[node name=\"{name}\" type=\"CapturePoint\" index=\"{obj_id}\" instance=ExtResource({ext_resource_id})]"
            );
            emit_transform(out, *transform);
        }
        SceneNode::SpawnPoint { name, owner_name, transform } => {
            let _ = writeln!(out, "[node name=\"{name}\" type=\"SpawnPoint\" index=\"{obj_id}\" parent=\"{owner_name}\"]");
            emit_transform(out, *transform);
        }
        SceneNode::VehicleSpawner { name, vehicle_enum_index, team, transform, is_air } => {
            let node_type = if *is_air { "AirVehicleSpawner" } else { "VehicleSpawner" };
            let _ = writeln!(out, "[node name=\"{name}\" type=\"{node_type}\" index=\"{obj_id}\"]");
            let _ = writeln!(out, "vehicle = {vehicle_enum_index}");
            let _ = writeln!(out, "team = \"{}\"", team_label(*team));
            emit_transform(out, *transform);
        }
        SceneNode::StationarySpawner { name, team, transform, ext_resource_id } => {
            let _ = writeln!(
                out,
                "[node name=\"{name}\" type=\"StationarySpawner\" index=\"{obj_id}\" instance=ExtResource({ext_resource_id})]"
            );
            let _ = writeln!(out, "team = \"{}\"", team_label(*team));
            emit_transform(out, *transform);
        }
        SceneNode::Static { name, transform, ext_resource_id, team } => {
            let _ = writeln!(
                out,
                "[node name=\"{name}\" type=\"StaticBody3D\" index=\"{obj_id}\" instance=ExtResource({ext_resource_id})]"
            );
            if *team != Team::Neutral {
                let _ = writeln!(out, "team = \"{}\"", team_label(*team));
            }
            emit_transform(out, *transform);
        }
        SceneNode::CombatArea { name, ext_resource_id, floor_y, ceiling_y, polygon_child } => {
            let _ = writeln!(
                out,
                "[node name=\"{name}\" type=\"Area3D\" index=\"{obj_id}\" instance=ExtResource({ext_resource_id})]"
            );
            let _ = writeln!(out, "volume = NodePath(\"{polygon_child}\")");
            let _ = writeln!(out, "floor = {}", format_number(*floor_y, DECIMAL_PLACES));
            let _ = writeln!(out, "ceiling = {}", format_number(*ceiling_y, DECIMAL_PLACES));
        }
        SceneNode::PolygonVolume { name, parent, ext_resource_id, polygon } => {
            let _ = writeln!(
                out,
                "[node name=\"{name}\" type=\"PolygonVolume\" index=\"{obj_id}\" parent=\"{parent}\" instance=ExtResource({ext_resource_id})]"
            );
            let points: Vec<String> = polygon
                .iter()
                .map(|(x, z)| format!("Vector2({}, {})", format_number(*x, DECIMAL_PLACES), format_number(*z, DECIMAL_PLACES)))
                .collect();
            let _ = writeln!(out, "polygon = PackedVector2Array({})", points.join(", "));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Rotation, Transform, Vector3};

    #[test]
    fn emits_header_before_any_node() {
        let scene = Scene::new(3);
        let text = emit(&scene);
        assert!(text.starts_with("[gd_scene format=3 load_steps=1]"));
    }

    #[test]
    fn headquarters_node_carries_transform_and_team() {
        let mut scene = Scene::new(3);
        let res_id = scene.intern_resource("res://hq.tscn", "PackedScene");
        scene.push(SceneNode::Headquarters {
            name: "HQ_Axis".to_string(),
            team: Team::Team1,
            transform: Transform::new(Vector3::new(1.0, 2.0, 3.0), Rotation::IDENTITY),
            ext_resource_id: res_id,
            spawn_children: vec!["Spawn_0".to_string(), "Spawn_1".to_string()],
        });
        let text = emit(&scene);
        assert!(text.contains("type=\"Headquarters\""));
        assert!(text.contains("team = \"Axis\""));
        assert!(text.contains("transform = Transform3D("));
        assert!(text.contains("spawn_points = [NodePath(\"Spawn_0\"), NodePath(\"Spawn_1\")]"));
    }

    #[test]
    fn combat_area_references_its_polygon_volume_child_by_node_path() {
        let mut scene = Scene::new(3);
        let combat_id = scene.intern_resource("res://gameplay/combat_area.tscn", "PackedScene");
        let polygon_id = scene.intern_resource("res://gameplay/polygon_volume.tscn", "PackedScene");
        let (combat_area, polygon_volume) = Scene::combat_area_nodes(
            crate::geometry::Aabb2D::new(-10.0, -10.0, 10.0, 10.0),
            0.0,
            100.0,
            combat_id,
            polygon_id,
        );
        scene.push(combat_area);
        scene.push(polygon_volume);
        let text = emit(&scene);
        assert!(text.contains("volume = NodePath(\"PolygonVolume\")"));
        assert!(text.contains("[node name=\"PolygonVolume\" type=\"PolygonVolume\" index=\"2\" parent=\"CombatArea\""));
        assert!(text.contains("polygon = PackedVector2Array("));
    }

    #[test]
    fn repeated_resource_path_only_appears_once_in_ext_resources() {
        let mut scene = Scene::new(3);
        scene.intern_resource("res://tree.tscn", "PackedScene");
        scene.intern_resource("res://tree.tscn", "PackedScene");
        let text = emit(&scene);
        assert_eq!(text.matches("res://tree.tscn").count(), 1);
    }
}
