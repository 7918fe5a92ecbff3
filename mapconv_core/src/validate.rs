//! Post-conversion invariant checks: whatever doesn't hold here means
//! the target editor would reject or misbehave on the emitted scene.

use std::collections::HashSet;

use crate::constants::gameplay;
use crate::geometry::Aabb2D;
use crate::model::{SourceMap, Team};
use crate::scene::{Scene, SceneNode};

/// One failed invariant, in plain language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation(pub String);

/// Runs every invariant check and returns every violation found; an
/// empty vector means the scene is sound.
pub fn validate(source_map: &SourceMap, scene: &Scene) -> Vec<Violation> {
    let mut violations = check_emission_invariants(scene);

    check_headquarters_count(scene, &mut violations);
    check_distinct_hq_teams(scene, &mut violations);
    check_minimum_spawns_per_team(source_map, &mut violations);
    check_gameplay_nodes_within_combat_area(scene, &mut violations);

    violations
}

/// The subset of invariants the Scene Emitter itself must hold before
/// writing any output: orthonormal transforms and unique node ids.
/// Violating either is an [`crate::error::ConvertError::EmitError`],
/// not a post-emit [`crate::error::ConvertError::ValidationFailure`].
pub fn check_emission_invariants(scene: &Scene) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_orthonormal_transforms(scene, &mut violations);
    check_unique_obj_ids(scene, &mut violations);
    violations
}

fn check_orthonormal_transforms(scene: &Scene, violations: &mut Vec<Violation>) {
    for node in &scene.nodes {
        let (label, transform) = match node {
            SceneNode::Headquarters { name, transform, .. } => (name.as_str(), transform),
            SceneNode::CapturePoint { name, transform, .. } => (name.as_str(), transform),
            SceneNode::SpawnPoint { name, transform, .. } => (name.as_str(), transform),
            SceneNode::VehicleSpawner { name, transform, .. } => (name.as_str(), transform),
            SceneNode::StationarySpawner { name, transform, .. } => (name.as_str(), transform),
            SceneNode::Static { name, transform, .. } => (name.as_str(), transform),
            SceneNode::Root { .. } | SceneNode::CombatArea { .. } | SceneNode::PolygonVolume { .. } => continue,
        };
        if !transform.is_orthonormal() {
            violations.push(Violation(format!("node '{label}' has a non-orthonormal transform basis")));
        }
    }
}

fn check_headquarters_count(scene: &Scene, violations: &mut Vec<Violation>) {
    let count = scene.nodes.iter().filter(|n| matches!(n, SceneNode::Headquarters { .. })).count();
    if count != gameplay::REQUIRED_HEADQUARTERS {
        violations.push(Violation(format!(
            "expected {} headquarters, found {count}",
            gameplay::REQUIRED_HEADQUARTERS
        )));
    }
}

/// Flags a scene whose headquarters don't carry distinct team
/// assignments (e.g. two Axis HQs, no Allies).
fn check_distinct_hq_teams(scene: &Scene, violations: &mut Vec<Violation>) {
    let teams: HashSet<Team> = scene
        .nodes
        .iter()
        .filter_map(|n| match n {
            SceneNode::Headquarters { team, .. } => Some(*team),
            _ => None,
        })
        .collect();
    let hq_count = scene.nodes.iter().filter(|n| matches!(n, SceneNode::Headquarters { .. })).count();
    if hq_count > 0 && teams.len() != hq_count {
        violations.push(Violation("headquarters do not carry distinct team assignments".to_string()));
    }
}

fn check_minimum_spawns_per_team(source_map: &SourceMap, violations: &mut Vec<Violation>) {
    let mut team1 = 0usize;
    let mut team2 = 0usize;

    for spawn in &source_map.spawn_points {
        let Some(owner) = source_map.control_points.iter().find(|c| c.name == spawn.owner_name) else { continue };
        match owner.team {
            Team::Team1 => team1 += 1,
            Team::Team2 => team2 += 1,
            Team::Neutral => {}
        }
    }

    if team1 < gameplay::MIN_SPAWNS_PER_TEAM {
        violations.push(Violation(format!(
            "axis team has only {team1} spawn point(s), {} required",
            gameplay::MIN_SPAWNS_PER_TEAM
        )));
    }
    if team2 < gameplay::MIN_SPAWNS_PER_TEAM {
        violations.push(Violation(format!(
            "allies team has only {team2} spawn point(s), {} required",
            gameplay::MIN_SPAWNS_PER_TEAM
        )));
    }
}

/// Every gameplay node's XZ position must lie strictly inside the
/// combat-area polygon; the polygon is always an axis-aligned
/// rectangle by construction, so its bounding box is the polygon.
fn check_gameplay_nodes_within_combat_area(scene: &Scene, violations: &mut Vec<Violation>) {
    let Some(bounds) = scene.nodes.iter().find_map(|n| match n {
        SceneNode::PolygonVolume { polygon, .. } => Aabb2D::from_points(polygon.iter()),
        _ => None,
    }) else {
        return;
    };

    for node in &scene.nodes {
        let (label, transform) = match node {
            SceneNode::Headquarters { name, transform, .. } => (name.as_str(), transform),
            SceneNode::CapturePoint { name, transform, .. } => (name.as_str(), transform),
            SceneNode::SpawnPoint { name, transform, .. } => (name.as_str(), transform),
            SceneNode::VehicleSpawner { name, transform, .. } => (name.as_str(), transform),
            SceneNode::StationarySpawner { name, transform, .. } => (name.as_str(), transform),
            SceneNode::Static { name, transform, .. } => (name.as_str(), transform),
            _ => continue,
        };
        let (x, z) = (transform.position.x, transform.position.z);
        let strictly_inside = x > bounds.min_x() && x < bounds.max_x() && z > bounds.min_z() && z < bounds.max_z();
        if !strictly_inside {
            violations.push(Violation(format!("node '{label}' lies outside the combat-area polygon")));
        }
    }
}

/// Every non-root node needs a unique `ObjId`; since ids are assigned
/// sequentially by position, the way that invariant actually breaks
/// in practice is two nodes sharing a `name`, which NodePath
/// references (HQ spawn children, the combat area's polygon child)
/// resolve by.
fn check_unique_obj_ids(scene: &Scene, violations: &mut Vec<Violation>) {
    let mut seen = HashSet::new();
    for node in &scene.nodes {
        let name = match node {
            SceneNode::Root { name }
            | SceneNode::Headquarters { name, .. }
            | SceneNode::CapturePoint { name, .. }
            | SceneNode::SpawnPoint { name, .. }
            | SceneNode::VehicleSpawner { name, .. }
            | SceneNode::StationarySpawner { name, .. }
            | SceneNode::Static { name, .. }
            | SceneNode::CombatArea { name, .. }
            | SceneNode::PolygonVolume { name, .. } => name,
        };
        if !seen.insert(name.as_str()) {
            violations.push(Violation(format!("duplicate node name '{name}' would collide as an ObjId/NodePath target")));
        }
    }
}
