//! Walks the conventional source-map directory tree and assembles a
//! [`SourceMap`].

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;

use crate::constants::gameplay;
use crate::error::{ConvertError, Result};
use crate::geometry::{Aabb2D, Rotation, Transform, Vector3};
use crate::model::{
    AssetCategory, AssetRef, ControlPoint, ControlPointRole, PlacedObject, Scalar, SourceMap,
    SpawnPoint, Team, VehicleSpawner,
};
use crate::paths;
use crate::script::tokenizer::{parse_vector_arg, tokenize_file, Directive};

/// One `Object.create ... Object.absolutePosition ...` run, generic
/// over whatever file it was read from.
#[derive(Debug, Clone, Default)]
struct PendingObject {
    template: String,
    position: Option<(f64, f64, f64)>,
    rotation: Option<(f64, f64, f64)>,
    team: Option<i64>,
    name: Option<String>,
    can_be_captured: Option<bool>,
}

/// Groups directives into one [`PendingObject`] per `Object.create`,
/// applying every subsequent property directive to the most recently
/// opened one.
fn group_objects(directives: &[Directive], file_label: &str) -> Result<Vec<PendingObject>> {
    let mut objects = Vec::new();
    let mut current: Option<PendingObject> = None;

    for directive in directives {
        if directive.verb.eq_ignore_ascii_case("create") {
            if let Some(obj) = current.take() {
                objects.push(obj);
            }
            current = Some(PendingObject {
                template: directive.args.first().cloned().unwrap_or_default(),
                ..Default::default()
            });
            continue;
        }

        let Some(obj) = current.as_mut() else {
            // A property directive before any `Object.create` has
            // nothing to apply to. We don't treat it as an error: it's
            // how `ObjectTemplate.create` declarations and other
            // non-placement directives show up in these files.
            continue;
        };

        match directive.verb.as_str() {
            "absolutePosition" => {
                let arg = directive.args.first().ok_or_else(|| ConvertError::ParseError {
                    file: file_label.to_string(),
                    line: directive.line,
                    reason: "absolutePosition requires a x/y/z argument".to_string(),
                })?;
                obj.position = Some(parse_vector_arg(arg, file_label, directive.line)?);
            }
            "rotation" => {
                let arg = directive.args.first().ok_or_else(|| ConvertError::ParseError {
                    file: file_label.to_string(),
                    line: directive.line,
                    reason: "rotation requires a pitch/yaw/roll argument".to_string(),
                })?;
                obj.rotation = Some(parse_vector_arg(arg, file_label, directive.line)?);
            }
            "setTeam" => {
                let arg = directive.args.first().ok_or_else(|| ConvertError::ParseError {
                    file: file_label.to_string(),
                    line: directive.line,
                    reason: "setTeam requires a numeric argument".to_string(),
                })?;
                obj.team = Some(arg.parse::<i64>().map_err(|_| ConvertError::ParseError {
                    file: file_label.to_string(),
                    line: directive.line,
                    reason: format!("setTeam value '{arg}' is not an integer"),
                })?);
            }
            "setName" => {
                obj.name = directive.args.first().cloned();
            }
            "setCanBeCaptured" => {
                let arg = directive.args.first().map(String::as_str).unwrap_or("1");
                obj.can_be_captured = Some(arg != "0");
            }
            _ => {}
        }
    }

    if let Some(obj) = current.take() {
        objects.push(obj);
    }

    Ok(objects)
}

fn vector_or_zero(v: Option<(f64, f64, f64)>) -> Vector3 {
    v.map(|(x, y, z)| Vector3::new(x, y, z)).unwrap_or_else(Vector3::zeros)
}

fn rotation_or_identity(v: Option<(f64, f64, f64)>) -> Rotation {
    v.map(|(p, y, r)| Rotation::new(p, y, r)).unwrap_or(Rotation::IDENTITY)
}

fn parse_control_points(path: &Path, file_label: &str) -> Result<Vec<ControlPoint>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let directives = tokenize_file(path)?;
    let pending = group_objects(&directives, file_label)?;

    let mut points: Vec<ControlPoint> = pending
        .into_iter()
        .map(|obj| {
            let name = obj.name.clone().unwrap_or_else(|| obj.template.clone());
            let is_hq = obj.can_be_captured == Some(false) || name.ends_with("Base");
            let team = Team::from_source_id(obj.team.unwrap_or(0));
            let role = if is_hq {
                match team {
                    Team::Team1 => ControlPointRole::HeadquartersAxis,
                    _ => ControlPointRole::HeadquartersAllies,
                }
            } else {
                ControlPointRole::NeutralCapturable
            };
            ControlPoint {
                name,
                position: vector_or_zero(obj.position),
                team,
                role,
            }
        })
        .collect();

    enforce_two_headquarters(&mut points);
    Ok(points)
}

/// If more than two control points were marked as headquarters, keeps
/// the two with the greatest XZ separation and demotes the rest to
/// neutral.
fn enforce_two_headquarters(points: &mut [ControlPoint]) {
    let hq_indices: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_headquarters())
        .map(|(i, _)| i)
        .collect();

    if hq_indices.len() <= 2 {
        return;
    }

    let mut best_pair = (hq_indices[0], hq_indices[1]);
    let mut best_dist = -1.0;
    for &i in &hq_indices {
        for &j in &hq_indices {
            if i >= j {
                continue;
            }
            let a = points[i].position;
            let b = points[j].position;
            let dist = ((a.x - b.x).powi(2) + (a.z - b.z).powi(2)).sqrt();
            if dist > best_dist {
                best_dist = dist;
                best_pair = (i, j);
            }
        }
    }

    for &i in &hq_indices {
        if i != best_pair.0 && i != best_pair.1 {
            points[i].role = ControlPointRole::NeutralCapturable;
        }
    }
}

fn parse_spawn_points(path: &Path, file_label: &str, control_points: &[ControlPoint]) -> Result<Vec<SpawnPoint>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let directives = tokenize_file(path)?;
    let pending = group_objects(&directives, file_label)?;

    Ok(pending
        .into_iter()
        .map(|obj| {
            let name = obj.name.clone().unwrap_or_else(|| obj.template.clone());
            let position = vector_or_zero(obj.position);
            let owner_name = assign_spawn_owner(&name, control_points, position);
            SpawnPoint {
                position,
                rotation: rotation_or_identity(obj.rotation),
                owner_name,
            }
        })
        .collect())
}

/// Owner-linkage policy: case-insensitive substring
/// match on `axis`/`allies`/`neutral`/a numeric HQ id; ties broken by
/// the numeric id embedded in the name; nearest control point in the
/// XZ plane otherwise.
fn assign_spawn_owner(spawn_name: &str, control_points: &[ControlPoint], spawn_position: Vector3) -> String {
    if control_points.is_empty() {
        return String::new();
    }

    let lower = spawn_name.to_lowercase();
    let numeric_id = leading_digits(&lower);

    let role_matches: Vec<&ControlPoint> = if lower.contains("axis") {
        control_points.iter().filter(|c| c.role == ControlPointRole::HeadquartersAxis).collect()
    } else if lower.contains("allies") {
        control_points.iter().filter(|c| c.role == ControlPointRole::HeadquartersAllies).collect()
    } else if lower.contains("neutral") {
        control_points.iter().filter(|c| c.role == ControlPointRole::NeutralCapturable).collect()
    } else {
        Vec::new()
    };

    if !role_matches.is_empty() {
        if let Some(id) = &numeric_id {
            if let Some(cp) = role_matches.iter().find(|c| c.name.to_lowercase().contains(id.as_str())) {
                return cp.name.clone();
            }
        }
        return role_matches[0].name.clone();
    }

    if let Some(id) = &numeric_id {
        if let Some(cp) = control_points.iter().find(|c| c.name.to_lowercase().contains(id.as_str())) {
            return cp.name.clone();
        }
    }

    control_points
        .iter()
        .min_by(|a, b| {
            let da = xz_distance(a.position, spawn_position);
            let db = xz_distance(b.position, spawn_position);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|c| c.name.clone())
        .unwrap_or_default()
}

fn xz_distance(a: Vector3, b: Vector3) -> f64 {
    ((a.x - b.x).powi(2) + (a.z - b.z).powi(2)).sqrt()
}

fn leading_digits(lower_name: &str) -> Option<String> {
    let digits: String = lower_name.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() { None } else { Some(digits) }
}

/// Keyword-based source-side classification, used both by the parser
/// (to tell vehicle spawners from static objects) and by the Asset
/// Mapper's category fallback.
pub fn classify_source_token(token: &str) -> AssetCategory {
    let lower = token.to_lowercase();
    let any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    if any(&["tree", "forest", "pine", "oak", "bush", "vegetation"]) {
        AssetCategory::Tree
    } else if any(&["tank", "vehicle"]) {
        AssetCategory::Vehicle
    } else if any(&["spawner"]) {
        AssetCategory::Spawner
    } else if any(&["wall", "bunker", "house", "barn", "building"]) {
        AssetCategory::Building
    } else if any(&["lake", "pond", "water"]) {
        AssetCategory::Water
    } else {
        AssetCategory::Prop
    }
}

fn parse_vehicle_spawners(path: &Path, file_label: &str) -> Result<Vec<VehicleSpawner>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let directives = tokenize_file(path)?;
    let pending = group_objects(&directives, file_label)?;

    Ok(pending
        .into_iter()
        .map(|obj| {
            let lower = obj.template.to_lowercase();
            let is_air = lower.contains("helipad") || lower.contains("heli") || lower.contains("air");
            VehicleSpawner {
                source_class: obj.template,
                target_vehicle_enum_index: 0,
                position: vector_or_zero(obj.position),
                rotation: rotation_or_identity(obj.rotation),
                team: Team::from_source_id(obj.team.unwrap_or(0)),
                is_air,
            }
        })
        .collect())
}

fn parse_static_objects(path: &Path, file_label: &str) -> Result<Vec<PlacedObject>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let directives = tokenize_file(path)?;
    let pending = group_objects(&directives, file_label)?;

    Ok(pending
        .into_iter()
        .enumerate()
        .map(|(i, obj)| {
            let category = classify_source_token(&obj.template);
            let mut extra = BTreeMap::new();
            if let Some(name) = &obj.name {
                extra.insert("name".to_string(), Scalar::Text(name.clone()));
            }
            PlacedObject {
                id: i as i64,
                template: AssetRef {
                    source_token: obj.template.clone(),
                    target_type: None,
                    category,
                    restrictions: Default::default(),
                    directory: String::new(),
                },
                transform: Transform::new(vector_or_zero(obj.position), rotation_or_identity(obj.rotation)),
                team: Team::from_source_id(obj.team.unwrap_or(0)),
                parent_id: None,
                extra,
            }
        })
        .collect())
}

/// Parses the conventional directory layout under
/// `source_root/map_name` into a [`SourceMap`].
pub fn parse_source_map(source_root: &Path, map_name: &str) -> Result<SourceMap> {
    let map_dir = paths::map_dir(source_root, map_name);
    if !map_dir.is_dir() {
        return Err(ConvertError::MapDirectoryNotFound(map_dir.display().to_string()));
    }

    let control_points = parse_control_points(
        &paths::control_points_con(source_root, map_name),
        "Conquest/ControlPoints.con",
    )?;
    let spawn_points = parse_spawn_points(
        &paths::soldier_spawns_con(source_root, map_name),
        "Conquest/SoldierSpawns.con",
        &control_points,
    )?;
    let vehicle_spawners = parse_vehicle_spawners(
        &paths::object_spawns_con(source_root, map_name),
        "Conquest/ObjectSpawns.con",
    )?;
    let static_objects = parse_static_objects(
        &paths::static_objects_con(source_root, map_name),
        "StaticObjects.con",
    )?;

    let heightmap_path = paths::heightmap_raw(source_root, map_name);
    let raw_heightmap = if heightmap_path.is_file() {
        Some(std::fs::read(&heightmap_path)?)
    } else {
        None
    };

    if control_points.is_empty() {
        warn!("map '{map_name}' has no control points");
    }

    let bounds = compute_bounds(&control_points, &vehicle_spawners);

    Ok(SourceMap {
        name: map_name.to_string(),
        bounds,
        control_points,
        spawn_points,
        vehicle_spawners,
        static_objects,
        raw_heightmap,
    })
}

/// The XZ bounding box of all control points and spawners, inflated by
/// the standard buffer.
fn compute_bounds(control_points: &[ControlPoint], vehicle_spawners: &[VehicleSpawner]) -> Aabb2D {
    let points: Vec<(f64, f64)> = control_points
        .iter()
        .map(|c| (c.position.x, c.position.z))
        .chain(vehicle_spawners.iter().map(|v| (v.position.x, v.position.z)))
        .collect();

    let bounds = Aabb2D::from_points(points.iter()).unwrap_or_else(|| Aabb2D::new(0.0, 0.0, 0.0, 0.0));
    bounds.inflated(gameplay::BOUNDS_BUFFER_METERS)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn groups_directives_into_objects() {
        let src = "Object.create hq_axis\nObject.absolutePosition -100/0/0\nObject.setTeam 1\nObject.setCanBeCaptured 0\nObject.setName Base_Axis\n\
                   Object.create hq_allies\nObject.absolutePosition 100/0/0\nObject.setTeam 2\nObject.setCanBeCaptured 0\nObject.setName Base_Allies\n";
        let directives = tokenize_file_from_str(src);
        let objects = group_objects(&directives, "test.con").unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].name.as_deref(), Some("Base_Axis"));
        assert_eq!(objects[1].team, Some(2));
    }

    fn tokenize_file_from_str(src: &str) -> Vec<Directive> {
        crate::script::tokenizer::tokenize(src, "test.con").unwrap()
    }

    #[test]
    fn demotes_extra_headquarters_to_neutral() {
        let mut points = vec![
            ControlPoint { name: "A".into(), position: Vector3::new(0.0, 0.0, 0.0), team: Team::Team1, role: ControlPointRole::HeadquartersAxis },
            ControlPoint { name: "B".into(), position: Vector3::new(500.0, 0.0, 0.0), team: Team::Team2, role: ControlPointRole::HeadquartersAllies },
            ControlPoint { name: "C".into(), position: Vector3::new(1.0, 0.0, 0.0), team: Team::Team1, role: ControlPointRole::HeadquartersAxis },
        ];
        enforce_two_headquarters(&mut points);
        let hq_count = points.iter().filter(|p| p.is_headquarters()).count();
        assert_eq!(hq_count, 2);
        assert_eq!(points[2].role, ControlPointRole::NeutralCapturable);
    }

    #[test]
    fn owner_linkage_prefers_keyword_then_numeric_then_nearest() {
        let control_points = vec![
            ControlPoint { name: "Base_Axis".into(), position: Vector3::new(-100.0, 0.0, 0.0), team: Team::Team1, role: ControlPointRole::HeadquartersAxis },
            ControlPoint { name: "Base_Allies".into(), position: Vector3::new(100.0, 0.0, 0.0), team: Team::Team2, role: ControlPointRole::HeadquartersAllies },
        ];
        let owner = assign_spawn_owner("Spawn_Axis_01", &control_points, Vector3::new(50.0, 0.0, 0.0));
        assert_eq!(owner, "Base_Axis");

        let owner = assign_spawn_owner("Spawn_Unnamed", &control_points, Vector3::new(90.0, 0.0, 0.0));
        assert_eq!(owner, "Base_Allies");
    }
}
