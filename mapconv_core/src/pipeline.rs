//! Per-map conversion pipeline: drives a [`crate::model::SourceMap`]
//! through parsing, mapping, rebasing, snapping, emitting and
//! packaging, recording every non-fatal event into a [`RunReport`].

use crate::catalog::AssetCatalog;
use crate::constants::gameplay;
use crate::error::Result;
use crate::mapper::{AssetMapper, MappingTable, ResolutionTier};
use crate::model::{AssetCategory, ControlPointRole, Team};
use crate::orientation::solve_orientation;
use crate::rebase::Rebaser;
use crate::report::RunReport;
use crate::scene::{Scene, SceneNode};
use crate::script::parse_source_map;
use crate::snapper::{self, ObjectKind};
use crate::terrain::TargetTerrain;

/// Coarse progress marker for a single map's conversion. Useful for
/// CLI progress reporting; the pipeline itself always runs every stage
/// to completion or returns `Err` from [`convert_map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Idle,
    Parsing,
    Mapping,
    Rebasing,
    Snapping,
    Emitting,
    Packaging,
    Done,
}

const HQ_RESOURCE: &str = "res://gameplay/headquarters.tscn";
const CAPTURE_POINT_RESOURCE: &str = "res://gameplay/capture_point.tscn";
const COMBAT_AREA_RESOURCE: &str = "res://gameplay/combat_area.tscn";
const POLYGON_VOLUME_RESOURCE: &str = "res://gameplay/polygon_volume.tscn";

/// Everything one map's conversion produces: the parsed source, the
/// built scene, its emitted text, and the run report.
pub struct ConversionOutput {
    pub source_map: crate::model::SourceMap,
    pub scene: Scene,
    pub text: String,
    pub report: RunReport,
}

/// Runs one map end to end, returning its emitted scene text and the
/// accumulated report of non-fatal events.
pub fn convert_map(
    source_root: &std::path::Path,
    map_name: &str,
    catalog: &AssetCatalog,
    mapping: &MappingTable,
    terrain: &TargetTerrain,
) -> Result<ConversionOutput> {
    let mut report = RunReport { map_name: map_name.to_string(), base_terrain: terrain.name().to_string(), ..Default::default() };

    log::debug!("{map_name}: {:?}", Stage::Parsing);
    let source_map = parse_source_map(source_root, map_name)?;
    report.control_point_count = source_map.control_points.len();
    report.spawn_point_count = source_map.spawn_points.len();

    log::debug!("{map_name}: {:?}", Stage::Mapping);
    let remap = solve_orientation(source_map.bounds, terrain.bounds().xz());
    report.chosen_remap = Some(remap);

    let rebaser = Rebaser::new(remap, source_map.centroid_xz(), terrain.center());
    let asset_mapper = AssetMapper::new(catalog, mapping, terrain.name(), map_name);

    log::debug!("{map_name}: {:?} / {:?}", Stage::Rebasing, Stage::Snapping);

    let mut scene = Scene::new(crate::constants::scene_format::FORMAT_VERSION);
    scene.push(SceneNode::Root { name: map_name.to_string() });

    let mut spawn_children_by_owner: std::collections::BTreeMap<String, Vec<String>> = std::collections::BTreeMap::new();
    for (index, spawn) in source_map.spawn_points.iter().enumerate() {
        spawn_children_by_owner.entry(spawn.owner_name.clone()).or_default().push(format!("Spawn_{index}"));
    }

    for cp in &source_map.control_points {
        let transform = rebaser.rebase_transform(crate::geometry::Transform::new(cp.position, crate::geometry::Rotation::IDENTITY));
        let kind = if cp.is_headquarters() { ObjectKind::Headquarters } else { ObjectKind::CapturePoint };
        let (snapped, clamp_note) = snapper::snap(terrain, kind, transform.position, &cp.name);
        if let Some(note) = clamp_note {
            report.push(note);
        }
        let final_transform = crate::geometry::Transform::new(snapped, transform.rotation);

        if cp.is_headquarters() {
            let resource_id = scene.intern_resource(HQ_RESOURCE, "PackedScene");
            let team = match cp.role {
                ControlPointRole::HeadquartersAxis => Team::Team1,
                ControlPointRole::HeadquartersAllies => Team::Team2,
                ControlPointRole::NeutralCapturable => Team::Neutral,
            };
            let spawn_children = spawn_children_by_owner.get(&cp.name).cloned().unwrap_or_default();
            scene.push(SceneNode::Headquarters { name: cp.name.clone(), team, transform: final_transform, ext_resource_id: resource_id, spawn_children });
        } else {
            let resource_id = scene.intern_resource(CAPTURE_POINT_RESOURCE, "PackedScene");
            scene.push(SceneNode::CapturePoint { name: cp.name.clone(), transform: final_transform, ext_resource_id: resource_id });
        }
    }

    for (index, spawn) in source_map.spawn_points.iter().enumerate() {
        let transform = rebaser.rebase_transform(crate::geometry::Transform::new(spawn.position, spawn.rotation));
        let (snapped, clamp_note) = snapper::snap(terrain, ObjectKind::SpawnPoint, transform.position, &spawn.owner_name);
        if let Some(note) = clamp_note {
            report.push(note);
        }
        let final_transform = crate::geometry::Transform::new(snapped, transform.rotation);
        scene.push(SceneNode::SpawnPoint {
            name: format!("Spawn_{index}"),
            owner_name: spawn.owner_name.clone(),
            transform: final_transform,
        });
    }

    for vehicle_spawner in &source_map.vehicle_spawners {
        let (vehicle_index, vehicle_note) = asset_mapper.resolve_vehicle(&vehicle_spawner.source_class);
        if let Some(note) = vehicle_note {
            report.push(note);
        }
        let Some(vehicle_index) = vehicle_index else { continue };

        let rebased_transform = rebaser.rebase_transform(crate::geometry::Transform::new(vehicle_spawner.position, vehicle_spawner.rotation));
        let kind = if vehicle_spawner.is_air { ObjectKind::VehicleSpawnerAir } else { ObjectKind::VehicleSpawnerGround };
        let (snapped, clamp_note) = snapper::snap(terrain, kind, rebased_transform.position, &vehicle_spawner.source_class);
        if let Some(note) = clamp_note {
            report.push(note);
        }
        let final_transform = crate::geometry::Transform::new(snapped, rebased_transform.rotation);

        scene.push(SceneNode::VehicleSpawner {
            name: format!("VehicleSpawner_{vehicle_index}"),
            vehicle_enum_index: vehicle_index,
            team: vehicle_spawner.team,
            transform: final_transform,
            is_air: vehicle_spawner.is_air,
        });
    }

    for placed in &source_map.static_objects {
        let (resolution, note) = asset_mapper.resolve(&placed.template.source_token);
        if let Some(note) = note {
            report.push(note);
        }
        match resolution.tier {
            ResolutionTier::Explicit => report.tier_counts.tier1 += 1,
            ResolutionTier::CategoryFallback => report.tier_counts.tier2 += 1,
            ResolutionTier::KeywordFallback => report.tier_counts.tier3 += 1,
            ResolutionTier::Skipped => continue,
        }

        let Some(asset) = resolution.chosen else { continue };
        let target_name = asset.target_type.clone().unwrap_or(asset.source_token.clone());
        let resource_path = format!("res://{}/{}.tscn", asset.directory.to_lowercase(), target_name.to_lowercase());
        let resource_id = scene.intern_resource(&resource_path, "PackedScene");

        let rebased_transform = rebaser.rebase_transform(placed.transform);
        let (snapped, clamp_note) = snapper::snap(terrain, ObjectKind::Prop, rebased_transform.position, &placed.template.source_token);
        if let Some(note) = clamp_note {
            report.push(note);
        }
        let final_transform = crate::geometry::Transform::new(snapped, rebased_transform.rotation);

        if asset.category == AssetCategory::StationaryWeapon {
            scene.push(SceneNode::StationarySpawner {
                name: target_name,
                team: placed.team,
                transform: final_transform,
                ext_resource_id: resource_id,
            });
        } else {
            scene.push(SceneNode::Static {
                name: target_name,
                transform: final_transform,
                ext_resource_id: resource_id,
                team: placed.team,
            });
        }
    }

    let gameplay_bounds = gameplay_hull(&scene, terrain);
    let floor_y = terrain.center().y - gameplay::COMBAT_AREA_HEIGHT_METERS / 2.0;
    let ceiling_y = terrain.bounds().max().y + gameplay::COMBAT_AREA_CEILING_HEADROOM_METERS;
    let combat_area_resource_id = scene.intern_resource(COMBAT_AREA_RESOURCE, "PackedScene");
    let polygon_volume_resource_id = scene.intern_resource(POLYGON_VOLUME_RESOURCE, "PackedScene");
    let (combat_area, polygon_volume) =
        Scene::combat_area_nodes(gameplay_bounds, floor_y, ceiling_y, combat_area_resource_id, polygon_volume_resource_id);
    scene.push(combat_area);
    scene.push(polygon_volume);

    log::debug!("{map_name}: {:?}", Stage::Emitting);
    if let Some(violation) = crate::validate::check_emission_invariants(&scene).into_iter().next() {
        return Err(crate::error::ConvertError::EmitError(violation.0));
    }
    let text = crate::emitter::emit(&scene);
    log::debug!("{map_name}: {:?}", Stage::Done);
    Ok(ConversionOutput { source_map, scene, text, report })
}

/// XZ hull of every placed node, inflated by the standard buffer, used
/// to size the combat-area polygon.
fn gameplay_hull(scene: &Scene, terrain: &TargetTerrain) -> crate::geometry::Aabb2D {
    let points: Vec<(f64, f64)> = scene
        .nodes
        .iter()
        .filter_map(|node| match node {
            SceneNode::Headquarters { transform, .. }
            | SceneNode::CapturePoint { transform, .. }
            | SceneNode::SpawnPoint { transform, .. }
            | SceneNode::VehicleSpawner { transform, .. }
            | SceneNode::StationarySpawner { transform, .. }
            | SceneNode::Static { transform, .. } => Some((transform.position.x, transform.position.z)),
            _ => None,
        })
        .collect();

    crate::geometry::Aabb2D::from_points(points.iter())
        .unwrap_or_else(|| terrain.bounds().xz())
        .inflated(gameplay::COMBAT_AREA_BUFFER_METERS)
}
