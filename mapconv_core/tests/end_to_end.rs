//! End-to-end scenarios driving the full conversion pipeline against
//! on-disk fixture map trees.

use std::path::Path;

use mapconv_core::catalog::{AssetCatalog, CatalogDocument, CatalogEntry};
use mapconv_core::geometry::Vector3;
use mapconv_core::mapper::{MappingDocument, MappingOverride, MappingTable};
use mapconv_core::orientation::AxisRemap;
use mapconv_core::package::ExperienceBuilder;
use mapconv_core::pipeline::convert_map;
use mapconv_core::report::NoteKind;
use mapconv_core::scene::SceneNode;
use mapconv_core::terrain::{MeshDescription, MeshTriangle, TargetTerrain};
use mapconv_core::validate;

fn write_map_file(source_root: &Path, map_name: &str, relative: &str, contents: &str) {
    let path = source_root.join(map_name).join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

fn flat_terrain(name: &str, half_extent: f64, y: f64) -> TargetTerrain {
    let corners = [
        Vector3::new(-half_extent, y, -half_extent),
        Vector3::new(half_extent, y, -half_extent),
        Vector3::new(half_extent, y, half_extent),
        Vector3::new(-half_extent, y, half_extent),
    ];
    let mesh = MeshDescription {
        triangles: vec![
            MeshTriangle { a: corners[0], b: corners[1], c: corners[2] },
            MeshTriangle { a: corners[0], b: corners[2], c: corners[3] },
        ],
    };
    TargetTerrain::from_mesh(name, &mesh).unwrap()
}

fn rect_terrain(name: &str, half_x: f64, half_z: f64, y: f64) -> TargetTerrain {
    let corners = [
        Vector3::new(-half_x, y, -half_z),
        Vector3::new(half_x, y, -half_z),
        Vector3::new(half_x, y, half_z),
        Vector3::new(-half_x, y, half_z),
    ];
    let mesh = MeshDescription {
        triangles: vec![
            MeshTriangle { a: corners[0], b: corners[1], c: corners[2] },
            MeshTriangle { a: corners[0], b: corners[2], c: corners[3] },
        ],
    };
    TargetTerrain::from_mesh(name, &mesh).unwrap()
}

fn empty_catalog() -> AssetCatalog {
    AssetCatalog::from_document(CatalogDocument { asset_types: vec![] })
}

fn catalog_with(entries: Vec<(&str, &str, Vec<&str>)>) -> AssetCatalog {
    AssetCatalog::from_document(CatalogDocument {
        asset_types: entries
            .into_iter()
            .map(|(name, dir, restrictions)| CatalogEntry {
                type_name: name.to_string(),
                directory: dir.to_string(),
                level_restrictions: restrictions.into_iter().map(String::from).collect(),
                constants: vec![],
                properties: vec![],
            })
            .collect(),
    })
}

/// Scenario 1: a tiny map with two headquarters, one neutral capture
/// point and four spawns per team, converted onto a flat terrain.
#[test]
fn tiny_synthetic_map_produces_expected_node_counts_and_heights() {
    let dir = tempfile::tempdir().unwrap();
    let source_root = dir.path().join("maps");
    let map_name = "TinyMap";

    write_map_file(
        &source_root,
        map_name,
        "Conquest/ControlPoints.con",
        "Object.create ControlPointTemplate\n\
         Object.absolutePosition -100/0/0\n\
         Object.setTeam 1\n\
         Object.setCanBeCaptured 0\n\
         Object.setName Base_Axis\n\
         Object.create ControlPointTemplate\n\
         Object.absolutePosition 100/0/0\n\
         Object.setTeam 2\n\
         Object.setCanBeCaptured 0\n\
         Object.setName Base_Allies\n\
         Object.create ControlPointTemplate\n\
         Object.absolutePosition 0/0/0\n\
         Object.setName CP_Center\n",
    );

    let mut spawns = String::new();
    for i in 0..4 {
        spawns.push_str(&format!(
            "Object.create SpawnTemplate\nObject.absolutePosition {}/0/5\nObject.setName Spawn_Axis_{i:02}\n",
            -95.0 + i as f64
        ));
    }
    for i in 0..4 {
        spawns.push_str(&format!(
            "Object.create SpawnTemplate\nObject.absolutePosition {}/0/5\nObject.setName Spawn_Allies_{i:02}\n",
            95.0 - i as f64
        ));
    }
    write_map_file(&source_root, map_name, "Conquest/SoldierSpawns.con", &spawns);

    let catalog = empty_catalog();
    let mapping = MappingTable::default();
    let terrain = flat_terrain("Flat200", 100.0, 50.0);

    let output = convert_map(&source_root, map_name, &catalog, &mapping, &terrain).unwrap();

    let hq_count = output.scene.nodes.iter().filter(|n| matches!(n, SceneNode::Headquarters { .. })).count();
    let cp_count = output.scene.nodes.iter().filter(|n| matches!(n, SceneNode::CapturePoint { .. })).count();
    let spawn_count = output.scene.nodes.iter().filter(|n| matches!(n, SceneNode::SpawnPoint { .. })).count();
    assert_eq!(hq_count, 2);
    assert_eq!(cp_count, 1);
    assert_eq!(spawn_count, 8);

    for node in &output.scene.nodes {
        match node {
            SceneNode::Headquarters { transform, .. } => assert!((transform.position.y - 50.5).abs() < 1e-6),
            SceneNode::CapturePoint { transform, .. } => assert!((transform.position.y - 50.5).abs() < 1e-6),
            SceneNode::SpawnPoint { transform, .. } => assert!((transform.position.y - 51.0).abs() < 1e-6),
            _ => {}
        }
    }

    let violations = validate::validate(&output.source_map, &output.scene);
    assert!(violations.is_empty(), "unexpected violations: {violations:?}");
}

/// Scenario 2: a source map elongated along Z, target terrain elongated
/// along X, so the Orientation Solver must pick `SwapXZ`.
#[test]
fn axis_swap_is_chosen_and_reflected_in_rebased_positions() {
    let dir = tempfile::tempdir().unwrap();
    let source_root = dir.path().join("maps");
    let map_name = "ElongatedMap";

    write_map_file(
        &source_root,
        map_name,
        "Conquest/ControlPoints.con",
        "Object.create ControlPointTemplate\n\
         Object.absolutePosition 0/0/-250\n\
         Object.setTeam 1\n\
         Object.setCanBeCaptured 0\n\
         Object.setName Base_Axis\n\
         Object.create ControlPointTemplate\n\
         Object.absolutePosition 0/0/250\n\
         Object.setTeam 2\n\
         Object.setCanBeCaptured 0\n\
         Object.setName Base_Allies\n",
    );

    let catalog = empty_catalog();
    let mapping = MappingTable::default();
    let terrain = rect_terrain("WideTerrain", 300.0, 100.0, 20.0);

    let output = convert_map(&source_root, map_name, &catalog, &mapping, &terrain).unwrap();
    assert_eq!(output.report.chosen_remap, Some(AxisRemap::SwapXZ));

    let hq_axis = output
        .scene
        .nodes
        .iter()
        .find_map(|n| match n {
            SceneNode::Headquarters { name, transform, .. } if name == "Base_Axis" => Some(transform),
            _ => None,
        })
        .expect("Base_Axis node");
    assert!(hq_axis.position.x < 0.0, "expected the source Z component to land on X, got {}", hq_axis.position.x);
}

/// Scenario 3: an explicit mapping target is restricted to a terrain
/// other than the current base terrain, so resolution falls through to
/// tier 2 (category fallback).
#[test]
fn restricted_explicit_target_falls_back_to_category_match() {
    let dir = tempfile::tempdir().unwrap();
    let source_root = dir.path().join("maps");
    let map_name = "RestrictedMap";

    write_map_file(
        &source_root,
        map_name,
        "Conquest/ControlPoints.con",
        "Object.create ControlPointTemplate\nObject.absolutePosition -50/0/0\nObject.setTeam 1\nObject.setCanBeCaptured 0\nObject.setName Base_Axis\n\
         Object.create ControlPointTemplate\nObject.absolutePosition 50/0/0\nObject.setTeam 2\nObject.setCanBeCaptured 0\nObject.setName Base_Allies\n",
    );
    write_map_file(
        &source_root,
        map_name,
        "StaticObjects.con",
        "Object.create Pine_Tree_01\nObject.absolutePosition 10/0/10\n",
    );

    let catalog = catalog_with(vec![
        ("Tree_Pine_Large", "Nature/Trees/Pine", vec!["TerrainA"]),
        ("Tree_Pine_Small", "Nature/Trees/Pine", vec![]),
        ("Tree_Generic", "Nature/Trees/Generic", vec![]),
    ]);
    let mapping = MappingTable::from_document(MappingDocument {
        default: Default::default(),
        overrides: vec![MappingOverride {
            terrain: "TerrainB".to_string(),
            source_token: "Pine_Tree_01".to_string(),
            target_name: "Tree_Pine_Large".to_string(),
        }],
    });
    let terrain = flat_terrain("TerrainB", 500.0, 0.0);

    let output = convert_map(&source_root, map_name, &catalog, &mapping, &terrain).unwrap();
    assert_eq!(output.report.tier_counts.tier2, 1);
    assert_eq!(output.report.tier_counts.tier1, 0);

    let static_names: Vec<&str> = output
        .scene
        .nodes
        .iter()
        .filter_map(|n| match n {
            SceneNode::Static { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(static_names, vec!["Tree_Pine_Small"]);
}

/// Scenario 4: a source static classified as Water has no compatible
/// catalog target and is skipped with a note, emitting no node.
#[test]
fn water_classified_static_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let source_root = dir.path().join("maps");
    let map_name = "WaterMap";

    write_map_file(
        &source_root,
        map_name,
        "Conquest/ControlPoints.con",
        "Object.create ControlPointTemplate\nObject.absolutePosition -50/0/0\nObject.setTeam 1\nObject.setCanBeCaptured 0\nObject.setName Base_Axis\n\
         Object.create ControlPointTemplate\nObject.absolutePosition 50/0/0\nObject.setTeam 2\nObject.setCanBeCaptured 0\nObject.setName Base_Allies\n",
    );
    write_map_file(
        &source_root,
        map_name,
        "StaticObjects.con",
        "Object.create Lake_Small_01\nObject.absolutePosition 0/0/0\n",
    );

    let catalog = catalog_with(vec![("Prop_Crate", "Props/Crates", vec![])]);
    let mapping = MappingTable::default();
    let terrain = flat_terrain("AnyTerrain", 500.0, 0.0);

    let output = convert_map(&source_root, map_name, &catalog, &mapping, &terrain).unwrap();
    assert_eq!(output.report.tier_counts.skipped, 1);
    assert!(output.report.notes.iter().any(|n| n.kind == NoteKind::Skip && n.token == "Lake_Small_01"));
    assert!(output.scene.nodes.iter().all(|n| !matches!(n, SceneNode::Static { name, .. } if name.contains("Lake"))));
}

/// Scenario 5: a static object positioned far outside the target
/// terrain's bounds gets clamped with a note but still ends up inside
/// the combat-area polygon.
#[test]
fn far_out_of_bounds_static_is_clamped_with_a_note() {
    let dir = tempfile::tempdir().unwrap();
    let source_root = dir.path().join("maps");
    let map_name = "ClampMap";

    write_map_file(
        &source_root,
        map_name,
        "Conquest/ControlPoints.con",
        "Object.create ControlPointTemplate\nObject.absolutePosition -50/0/0\nObject.setTeam 1\nObject.setCanBeCaptured 0\nObject.setName Base_Axis\n\
         Object.create ControlPointTemplate\nObject.absolutePosition 50/0/0\nObject.setTeam 2\nObject.setCanBeCaptured 0\nObject.setName Base_Allies\n",
    );
    write_map_file(
        &source_root,
        map_name,
        "StaticObjects.con",
        "Object.create Crate_Generic_01\nObject.absolutePosition 10000/0/10000\n",
    );

    let catalog = catalog_with(vec![("Prop_Crate", "Props/Crates", vec![])]);
    let mapping = MappingTable::default();
    let terrain = flat_terrain("AnyTerrain", 500.0, 0.0);

    let output = convert_map(&source_root, map_name, &catalog, &mapping, &terrain).unwrap();
    assert!(output.report.notes.iter().any(|n| n.kind == NoteKind::BoundsClamp));

    let crate_node = output
        .scene
        .nodes
        .iter()
        .find_map(|n| match n {
            SceneNode::Static { name, transform, .. } if name == "Prop_Crate" => Some(transform),
            _ => None,
        })
        .expect("clamped static node");
    let bounds = terrain.bounds().xz();
    assert!(bounds.contains(crate_node.position.x, crate_node.position.z));

    match output.scene.nodes.iter().find(|n| matches!(n, SceneNode::PolygonVolume { .. })).unwrap() {
        SceneNode::PolygonVolume { polygon, .. } => {
            let xs: Vec<f64> = polygon.iter().map(|(x, _)| *x).collect();
            let zs: Vec<f64> = polygon.iter().map(|(_, z)| *z).collect();
            let min_x = xs.iter().cloned().fold(f64::INFINITY, f64::min);
            let max_x = xs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let min_z = zs.iter().cloned().fold(f64::INFINITY, f64::min);
            let max_z = zs.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert!(crate_node.position.x >= min_x && crate_node.position.x <= max_x);
            assert!(crate_node.position.z >= min_z && crate_node.position.z <= max_z);
        }
        _ => unreachable!(),
    }
}

/// Scenario 6: bundling two converted maps produces one experience
/// envelope whose attachments decode back to the exact scene bytes.
#[test]
fn multi_map_bundle_round_trips_each_attachment() {
    let dir = tempfile::tempdir().unwrap();
    let source_root = dir.path().join("maps");

    for map_name in ["MapOne", "MapTwo"] {
        write_map_file(
            &source_root,
            map_name,
            "Conquest/ControlPoints.con",
            "Object.create ControlPointTemplate\nObject.absolutePosition -50/0/0\nObject.setTeam 1\nObject.setCanBeCaptured 0\nObject.setName Base_Axis\n\
             Object.create ControlPointTemplate\nObject.absolutePosition 50/0/0\nObject.setTeam 2\nObject.setCanBeCaptured 0\nObject.setName Base_Allies\n",
        );
    }

    let catalog = empty_catalog();
    let mapping = MappingTable::default();
    let terrain = flat_terrain("SharedTerrain", 500.0, 0.0);

    let output_one = convert_map(&source_root, "MapOne", &catalog, &mapping, &terrain).unwrap();
    let output_two = convert_map(&source_root, "MapTwo", &catalog, &mapping, &terrain).unwrap();

    let envelope = ExperienceBuilder::new("Bundle", "Conquest")
        .add_map("MapOne", &output_one.text, uuid::Uuid::new_v4())
        .add_map("MapTwo", &output_two.text, uuid::Uuid::new_v4())
        .build();

    assert_eq!(envelope.map_rotation.len(), 2);
    assert_eq!(envelope.attachments.len(), 2);
    assert_eq!(envelope.attachments[0].map_idx, 0);
    assert_eq!(envelope.attachments[1].map_idx, 1);

    let decoded_one = decode_attachment(&envelope.attachments[0].attachment_data.original);
    let decoded_two = decode_attachment(&envelope.attachments[1].attachment_data.original);
    assert_eq!(decoded_one, output_one.text);
    assert_eq!(decoded_two, output_two.text);
}

/// Scenario 7: a vehicle spawner whose source class is overridden by
/// the explicit mapping table resolves to the overridden enum index
/// rather than a direct name match.
#[test]
fn vehicle_spawner_honors_explicit_mapping_override() {
    let dir = tempfile::tempdir().unwrap();
    let source_root = dir.path().join("maps");
    let map_name = "VehicleMap";

    write_map_file(
        &source_root,
        map_name,
        "Conquest/ControlPoints.con",
        "Object.create ControlPointTemplate\nObject.absolutePosition -50/0/0\nObject.setTeam 1\nObject.setCanBeCaptured 0\nObject.setName Base_Axis\n\
         Object.create ControlPointTemplate\nObject.absolutePosition 50/0/0\nObject.setTeam 2\nObject.setCanBeCaptured 0\nObject.setName Base_Allies\n",
    );
    write_map_file(
        &source_root,
        map_name,
        "Conquest/ObjectSpawns.con",
        "Object.create heavy_tank_01\nObject.absolutePosition 0/0/20\nObject.setTeam 1\n",
    );

    let catalog = empty_catalog();
    let mapping = MappingTable::from_document(MappingDocument {
        default: [("heavy_tank_01".to_string(), "Leopard".to_string())].into_iter().collect(),
        overrides: vec![],
    });
    let terrain = flat_terrain("VehicleTerrain", 500.0, 0.0);

    let output = convert_map(&source_root, map_name, &catalog, &mapping, &terrain).unwrap();

    let vehicle_index = output
        .scene
        .nodes
        .iter()
        .find_map(|n| match n {
            SceneNode::VehicleSpawner { vehicle_enum_index, .. } => Some(*vehicle_enum_index),
            _ => None,
        })
        .expect("vehicle spawner node");
    assert_eq!(vehicle_index, 1, "heavy_tank_01 should map to Leopard (index 1) via the explicit override");
    assert!(output.report.notes.iter().all(|n| n.kind != NoteKind::Skip));
}

fn decode_attachment(payload_base64: &str) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    let bytes = STANDARD.decode(payload_base64).unwrap();
    String::from_utf8(bytes).unwrap()
}
