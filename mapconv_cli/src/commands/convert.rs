use anyhow::{Context, Result};
use log::info;
use mapconv_core::catalog::AssetCatalog;
use mapconv_core::mapper::MappingTable;
use mapconv_core::terrain::{MeshDescription, TargetTerrain};
use mapconv_core::{paths, pipeline};

use crate::app::ConvertArgs;

/// Loads a map's catalog, optional mapping table and target terrain,
/// then runs the full conversion pipeline, writing the scene and run
/// report to `args.output`.
pub fn run(args: &ConvertArgs) -> Result<()> {
    let catalog = AssetCatalog::load(&args.catalog).context("loading asset catalog")?;
    let mapping = match &args.mapping {
        Some(path) => MappingTable::load(path).context("loading explicit mapping table")?,
        None => MappingTable::default(),
    };

    let mesh = MeshDescription::load(&args.terrain_mesh).context("loading terrain mesh")?;
    let terrain = TargetTerrain::from_mesh(&args.terrain_name, &mesh)
        .context("building terrain height grid")?
        .with_allowed_assets(&catalog, catalog.names().map(str::to_string).collect::<Vec<_>>());

    let output = pipeline::convert_map(&args.source_root, &args.map, &catalog, &mapping, &terrain)?;

    let scene_path = paths::scene_path(&args.output, &args.map);
    paths::write_atomic(&scene_path, output.text.as_bytes())?;

    let report_json = serde_json::to_vec_pretty(&output.report)?;
    let report_path = paths::report_path(&args.output, &args.map);
    paths::write_atomic(&report_path, &report_json)?;

    info!(
        "{}: {} control point(s), {} spawn point(s), {} note(s), remap {:?}",
        args.map,
        output.report.control_point_count,
        output.report.spawn_point_count,
        output.report.notes.len(),
        output.report.chosen_remap
    );
    println!("wrote {}", scene_path.display());
    println!("wrote {}", report_path.display());

    Ok(())
}
