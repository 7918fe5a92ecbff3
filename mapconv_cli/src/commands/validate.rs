use anyhow::{Context, Result};
use mapconv_core::catalog::AssetCatalog;
use mapconv_core::error::ConvertError;
use mapconv_core::mapper::MappingTable;
use mapconv_core::terrain::{MeshDescription, TargetTerrain};
use mapconv_core::{paths, pipeline, validate};

use crate::app::ConvertArgs;

/// Re-runs a map's conversion and checks the result against every
/// gameplay invariant, exiting with [`ConvertError::ValidationFailure`]
/// if any is violated.
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
    let violations = validate::validate(&output.source_map, &output.scene);

    if violations.is_empty() {
        let report_path = paths::report_path(&args.output, &args.map);
        println!("{}: no violations ({})", args.map, report_path.display());
        return Ok(());
    }

    for violation in &violations {
        eprintln!("{}: {}", args.map, violation.0);
    }
    Err(ConvertError::ValidationFailure(violations.len()).into())
}
