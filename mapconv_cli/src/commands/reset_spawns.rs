use anyhow::{Context, Result};
use mapconv_core::paths;
use mapconv_core::script::parse_source_map;
use mapconv_core::snapper;
use serde::Serialize;

use crate::app::ResetSpawnsArgs;

#[derive(Debug, Serialize)]
struct SpawnAdjustment {
    owner_name: String,
    original: mapconv_core::geometry::Vector3,
    adjusted: mapconv_core::geometry::Vector3,
    changed: bool,
}

/// Pulls every spawn point that has drifted outside the standard reset
/// radius of its owning control point back onto that radius, and writes
/// a JSON report of what moved.
pub fn run(args: &ResetSpawnsArgs) -> Result<()> {
    let source_map = parse_source_map(&args.source_root, &args.map).context("parsing source map")?;
    let adjustments: Vec<SpawnAdjustment> = source_map
        .spawn_points
        .iter()
        .zip(snapper::reset_spawns(&source_map))
        .map(|(original, (adjusted, changed))| SpawnAdjustment {
            owner_name: original.owner_name.clone(),
            original: original.position,
            adjusted: adjusted.position,
            changed,
        })
        .collect();

    let changed_count = adjustments.iter().filter(|a| a.changed).count();
    let json = serde_json::to_vec_pretty(&adjustments)?;
    let report_path = paths::report_path(&args.output, &format!("{}.spawn-reset", args.map));
    paths::write_atomic(&report_path, &json)?;

    println!("{}: {} of {} spawn(s) adjusted", args.map, changed_count, adjustments.len());
    println!("wrote {}", report_path.display());
    Ok(())
}
