use anyhow::{Context, Result};
use mapconv_core::package::ExperienceBuilder;
use mapconv_core::paths;
use mapconv_core::report::RunReport;
use uuid::Uuid;

use crate::app::ExportArgs;

/// Reads an already-converted map's scene text and wraps it in a
/// single-map experience envelope.
pub fn run(args: &ExportArgs) -> Result<()> {
    let scene_path = paths::scene_path(&args.output, &args.map);
    let scene_text = std::fs::read_to_string(&scene_path)
        .with_context(|| format!("reading converted scene at {}", scene_path.display()))?;

    let base_terrain = match &args.base_map {
        Some(explicit) => explicit.clone(),
        None => read_base_terrain(&args.output, &args.map)?,
    };

    let mut builder = ExperienceBuilder::new(&args.name, &args.game_mode)
        .max_players_per_team(args.max_players)
        .add_map(&base_terrain, &scene_text, Uuid::new_v4());

    if let Some(description) = &args.description {
        builder = builder.description(description);
    }
    for restriction in &args.restrictions {
        builder = builder.restrict_asset(restriction);
    }

    let envelope = builder.build();
    let json = serde_json::to_vec_pretty(&envelope)?;
    let experience_path = paths::experience_path(&args.output, &args.map);
    paths::write_atomic(&experience_path, &json)?;

    println!("wrote {}", experience_path.display());
    Ok(())
}

/// Recovers the base terrain a map was converted against from its run
/// report, so packaging doesn't need to repeat that choice.
fn read_base_terrain(output: &std::path::Path, map_name: &str) -> Result<String> {
    let report_path = paths::report_path(output, map_name);
    let contents = std::fs::read_to_string(&report_path)
        .with_context(|| format!("reading run report at {}", report_path.display()))?;
    let report: RunReport = serde_json::from_str(&contents)?;
    Ok(report.base_terrain)
}
