use anyhow::{Context, Result};
use mapconv_core::package::ExperienceBuilder;
use mapconv_core::paths;
use mapconv_core::report::RunReport;
use rayon::prelude::*;
use uuid::Uuid;

use crate::app::MultiExperienceArgs;

/// Bundles several already-converted maps' scenes into one multi-map
/// experience envelope, read in parallel since each map's scene is
/// independent.
pub fn run(args: &MultiExperienceArgs) -> Result<()> {
    let scenes: Vec<(String, String)> = args
        .maps
        .par_iter()
        .map(|map_name| {
            let scene_path = paths::scene_path(&args.output, map_name);
            let scene_text = std::fs::read_to_string(&scene_path)
                .with_context(|| format!("reading converted scene at {}", scene_path.display()))?;

            let report_path = paths::report_path(&args.output, map_name);
            let report_contents = std::fs::read_to_string(&report_path)
                .with_context(|| format!("reading run report at {}", report_path.display()))?;
            let report: RunReport = serde_json::from_str(&report_contents)?;

            Ok((report.base_terrain, scene_text))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut builder = ExperienceBuilder::new(&args.name, &args.game_mode).max_players_per_team(args.max_players);
    for (base_terrain, scene_text) in &scenes {
        builder = builder.add_map(base_terrain, scene_text, Uuid::new_v4());
    }

    let envelope = builder.build();
    let json = serde_json::to_vec_pretty(&envelope)?;
    let bundle_path = args.output.join(format!("{}.experience.json", args.name));
    paths::write_atomic(&bundle_path, &json)?;

    println!("wrote {}", bundle_path.display());
    Ok(())
}
