//! Command-line surface definitions for the conversion tool.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mapconv", version, about = "Converts classic Refractor-engine maps into scenes and experience bundles.")]
pub struct Cli {
    /// Increases log verbosity; repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Converts a single source map into a scene file plus run report.
    Convert(ConvertArgs),
    /// Packages one already-converted map's scene into an experience bundle.
    Export(ExportArgs),
    /// Bundles several already-converted maps into one multi-map experience.
    MultiExperience(MultiExperienceArgs),
    /// Re-runs a conversion and reports every gameplay invariant it violates.
    Validate(ConvertArgs),
    /// Pulls spawn points back within the standard radius of their owning headquarters.
    ResetSpawns(ResetSpawnsArgs),
}

#[derive(Debug, Clone, Parser)]
pub struct ConvertArgs {
    /// Root directory holding one subdirectory per source map.
    #[arg(long)]
    pub source_root: PathBuf,

    /// Name of the map to convert, matching its subdirectory under `source_root`.
    #[arg(long)]
    pub map: String,

    /// Path to the target-editor asset catalog document.
    #[arg(long)]
    pub catalog: PathBuf,

    /// Path to an optional explicit source-to-target asset mapping document.
    #[arg(long)]
    pub mapping: Option<PathBuf>,

    /// Path to the target base terrain's mesh description (JSON triangle list).
    #[arg(long)]
    pub terrain_mesh: PathBuf,

    /// Name the target editor uses to identify this base terrain.
    #[arg(long)]
    pub terrain_name: String,

    /// Directory to write the scene file and run report into.
    #[arg(long)]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Parser)]
pub struct ExportArgs {
    /// Directory holding the converted map's scene file.
    #[arg(long)]
    pub output: PathBuf,

    /// Name of the already-converted map to package.
    #[arg(long)]
    pub map: String,

    /// Display name of the packaged experience.
    #[arg(long)]
    pub name: String,

    /// Game mode the experience is configured for.
    #[arg(long)]
    pub game_mode: String,

    /// Per-team player cap; must be one of the editor's allowed sizes.
    #[arg(long, default_value_t = mapconv_core::constants::experience::DEFAULT_MAX_PLAYERS_PER_TEAM)]
    pub max_players: u32,

    /// Base terrain name to key the map-rotation entry on; read from the
    /// map's run report if omitted.
    #[arg(long)]
    pub base_map: Option<String>,

    /// Free-form description of the experience.
    #[arg(long)]
    pub description: Option<String>,

    /// An asset type name to restrict, repeatable.
    #[arg(long = "restrict")]
    pub restrictions: Vec<String>,
}

#[derive(Debug, Clone, Parser)]
pub struct MultiExperienceArgs {
    /// Directory holding every converted map's scene file.
    #[arg(long)]
    pub output: PathBuf,

    /// Names of the already-converted maps to bundle, in rotation order.
    #[arg(long = "map", required = true)]
    pub maps: Vec<String>,

    /// Display name of the packaged experience.
    #[arg(long)]
    pub name: String,

    /// Game mode the experience is configured for.
    #[arg(long)]
    pub game_mode: String,

    /// Per-team player cap; must be one of the editor's allowed sizes.
    #[arg(long, default_value_t = mapconv_core::constants::experience::DEFAULT_MAX_PLAYERS_PER_TEAM)]
    pub max_players: u32,
}

#[derive(Debug, Clone, Parser)]
pub struct ResetSpawnsArgs {
    /// Root directory holding one subdirectory per source map.
    #[arg(long)]
    pub source_root: PathBuf,

    /// Name of the map whose spawns should be checked.
    #[arg(long)]
    pub map: String,

    /// Directory to write the adjustment report into.
    #[arg(long)]
    pub output: PathBuf,
}
