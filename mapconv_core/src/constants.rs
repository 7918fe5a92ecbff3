//! Named constants, grouped by domain. Every numeric referenced in the
//! specification corresponds to one constant here — nothing below is
//! inlined as a magic number at its call site.

/// Object-class clearances applied by the Height Snapper,
/// in meters above `terrain.height_at(x, z)`.
pub mod clearance {
    pub const SPAWN_POINT: f64 = 1.0;
    pub const VEHICLE_SPAWNER_GROUND: f64 = 0.5;
    pub const VEHICLE_SPAWNER_AIR: f64 = 2.0;
    pub const BUILDING: f64 = 0.0;
    pub const PROP: f64 = 0.0;
    pub const TREE: f64 = 0.0;
    pub const CAPTURE_POINT: f64 = 0.5;
    pub const HEADQUARTERS: f64 = 0.5;
}

/// Gameplay-layout constants.
pub mod gameplay {
    /// Buffer inflating `SourceMap::bounds` beyond the raw control-point
    /// and spawner extent.
    pub const BOUNDS_BUFFER_METERS: f64 = 50.0;

    /// Buffer inflating the combat-area polygon beyond the XZ hull of
    /// all gameplay objects.
    pub const COMBAT_AREA_BUFFER_METERS: f64 = 50.0;

    /// Headroom added above max terrain height to derive the combat
    /// area ceiling Y.
    pub const COMBAT_AREA_CEILING_HEADROOM_METERS: f64 = 140.0;

    /// Vertical extent of the combat area volume.
    pub const COMBAT_AREA_HEIGHT_METERS: f64 = 100.0;

    /// Minimum spawn points required per team.
    pub const MIN_SPAWNS_PER_TEAM: usize = 4;

    /// Required number of headquarters per emitted scene.
    pub const REQUIRED_HEADQUARTERS: usize = 2;

    /// Radius of the optional spawn-circle reset.
    pub const SPAWN_RESET_RADIUS_METERS: f64 = 10.0;
}

/// Terrain sampling constants.
pub mod terrain {
    /// Side length of the cached height grid.
    pub const HEIGHT_GRID_SIZE: usize = 256;
}

/// Numeric tolerances used by invariant checks.
pub mod tolerance {
    /// Maximum allowed deviation of an emitted 3x3 basis from
    /// orthonormal.
    pub const ORTHONORMALITY: f64 = 1e-4;

    /// Maximum allowed deviation between a snapped object's Y and its
    /// expected `terrain height + clearance`.
    pub const HEIGHT_SNAP: f64 = 1e-6;

    /// Tie-break window for the Orientation Solver's intersection-area
    /// score.
    pub const ORIENTATION_TIE: f64 = 0.01;
}

/// Experience Packager defaults.
pub mod experience {
    pub const DEFAULT_MAX_PLAYERS_PER_TEAM: u32 = 32;
    pub const ALLOWED_MAX_PLAYERS_PER_TEAM: [u32; 3] = [16, 32, 64];
    pub const DEFAULT_GAME_MODE: &str = "Conquest";
    pub const ALLOWED_GAME_MODES: [&str; 4] = ["Conquest", "Rush", "TeamDeathmatch", "Breakthrough"];
    pub const ATTACHMENT_TYPE: u32 = 1;
    pub const PROCESSING_STATUS: u32 = 2;
    pub const ATTACHMENT_VERSION: &str = "123";
    /// Suffix appended to a base terrain name to build a map-rotation id.
    pub const ROTATION_ID_SUFFIX: &str = "custom";
}

/// Scene Emitter format constants.
pub mod scene_format {
    pub const SIGNIFICANT_DIGITS: usize = 6;
    pub const FORMAT_VERSION: u32 = 3;
}
