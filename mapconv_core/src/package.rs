//! Experience Packager: wraps one or more emitted scenes into the
//! curated editor's fixed experience envelope — mutators, asset
//! restrictions, map rotation, and base64-encoded scene attachments.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_derive::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::experience;

/// Overridable knobs the editor reads before anything map-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutators {
    pub max_players_per_team: u32,
    pub game_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One entry in the experience's map rotation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapRotationEntry {
    pub id: String,
    #[serde(rename = "spatialAttachment")]
    pub spatial_attachment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentData {
    pub original: String,
}

/// One packaged map's scene payload, embedded as base64 text.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub filename: String,
    pub attachment_data: AttachmentData,
    pub attachment_type: u32,
    pub version: String,
    pub is_processable: bool,
    pub processing_status: u32,
    pub map_idx: usize,
}

impl Attachment {
    /// Builds an attachment from a map's emitted scene text, assigning
    /// a fresh v4 id and the rotation index it belongs to.
    pub fn from_scene_text(base_terrain: &str, scene_text: &str, id: Uuid, map_idx: usize) -> Self {
        Self {
            id: id.to_string(),
            filename: format!("{base_terrain}.spatial.json"),
            attachment_data: AttachmentData { original: BASE64.encode(scene_text.as_bytes()) },
            attachment_type: experience::ATTACHMENT_TYPE,
            version: experience::ATTACHMENT_VERSION.to_string(),
            is_processable: true,
            processing_status: experience::PROCESSING_STATUS,
            map_idx,
        }
    }
}

/// The full experience envelope, ready to be serialized to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceEnvelope {
    pub mutators: Mutators,
    pub asset_restrictions: BTreeMap<String, bool>,
    pub game_mode: String,
    pub map_rotation: Vec<MapRotationEntry>,
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone)]
pub struct ExperienceBuilder {
    name: String,
    game_mode: String,
    max_players_per_team: u32,
    description: Option<String>,
    asset_restrictions: BTreeMap<String, bool>,
    map_rotation: Vec<MapRotationEntry>,
    attachments: Vec<Attachment>,
}

impl ExperienceBuilder {
    pub fn new(name: impl Into<String>, game_mode: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            game_mode: normalize_game_mode(game_mode.into()),
            max_players_per_team: experience::DEFAULT_MAX_PLAYERS_PER_TEAM,
            description: None,
            asset_restrictions: BTreeMap::new(),
            map_rotation: Vec::new(),
            attachments: Vec::new(),
        }
    }

    /// Sets the per-team player cap. Silently falls back to the
    /// default if `value` isn't one of the editor's allowed sizes.
    pub fn max_players_per_team(mut self, value: u32) -> Self {
        self.max_players_per_team = if experience::ALLOWED_MAX_PLAYERS_PER_TEAM.contains(&value) {
            value
        } else {
            experience::DEFAULT_MAX_PLAYERS_PER_TEAM
        };
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn restrict_asset(mut self, name: impl Into<String>) -> Self {
        self.asset_restrictions.insert(name.into(), true);
        self
    }

    /// Adds one map to the bundle: a rotation entry keyed on its base
    /// terrain, plus its scene attachment at the matching `mapIdx`.
    pub fn add_map(mut self, base_terrain: impl Into<String>, scene_text: &str, attachment_id: Uuid) -> Self {
        let base_terrain = base_terrain.into();
        let map_idx = self.map_rotation.len();
        let rotation_id = format!("{base_terrain}-{}", experience::ROTATION_ID_SUFFIX);
        self.map_rotation.push(MapRotationEntry { id: rotation_id, spatial_attachment: attachment_id.to_string() });
        self.attachments.push(Attachment::from_scene_text(&base_terrain, scene_text, attachment_id, map_idx));
        self
    }

    pub fn build(self) -> ExperienceEnvelope {
        ExperienceEnvelope {
            mutators: Mutators { max_players_per_team: self.max_players_per_team, game_mode: self.game_mode.clone(), description: self.description },
            asset_restrictions: self.asset_restrictions,
            game_mode: format!("{}_{}", self.name, self.game_mode),
            map_rotation: self.map_rotation,
            attachments: self.attachments,
        }
    }
}

/// Falls back to the default game mode if `value` isn't one of the
/// editor's allowed modes.
fn normalize_game_mode(value: String) -> String {
    if experience::ALLOWED_GAME_MODES.contains(&value.as_str()) {
        value
    } else {
        experience::DEFAULT_GAME_MODE.to_string()
    }
}
