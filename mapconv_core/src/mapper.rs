//! Asset Mapper: resolves a source engine token into a target-editor
//! asset name, in three tiers, falling back to a skip when nothing
//! fits.

use std::collections::BTreeMap;
use std::path::Path;

use crate::catalog::AssetCatalog;
use crate::error::Result;
use crate::model::AssetRef;
use crate::report::{Note, NoteKind};
use crate::script::parser::classify_source_token;

/// Optional, user-supplied explicit mapping table: source token to
/// target asset name, with optional per-terrain overrides.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    default: BTreeMap<String, String>,
    per_terrain: BTreeMap<String, BTreeMap<String, String>>,
}

impl MappingTable {
    pub fn from_document(doc: MappingDocument) -> Self {
        let mut per_terrain: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for entry in doc.overrides {
            per_terrain.entry(entry.terrain).or_default().insert(entry.source_token, entry.target_name);
        }
        Self { default: doc.default, per_terrain }
    }

    fn lookup(&self, source_token: &str, base_terrain: &str) -> Option<&str> {
        self.per_terrain
            .get(base_terrain)
            .and_then(|m| m.get(source_token))
            .or_else(|| self.default.get(source_token))
            .map(String::as_str)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let doc: MappingDocument = serde_json::from_str(&contents)?;
        Ok(Self::from_document(doc))
    }
}

/// On-disk shape of the optional explicit mapping document.
#[derive(Debug, Clone, Default, serde_derive::Deserialize, serde_derive::Serialize)]
pub struct MappingDocument {
    #[serde(default)]
    pub default: BTreeMap<String, String>,
    #[serde(default)]
    pub overrides: Vec<MappingOverride>,
}

#[derive(Debug, Clone, serde_derive::Deserialize, serde_derive::Serialize)]
pub struct MappingOverride {
    pub terrain: String,
    pub source_token: String,
    pub target_name: String,
}

/// Which tier resolved a source token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde_derive::Serialize, serde_derive::Deserialize)]
pub enum ResolutionTier {
    Explicit,
    CategoryFallback,
    KeywordFallback,
    Skipped,
}

/// The outcome of mapping one source token.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub source_token: String,
    pub chosen: Option<AssetRef>,
    pub tier: ResolutionTier,
}

/// Maps source tokens onto catalog assets, in priority order: explicit
/// mapping table, then category fallback, then a full-catalog keyword
/// search, then skip.
pub struct AssetMapper<'a> {
    catalog: &'a AssetCatalog,
    mapping: &'a MappingTable,
    base_terrain: &'a str,
    theme_keywords: Vec<String>,
}

impl<'a> AssetMapper<'a> {
    pub fn new(catalog: &'a AssetCatalog, mapping: &'a MappingTable, base_terrain: &'a str, map_name: &str) -> Self {
        Self { catalog, mapping, base_terrain, theme_keywords: derive_theme_keywords(map_name) }
    }

    pub fn resolve(&self, source_token: &str) -> (Resolution, Option<Note>) {
        if let Some(target_name) = self.mapping.lookup(source_token, self.base_terrain) {
            if let Some(asset) = self.catalog.by_name(target_name) {
                if asset.is_allowed_on(self.base_terrain) {
                    return (
                        Resolution { source_token: source_token.to_string(), chosen: Some(asset.clone()), tier: ResolutionTier::Explicit },
                        None,
                    );
                }
                let note = Note::new(
                    NoteKind::RestrictionMiss,
                    source_token,
                    format!("explicit mapping target '{target_name}' is not allowed on '{}'", self.base_terrain),
                );
                return self.fall_back(source_token, Some(note));
            }
            let note = Note::new(
                NoteKind::MappingMiss,
                source_token,
                format!("explicit mapping target '{target_name}' is not in the catalog"),
            );
            return self.fall_back(source_token, Some(note));
        }

        self.fall_back(source_token, None)
    }

    /// Resolves a vehicle/spawner source class to its target-vehicle
    /// enum index: explicit mapping table first (its target must itself
    /// be one of the fixed enum names), falling back to a direct
    /// enum-name match on the source class. Never synthesizes a class
    /// the enum doesn't already name.
    pub fn resolve_vehicle(&self, source_class: &str) -> (Option<usize>, Option<Note>) {
        let mut carried_note = None;
        if let Some(target_name) = self.mapping.lookup(source_class, self.base_terrain) {
            if let Some(index) = crate::model::target_vehicle_index(target_name) {
                return (Some(index), None);
            }
            carried_note = Some(Note::new(
                NoteKind::MappingMiss,
                source_class,
                format!("explicit mapping target '{target_name}' is not a target-vehicle enum name"),
            ));
        }

        match crate::model::target_vehicle_index(source_class) {
            Some(index) => (Some(index), carried_note),
            None => {
                let skip_note = Note::new(NoteKind::Skip, source_class, "source vehicle class has no target vehicle enum entry");
                (None, Some(carried_note.unwrap_or(skip_note)))
            }
        }
    }

    fn fall_back(&self, source_token: &str, carried_note: Option<Note>) -> (Resolution, Option<Note>) {
        let category = classify_source_token(source_token);
        let keywords = tokenize_keywords(source_token);
        let keyword_refs: Vec<&str> = keywords.iter().map(String::as_str).collect();

        let category_candidates = self.catalog.search_scored(category, &keyword_refs, self.base_terrain, true);
        if let Some(asset) = self.pick_best(&category_candidates) {
            return (
                Resolution { source_token: source_token.to_string(), chosen: Some(asset.clone()), tier: ResolutionTier::CategoryFallback },
                carried_note,
            );
        }

        let compatible = category.compatible_targets();
        let keyword_candidates: Vec<(&AssetRef, usize)> = compatible
            .iter()
            .flat_map(|&c| self.catalog.search_scored(c, &keyword_refs, self.base_terrain, false))
            .collect();
        if let Some(asset) = self.pick_best(&keyword_candidates) {
            return (
                Resolution { source_token: source_token.to_string(), chosen: Some(asset.clone()), tier: ResolutionTier::KeywordFallback },
                carried_note,
            );
        }

        let skip_note = Note::new(NoteKind::Skip, source_token, "no compatible catalog asset was found");
        (
            Resolution { source_token: source_token.to_string(), chosen: None, tier: ResolutionTier::Skipped },
            Some(carried_note.unwrap_or(skip_note)),
        )
    }

    /// Among the top-scoring candidates, prefers a name containing a
    /// map-theme keyword, then the shortest name, then lexicographic
    /// order.
    fn pick_best<'c>(&self, candidates: &[(&'c AssetRef, usize)]) -> Option<&'c AssetRef> {
        let best_score = candidates.first()?.1;
        let top: Vec<&AssetRef> = candidates.iter().filter(|(_, score)| *score == best_score).map(|(a, _)| *a).collect();

        top.into_iter()
            .min_by(|a, b| {
                let a_themed = self.matches_theme(a);
                let b_themed = self.matches_theme(b);
                b_themed
                    .cmp(&a_themed)
                    .then_with(|| a.source_token.len().cmp(&b.source_token.len()))
                    .then_with(|| a.source_token.cmp(&b.source_token))
            })
    }

    fn matches_theme(&self, asset: &AssetRef) -> bool {
        if self.theme_keywords.is_empty() {
            return false;
        }
        let lower = asset.source_token.to_lowercase();
        self.theme_keywords.iter().any(|kw| lower.contains(kw.as_str()))
    }
}

/// Splits a source token into lowercase keyword fragments on
/// underscores and digits, for keyword-search matching.
fn tokenize_keywords(token: &str) -> Vec<String> {
    token
        .split(|c: char| c == '_' || c.is_ascii_digit())
        .map(|s| s.to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Derives candidate theme keywords from a map's name, splitting on
/// non-alphanumeric boundaries.
fn derive_theme_keywords(map_name: &str) -> Vec<String> {
    map_name
        .split(|c: char| !c.is_alphanumeric())
        .map(|s| s.to_lowercase())
        .filter(|s| s.len() > 2)
        .collect()
}
