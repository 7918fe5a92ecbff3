//! Target-editor asset catalog: loads the asset-type database and
//! exposes fast lookups.

use std::collections::BTreeMap;
use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{AssetCategory, AssetRef};

/// On-disk shape of the catalog document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogDocument {
    #[serde(rename = "AssetTypes")]
    pub asset_types: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogEntry {
    #[serde(rename = "type")]
    pub type_name: String,
    pub directory: String,
    #[serde(default, rename = "levelRestrictions")]
    pub level_restrictions: Vec<String>,
    #[serde(default)]
    pub constants: Vec<CatalogConstant>,
    #[serde(default)]
    pub properties: Vec<CatalogProperty>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConstant {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub value_type: String,
    pub default: serde_json::Value,
}

/// Read-only, indexed view over the catalog document.
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    by_name: BTreeMap<String, AssetRef>,
}

impl AssetCatalog {
    pub fn from_document(doc: CatalogDocument) -> Self {
        let mut by_name = BTreeMap::new();
        for entry in doc.asset_types {
            let category = classify_directory(&entry.directory);
            let asset = AssetRef {
                source_token: entry.type_name.clone(),
                target_type: Some(entry.type_name.clone()),
                category,
                restrictions: entry.level_restrictions.into_iter().collect(),
                directory: entry.directory,
            };
            by_name.insert(asset.source_token.clone(), asset);
        }
        Self { by_name }
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(crate::error::ConvertError::CatalogNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        let doc: CatalogDocument = serde_json::from_str(&contents)?;
        Ok(Self::from_document(doc))
    }

    /// Exact-match lookup by asset type name.
    pub fn by_name(&self, name: &str) -> Option<&AssetRef> {
        self.by_name.get(name)
    }

    /// `false` iff `name` has non-empty restrictions and `base_terrain`
    /// isn't one of them.
    pub fn is_allowed(&self, name: &str, base_terrain: &str) -> bool {
        match self.by_name(name) {
            Some(asset) => asset.is_allowed_on(base_terrain),
            None => false,
        }
    }

    /// Derives the category of `name` from its catalog directory
    /// prefix, if it is known.
    pub fn classify(&self, name: &str) -> Option<AssetCategory> {
        self.by_name(name).map(|a| a.category)
    }

    /// Every asset name this catalog knows about.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    /// All allowed assets of `category` whose name or directory path
    /// contains any of `keywords` (case-insensitive), ordered by
    /// (keyword-match-count desc, name asc).
    pub fn search(&self, category: AssetCategory, keywords: &[&str], base_terrain: &str) -> Vec<&AssetRef> {
        self.search_scored(category, keywords, base_terrain, true).into_iter().map(|(a, _)| a).collect()
    }

    /// All allowed assets whose category is among `categories`,
    /// ordered the same way as [`AssetCatalog::search`].
    pub fn search_across_categories(
        &self,
        categories: &[AssetCategory],
        keywords: &[&str],
        base_terrain: &str,
    ) -> Vec<&AssetRef> {
        let lower_keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        let mut matches: Vec<(&AssetRef, usize)> = self
            .by_name
            .values()
            .filter(|a| categories.contains(&a.category) && a.is_allowed_on(base_terrain))
            .filter_map(|a| {
                let score = keyword_score(a, &lower_keywords);
                if score > 0 { Some((a, score)) } else { None }
            })
            .collect();

        sort_scored(&mut matches);
        matches.into_iter().map(|(asset, _)| asset).collect()
    }

    /// Same as [`AssetCatalog::search`] but keeps the per-candidate
    /// keyword-match score around, so the Asset Mapper can apply its
    /// own theme/shortest-name tie-break on top of equal-score groups.
    pub fn search_scored(
        &self,
        category: AssetCategory,
        keywords: &[&str],
        base_terrain: &str,
        allow_zero_score: bool,
    ) -> Vec<(&AssetRef, usize)> {
        let lower_keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        let mut matches: Vec<(&AssetRef, usize)> = self
            .by_name
            .values()
            .filter(|a| a.category == category && a.is_allowed_on(base_terrain))
            .filter_map(|a| {
                let score = keyword_score(a, &lower_keywords);
                if score > 0 || (allow_zero_score && lower_keywords.is_empty()) {
                    Some((a, score))
                } else {
                    None
                }
            })
            .collect();

        sort_scored(&mut matches);
        matches
    }
}

fn keyword_score(asset: &AssetRef, lower_keywords: &[String]) -> usize {
    let haystack = format!("{} {}", asset.source_token.to_lowercase(), asset.directory.to_lowercase());
    lower_keywords.iter().filter(|kw| haystack.contains(kw.as_str())).count()
}

fn sort_scored(matches: &mut [(&AssetRef, usize)]) {
    matches.sort_by(|(a_asset, a_score), (b_asset, b_score)| {
        b_score.cmp(a_score).then_with(|| a_asset.source_token.cmp(&b_asset.source_token))
    });
}

/// Category derivation from a catalog directory path prefix.
fn classify_directory(directory: &str) -> AssetCategory {
    let lower = directory.to_lowercase();
    if lower.starts_with("nature/trees") || lower.starts_with("nature/tree") {
        AssetCategory::Tree
    } else if lower.starts_with("architecture/") {
        AssetCategory::Building
    } else if lower.starts_with("props/") {
        AssetCategory::Prop
    } else if lower.starts_with("gameplay/") {
        AssetCategory::Gameplay
    } else if lower.starts_with("vehicles/") {
        AssetCategory::Vehicle
    } else if lower.starts_with("weapons/stationary") {
        AssetCategory::StationaryWeapon
    } else if lower.starts_with("nature/water") || lower.starts_with("water/") {
        AssetCategory::Water
    } else if lower.starts_with("terrain/") {
        AssetCategory::Terrain
    } else {
        AssetCategory::Other
    }
}
