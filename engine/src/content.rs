use std::{fs, path::Path};

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::combatant::CombatantConfig;

/// Battle setup for one chapter, as delivered by the content tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChapterConfig {
    pub name: String,
    pub chapter_level: u32,
    pub player: CombatantConfig,
    pub boss: CombatantConfig,
}

/// Built-in chapters in play order.
pub fn builtin_chapters() -> IndexMap<&'static str, &'static str> {
    IndexMap::from([
        ("sugar_rush", include_str!("../content/chapters/sugar_rush.json")),
        (
            "junk_food_giant",
            include_str!("../content/chapters/junk_food_giant.json"),
        ),
        ("myth_master", include_str!("../content/chapters/myth_master.json")),
    ])
}

pub fn builtin_chapter(id: &str) -> Result<ChapterConfig> {
    let chapters = builtin_chapters();
    let text = chapters
        .get(id)
        .ok_or_else(|| anyhow!("unknown built-in chapter '{}'", id))?;
    serde_json::from_str(text).with_context(|| format!("failed to parse built-in chapter: {}", id))
}

/// Load a chapter from disk; `.yaml`/`.yml` files are read as YAML, everything else as JSON.
pub fn load_chapter(path: impl AsRef<Path>) -> Result<ChapterConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read chapter file: {}", path.display()))?;
    parse_chapter(&text, is_yaml(path))
        .with_context(|| format!("failed to parse chapter file: {}", path.display()))
}

pub fn parse_chapter(text: &str, yaml: bool) -> Result<ChapterConfig> {
    let cfg: ChapterConfig = if yaml {
        serde_yaml::from_str(text)?
    } else {
        serde_json::from_str(text)?
    };
    Ok(cfg)
}

/// `.yaml`/`.yml` (any case) selects the YAML parser; everything else is JSON.
pub fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}
