use std::{fmt, str::FromStr};

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::content::{builtin_chapter, load_chapter, ChapterConfig};
use crate::state::{BattleState, BattleStatus, Intent};
use crate::{Battle, SeededVariance};

/// Safety cap on turns per simulated battle.
pub const MAX_TURNS: u32 = 200;
const CAUTIOUS_HEALTH_PERCENT: u32 = 30;

/// Scripted player behaviour used by simulations and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    AlwaysAttack,
    #[default]
    CompanionFirst,
    Cautious,
    Cycle,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::AlwaysAttack,
        Strategy::CompanionFirst,
        Strategy::Cautious,
        Strategy::Cycle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::AlwaysAttack => "always_attack",
            Strategy::CompanionFirst => "companion_first",
            Strategy::Cautious => "cautious",
            Strategy::Cycle => "cycle",
        }
    }

    /// Pick this turn's intent. Never returns an intent the engine would reject.
    pub fn choose(self, state: &BattleState) -> Intent {
        let ready = state.companion_ready();
        match self {
            Strategy::AlwaysAttack => Intent::Attack,
            Strategy::CompanionFirst => {
                if ready {
                    Intent::Companion
                } else {
                    Intent::Attack
                }
            }
            Strategy::Cautious => {
                if state.player().health_percent() <= CAUTIOUS_HEALTH_PERCENT {
                    Intent::Counter
                } else if ready {
                    Intent::Companion
                } else {
                    Intent::Attack
                }
            }
            Strategy::Cycle => match state.turn_number().saturating_sub(1) % 4 {
                0 => Intent::Attack,
                1 => Intent::Defend,
                2 => Intent::Counter,
                _ if ready => Intent::Companion,
                _ => Intent::Attack,
            },
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let key = s.trim().to_lowercase().replace('-', "_");
        Strategy::ALL
            .into_iter()
            .find(|st| st.as_str() == key)
            .ok_or_else(|| anyhow::anyhow!("unknown strategy '{}'", s))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleConfig {
    #[serde(default)]
    pub chapter_id: Option<String>,
    #[serde(default)]
    pub chapter_path: Option<String>,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub strategy: Strategy,
}

impl BattleConfig {
    pub fn chapter(&self) -> Result<ChapterConfig> {
        match (&self.chapter_path, &self.chapter_id) {
            (Some(path), _) => load_chapter(path),
            (None, Some(id)) => builtin_chapter(id),
            (None, None) => bail!("either chapter_path or chapter_id is required"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleSummary {
    pub chapter: String,
    pub winner: String,
    pub status: BattleStatus,
    pub turns: u32,
    pub player_health_end: u32,
    pub boss_health_end: u32,
    pub log: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct BattleStats {
    pub samples: u32,
    pub player_wins: u32,
    pub boss_wins: u32,
    pub unfinished: u32,
    pub avg_turns: f64,
}

pub fn simulate_battle(cfg: BattleConfig) -> Result<BattleSummary> {
    let chapter = cfg.chapter()?;
    run_battle(&chapter, cfg.strategy, cfg.seed)
}

pub fn simulate_battle_many(cfg: BattleConfig, samples: u32) -> Result<BattleStats> {
    let chapter = cfg.chapter()?;
    let mut stats = BattleStats {
        samples,
        player_wins: 0,
        boss_wins: 0,
        unfinished: 0,
        avg_turns: 0.0,
    };
    let mut total_turns = 0u64;
    for i in 0..samples {
        let res = run_battle(&chapter, cfg.strategy, cfg.seed.wrapping_add(u64::from(i)))?;
        total_turns += u64::from(res.turns);
        match res.status {
            BattleStatus::BossDefeated => stats.player_wins += 1,
            BattleStatus::PlayerDefeated => stats.boss_wins += 1,
            BattleStatus::Ongoing => stats.unfinished += 1,
        }
    }
    if samples > 0 {
        stats.avg_turns = total_turns as f64 / f64::from(samples);
    }
    Ok(stats)
}

/// Play one chapter to the end with a strategy and a seeded variance stream.
pub fn run_battle(chapter: &ChapterConfig, strategy: Strategy, seed: u64) -> Result<BattleSummary> {
    let mut battle = Battle::from_chapter(chapter, SeededVariance::from_seed(seed))?;
    let player = chapter.player.name.clone();
    let boss = chapter.boss.name.clone();

    let mut logs = vec![format!(
        "[START] {} (HP {}, ATK {}) vs {} (HP {}, ATK {}) chapter {} strategy={}",
        player,
        chapter.player.max_health,
        chapter.player.base_attack_power,
        boss,
        chapter.boss.max_health,
        chapter.boss.base_attack_power,
        chapter.chapter_level,
        strategy
    )];

    let mut turns = 0u32;
    while turns < MAX_TURNS && !battle.is_over() {
        let intent = strategy.choose(battle.state());
        let turn = battle.submit(intent)?;
        logs.extend(turn.describe(&player, &boss));
        turns += 1;
    }

    let state = battle.into_state();
    let winner = match state.status() {
        BattleStatus::BossDefeated => "player",
        BattleStatus::PlayerDefeated => "boss",
        BattleStatus::Ongoing => "none",
    };
    logs.push(format!(
        "[END] winner={} player_hp={} boss_hp={} turns={}",
        winner,
        state.player().current_health,
        state.boss().current_health,
        turns
    ));

    Ok(BattleSummary {
        chapter: chapter.name.clone(),
        winner: winner.to_string(),
        status: state.status(),
        turns,
        player_health_end: state.player().current_health,
        boss_health_end: state.boss().current_health,
        log: logs,
    })
}
