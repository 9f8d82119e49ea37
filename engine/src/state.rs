use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::error::BattleError;
use crate::resolve::COMPANION_COOLDOWN_TURNS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleStatus {
    Ongoing,
    PlayerDefeated,
    BossDefeated,
}

impl BattleStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, BattleStatus::Ongoing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BattleStatus::Ongoing => "ongoing",
            BattleStatus::PlayerDefeated => "player_defeated",
            BattleStatus::BossDefeated => "boss_defeated",
        }
    }
}

impl fmt::Display for BattleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the player chose to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Attack,
    Defend,
    Counter,
    Companion,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::Attack,
        Intent::Defend,
        Intent::Counter,
        Intent::Companion,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Attack => "attack",
            Intent::Defend => "defend",
            Intent::Counter => "counter",
            Intent::Companion => "companion",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown intent '{0}' (expected attack, defend, counter or companion)")]
pub struct ParseIntentError(pub String);

impl FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "attack" | "a" => Ok(Intent::Attack),
            "defend" | "d" => Ok(Intent::Defend),
            "counter" | "c" => Ok(Intent::Counter),
            "companion" | "p" => Ok(Intent::Companion),
            _ => Err(ParseIntentError(s.to_string())),
        }
    }
}

/// Immutable record of one resolved turn. Display/audit only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnResult {
    pub turn: u32,
    pub intent: Intent,
    pub damage_to_boss: u32,
    pub damage_to_player: u32,
    pub guarded: bool,
    pub counter_succeeded: bool,
    pub companion_triggered: bool,
    /// Variance rolls in per-mille; `None` when no roll was made.
    pub player_variance: Option<u32>,
    pub boss_variance: Option<u32>,
    pub player_health: u32,
    pub boss_health: u32,
    pub companion_cooldown: u32,
    pub status: BattleStatus,
}

impl TurnResult {
    /// Narrative lines for logs and the CLI.
    pub fn describe(&self, player: &str, boss: &str) -> Vec<String> {
        let mut lines = vec![format!("[TURN] {} → {}", self.turn, self.intent)];
        match self.intent {
            Intent::Attack => lines.push(format!(
                "[ATTACK][{}] x{} → {} damage",
                player,
                format_permille(self.player_variance),
                self.damage_to_boss
            )),
            Intent::Defend => lines.push(format!("[GUARD][{}] braces (-50% damage)", player)),
            Intent::Counter => lines.push(format!(
                "[COUNTER][{}] myth busted → {} damage",
                player, self.damage_to_boss
            )),
            Intent::Companion => lines.push(format!(
                "[COMPANION][{}] companion strikes → {} damage (cooldown {})",
                player, self.damage_to_boss, self.companion_cooldown
            )),
        }
        if self.counter_succeeded {
            lines.push(format!("[BOSS][{}] attack negated", boss));
        } else {
            lines.push(format!(
                "[BOSS][{}] x{} → {} damage{}",
                boss,
                format_permille(self.boss_variance),
                self.damage_to_player,
                if self.guarded { " (guarded)" } else { "" }
            ));
        }
        lines.push(format!(
            "[HP] {} {} | {} {}",
            player, self.player_health, boss, self.boss_health
        ));
        if self.status.is_terminal() {
            lines.push(format!("[STATUS] {}", self.status));
        }
        lines
    }
}

fn format_permille(p: Option<u32>) -> String {
    match p {
        Some(p) => format!("{}.{:03}", p / 1000, p % 1000),
        None => "-".to_string(),
    }
}

/// Authoritative state of one battle session.
///
/// Only the resolver produces new states; callers read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleState {
    pub(crate) player: Combatant,
    pub(crate) boss: Combatant,
    pub(crate) turn_number: u32,
    pub(crate) chapter_level: u32,
    pub(crate) companion_cooldown_remaining: u32,
    pub(crate) status: BattleStatus,
    pub(crate) log: Vec<TurnResult>,
}

impl BattleState {
    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn boss(&self) -> &Combatant {
        &self.boss
    }

    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    pub fn chapter_level(&self) -> u32 {
        self.chapter_level
    }

    pub fn companion_cooldown_remaining(&self) -> u32 {
        self.companion_cooldown_remaining
    }

    pub fn status(&self) -> BattleStatus {
        self.status
    }

    pub fn log(&self) -> &[TurnResult] {
        &self.log
    }

    pub fn last_turn(&self) -> Option<&TurnResult> {
        self.log.last()
    }

    pub fn is_over(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn companion_ready(&self) -> bool {
        self.companion_cooldown_remaining == 0
    }

    /// Check a state that arrived from outside the engine (saved sessions, FFI).
    pub fn validate(&self) -> Result<(), BattleError> {
        check_combatant("player", &self.player)?;
        check_combatant("boss", &self.boss)?;
        if self.turn_number == 0 {
            return Err(invalid("turn_number", 0));
        }
        if self.chapter_level == 0 {
            return Err(invalid("chapter_level", 0));
        }
        if self.companion_cooldown_remaining > COMPANION_COOLDOWN_TURNS {
            return Err(invalid(
                "companion_cooldown_remaining",
                self.companion_cooldown_remaining,
            ));
        }
        let player = self.player.current_health;
        let boss = self.boss.current_health;
        match self.status {
            BattleStatus::Ongoing if player == 0 => Err(invalid("player.current_health", player)),
            BattleStatus::Ongoing if boss == 0 => Err(invalid("boss.current_health", boss)),
            BattleStatus::PlayerDefeated if player != 0 => {
                Err(invalid("player.current_health", player))
            }
            BattleStatus::BossDefeated if boss != 0 => Err(invalid("boss.current_health", boss)),
            BattleStatus::BossDefeated if player == 0 => {
                Err(invalid("player.current_health", player))
            }
            _ => Ok(()),
        }
    }

    /// Intents the resolver will accept right now, in display order.
    pub fn available_intents(&self) -> Vec<Intent> {
        if self.is_over() {
            return Vec::new();
        }
        Intent::ALL
            .into_iter()
            .filter(|i| *i != Intent::Companion || self.companion_ready())
            .collect()
    }
}

fn check_combatant(side: &str, c: &Combatant) -> Result<(), BattleError> {
    if c.max_health == 0 {
        return Err(invalid(&format!("{}.max_health", side), 0));
    }
    if c.base_attack_power == 0 {
        return Err(invalid(&format!("{}.base_attack_power", side), 0));
    }
    if c.current_health > c.max_health {
        return Err(invalid(&format!("{}.current_health", side), c.current_health));
    }
    Ok(())
}

fn invalid(field: &str, value: u32) -> BattleError {
    BattleError::InvalidConfig {
        field: field.to_string(),
        value: i64::from(value),
    }
}
