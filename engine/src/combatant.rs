use serde::{Deserialize, Serialize};

use crate::error::BattleError;

/// Stats for one side of a battle as supplied by chapter content.
///
/// Numbers are signed so that bad content reaches the engine's validation
/// instead of failing somewhere inside the deserializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CombatantConfig {
    pub name: String,
    #[serde(default)]
    pub visual_id: Option<String>,
    pub max_health: i64,
    pub base_attack_power: i64,
}

impl CombatantConfig {
    pub fn new(name: impl Into<String>, max_health: i64, base_attack_power: i64) -> Self {
        Self {
            name: name.into(),
            visual_id: None,
            max_health,
            base_attack_power,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    pub visual_id: Option<String>,
    pub current_health: u32,
    pub max_health: u32,
    pub base_attack_power: u32,
}

impl Combatant {
    /// Build a combatant at full health. `side` prefixes the field name in errors.
    pub fn from_config(side: &str, cfg: &CombatantConfig) -> Result<Self, BattleError> {
        let max_health = positive(side, "max_health", cfg.max_health)?;
        let base_attack_power = positive(side, "base_attack_power", cfg.base_attack_power)?;
        Ok(Self {
            name: cfg.name.clone(),
            visual_id: cfg.visual_id.clone(),
            current_health: max_health,
            max_health,
            base_attack_power,
        })
    }

    pub fn is_defeated(&self) -> bool {
        self.current_health == 0
    }

    /// Remaining health as a whole percentage of max.
    pub fn health_percent(&self) -> u32 {
        let pct = u64::from(self.current_health) * 100 / u64::from(self.max_health.max(1));
        pct as u32
    }

    /// Subtract damage and clamp into `[0, max_health]`. Returns the health lost.
    pub(crate) fn take_damage(&mut self, dmg: u32) -> u32 {
        let before = self.current_health.min(self.max_health);
        self.current_health = before.saturating_sub(dmg);
        before - self.current_health
    }
}

fn positive(side: &str, field: &str, value: i64) -> Result<u32, BattleError> {
    match u32::try_from(value) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(BattleError::InvalidConfig {
            field: format!("{}.{}", side, field),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn damage_clamps_at_zero() {
        let mut c = Combatant::from_config("boss", &CombatantConfig::new("Slime", 10, 2)).unwrap();
        assert_eq!(c.take_damage(4), 4);
        assert_eq!(c.take_damage(50), 6);
        assert_eq!(c.current_health, 0);
        assert!(c.is_defeated());
    }

    #[test]
    fn oversized_values_are_rejected() {
        let cfg = CombatantConfig::new("Giant", i64::from(u32::MAX) + 1, 5);
        let err = Combatant::from_config("boss", &cfg).unwrap_err();
        assert_eq!(
            err,
            BattleError::InvalidConfig {
                field: "boss.max_health".into(),
                value: i64::from(u32::MAX) + 1
            }
        );
    }

    #[test]
    fn health_percent_rounds_down() {
        let mut c = Combatant::from_config("player", &CombatantConfig::new("Hero", 3, 1)).unwrap();
        c.take_damage(1);
        assert_eq!(c.health_percent(), 66);
    }
}
