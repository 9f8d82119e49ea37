use tracing::{debug, trace, warn};

use crate::combatant::{Combatant, CombatantConfig};
use crate::error::BattleError;
use crate::state::{BattleState, BattleStatus, Intent, TurnResult};
use crate::{variance_permille, VarianceSource};

/// Turns the companion stays locked, counting the turn it is used.
pub const COMPANION_COOLDOWN_TURNS: u32 = 2;

// Multipliers in tenths.
const COUNTER_TENTHS: u64 = 6;
const COMPANION_TENTHS: u64 = 15;
const GUARD_TENTHS: u64 = 5;
/// Boss attack grows by 10% per chapter level.
const CHAPTER_SCALE_TENTHS: u128 = 1;

/// Start a battle with both combatants at full health.
pub fn create_battle(
    chapter_level: u32,
    player: &CombatantConfig,
    boss: &CombatantConfig,
) -> Result<BattleState, BattleError> {
    if chapter_level == 0 {
        return Err(BattleError::InvalidConfig {
            field: "chapter_level".into(),
            value: 0,
        });
    }
    let player = Combatant::from_config("player", player)?;
    let boss = Combatant::from_config("boss", boss)?;
    debug!(
        chapter_level,
        player = %player.name,
        boss = %boss.name,
        "battle created"
    );
    Ok(BattleState {
        player,
        boss,
        turn_number: 1,
        chapter_level,
        companion_cooldown_remaining: 0,
        status: BattleStatus::Ongoing,
        log: Vec::new(),
    })
}

/// Resolve one turn and return the next state. `state` is never modified.
///
/// The state is re-validated first, so a tampered snapshot fails with
/// `InvalidConfig` instead of producing a turn.
pub fn resolve_turn<V: VarianceSource + ?Sized>(
    state: &BattleState,
    intent: Intent,
    variance: &mut V,
) -> Result<BattleState, BattleError> {
    resolve(state, intent, variance).map(|(next, _)| next)
}

pub(crate) fn resolve<V: VarianceSource + ?Sized>(
    state: &BattleState,
    intent: Intent,
    variance: &mut V,
) -> Result<(BattleState, TurnResult), BattleError> {
    state.validate()?;
    if state.status.is_terminal() {
        warn!(status = %state.status, %intent, "turn submitted after battle ended");
        return Err(BattleError::BattleAlreadyEnded {
            status: state.status,
        });
    }
    if intent == Intent::Companion && state.companion_cooldown_remaining > 0 {
        warn!(
            turns_remaining = state.companion_cooldown_remaining,
            "companion requested while cooling down"
        );
        return Err(BattleError::ActionUnavailable {
            intent,
            turns_remaining: state.companion_cooldown_remaining,
        });
    }

    let mut next = state.clone();
    let attack = u64::from(next.player.base_attack_power);

    // 1. player action
    let mut player_variance = None;
    let mut guarded = false;
    let mut countered = false;
    let damage_to_boss = match intent {
        Intent::Attack => {
            let p = roll(variance);
            player_variance = Some(p);
            scale(attack, u64::from(p), 1000)
        }
        Intent::Defend => {
            guarded = true;
            0
        }
        Intent::Counter => {
            // the wisdom check always succeeds
            countered = true;
            scale(attack, COUNTER_TENTHS, 10)
        }
        Intent::Companion => scale(attack, COMPANION_TENTHS, 10),
    };

    // 2. boss action
    let mut boss_variance = None;
    let damage_to_player = if countered {
        0
    } else {
        let p = roll(variance);
        boss_variance = Some(p);
        let raw = boss_damage(next.boss.base_attack_power, next.chapter_level, p);
        if guarded { scale(u64::from(raw), GUARD_TENTHS, 10) } else { raw }
    };

    // 3. apply
    next.boss.take_damage(damage_to_boss);
    next.player.take_damage(damage_to_player);

    // 4. cooldown
    if intent == Intent::Companion {
        next.companion_cooldown_remaining = COMPANION_COOLDOWN_TURNS;
    } else if next.companion_cooldown_remaining > 0 {
        next.companion_cooldown_remaining -= 1;
    }

    // 5. terminal check, player first
    next.status = if next.player.is_defeated() {
        BattleStatus::PlayerDefeated
    } else if next.boss.is_defeated() {
        BattleStatus::BossDefeated
    } else {
        BattleStatus::Ongoing
    };

    // 6. bookkeeping
    let turn = TurnResult {
        turn: state.turn_number,
        intent,
        damage_to_boss,
        damage_to_player,
        guarded,
        counter_succeeded: countered,
        companion_triggered: intent == Intent::Companion,
        player_variance,
        boss_variance,
        player_health: next.player.current_health,
        boss_health: next.boss.current_health,
        companion_cooldown: next.companion_cooldown_remaining,
        status: next.status,
    };
    next.turn_number = state.turn_number.saturating_add(1);
    next.log.push(turn.clone());

    debug!(
        turn = turn.turn,
        %intent,
        damage_to_boss,
        damage_to_player,
        player_health = turn.player_health,
        boss_health = turn.boss_health,
        status = %turn.status,
        "turn resolved"
    );
    Ok((next, turn))
}

fn roll<V: VarianceSource + ?Sized>(variance: &mut V) -> u32 {
    let raw = variance.variance();
    let p = variance_permille(raw);
    trace!(raw, permille = p, "variance rolled");
    p
}

/// `base × (1 + 0.1 × level) × variance`, rounded once.
fn boss_damage(base: u32, chapter_level: u32, variance_permille: u32) -> u32 {
    let level_tenths = 10 + CHAPTER_SCALE_TENTHS * u128::from(chapter_level);
    let num = u128::from(base) * level_tenths * u128::from(variance_permille);
    saturate(round_div(num, 10_000))
}

/// `value × num / den` in fixed point, rounded and saturated to `u32`.
fn scale(value: u64, num: u64, den: u64) -> u32 {
    saturate(round_div(u128::from(value) * u128::from(num), u128::from(den)))
}

/// Nearest integer to `num / den`; an exact half rounds down (5.5 → 5).
fn round_div(num: u128, den: u128) -> u128 {
    (2 * num + den - 1) / (2 * den)
}

fn saturate(v: u128) -> u32 {
    u32::try_from(v).unwrap_or(u32::MAX)
}
