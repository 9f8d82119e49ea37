use battle_engine::{Battle, BattleStatus, CombatantConfig, FixedVariance, Intent};

#[test]
fn narrative_log_for_a_short_battle() {
    let mut battle = Battle::new(
        1,
        &CombatantConfig::new("Nutri", 100, 20),
        &CombatantConfig::new("Sugar Crash", 50, 8),
        FixedVariance(1.0),
    )
    .unwrap();

    let mut lines = Vec::new();
    for intent in [Intent::Companion, Intent::Defend, Intent::Counter, Intent::Attack] {
        let turn = battle.submit(intent).unwrap();
        lines.extend(turn.describe("Nutri", "Sugar Crash"));
    }
    assert_eq!(battle.status(), BattleStatus::BossDefeated);

    insta::assert_snapshot!(lines.join("\n"), @r"
    [TURN] 1 → companion
    [COMPANION][Nutri] companion strikes → 30 damage (cooldown 2)
    [BOSS][Sugar Crash] x1.000 → 9 damage
    [HP] Nutri 91 | Sugar Crash 20
    [TURN] 2 → defend
    [GUARD][Nutri] braces (-50% damage)
    [BOSS][Sugar Crash] x1.000 → 4 damage (guarded)
    [HP] Nutri 87 | Sugar Crash 20
    [TURN] 3 → counter
    [COUNTER][Nutri] myth busted → 12 damage
    [BOSS][Sugar Crash] attack negated
    [HP] Nutri 87 | Sugar Crash 8
    [TURN] 4 → attack
    [ATTACK][Nutri] x1.000 → 20 damage
    [BOSS][Sugar Crash] x1.000 → 9 damage
    [HP] Nutri 78 | Sugar Crash 0
    [STATUS] boss_defeated
    ");
}

#[test]
fn rejected_submit_keeps_session_state() {
    let mut battle = Battle::new(
        1,
        &CombatantConfig::new("Nutri", 100, 20),
        &CombatantConfig::new("Sugar Crash", 500, 8),
        FixedVariance(1.0),
    )
    .unwrap();
    battle.submit(Intent::Companion).unwrap();
    let snapshot = battle.state().clone();

    assert!(!battle.companion_ready());
    assert!(battle.submit(Intent::Companion).is_err());
    assert_eq!(battle.state(), &snapshot);
    assert_eq!(
        battle.available_intents(),
        vec![Intent::Attack, Intent::Defend, Intent::Counter]
    );
}

#[test]
fn resume_rejects_an_inconsistent_snapshot() {
    let battle = Battle::new(
        1,
        &CombatantConfig::new("Nutri", 100, 20),
        &CombatantConfig::new("Sugar Crash", 50, 8),
        FixedVariance(1.0),
    )
    .unwrap();
    let mut raw = serde_json::to_value(battle.state()).unwrap();
    raw["turn_number"] = serde_json::json!(0);
    let saved: battle_engine::BattleState = serde_json::from_value(raw).unwrap();
    assert!(Battle::resume(saved, FixedVariance(1.0)).is_err());

    let resumed = Battle::resume(battle.into_state(), FixedVariance(1.0)).unwrap();
    assert_eq!(resumed.state().turn_number(), 1);
}
