use battle_engine::{
    create_battle, resolve_turn, BattleError, CombatantConfig, Intent, SeededVariance,
};
use proptest::prelude::*;

fn intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        Just(Intent::Attack),
        Just(Intent::Defend),
        Just(Intent::Counter),
        Just(Intent::Companion),
    ]
}

proptest! {
    #[test]
    fn any_sequence_keeps_invariants(
        seed in any::<u64>(),
        level in 1u32..10,
        player in (1i64..300, 1i64..60),
        boss in (1i64..300, 1i64..60),
        intents in prop::collection::vec(intent(), 1..60),
    ) {
        let mut state = create_battle(
            level,
            &CombatantConfig::new("Nutri", player.0, player.1),
            &CombatantConfig::new("Boss", boss.0, boss.1),
        ).unwrap();
        let mut rng = SeededVariance::from_seed(seed);

        for intent in intents {
            let before = state.clone();
            match resolve_turn(&state, intent, &mut rng) {
                Ok(next) => {
                    prop_assert!(!before.is_over());
                    prop_assert_eq!(next.turn_number(), before.turn_number() + 1);
                    prop_assert_eq!(next.log().len(), before.log().len() + 1);
                    prop_assert!(next.player().current_health <= next.player().max_health);
                    prop_assert!(next.boss().current_health <= next.boss().max_health);
                    prop_assert!(next.companion_cooldown_remaining() <= 2);
                    if intent == Intent::Counter {
                        prop_assert_eq!(next.player().current_health, before.player().current_health);
                    }
                    if next.is_over() {
                        prop_assert!(next.player().is_defeated() || next.boss().is_defeated());
                    }
                    state = next;
                }
                Err(BattleError::BattleAlreadyEnded { status }) => {
                    prop_assert!(before.is_over());
                    prop_assert_eq!(status, before.status());
                }
                Err(BattleError::ActionUnavailable { turns_remaining, .. }) => {
                    prop_assert_eq!(intent, Intent::Companion);
                    prop_assert!(turns_remaining > 0);
                }
                Err(e) => prop_assert!(false, "unexpected error: {}", e),
            }
            if state.turn_number() == before.turn_number() {
                prop_assert_eq!(&state, &before);
            }
        }
    }

    #[test]
    fn seeded_runs_are_reproducible(seed in any::<u64>()) {
        let start = create_battle(
            2,
            &CombatantConfig::new("Nutri", 100, 20),
            &CombatantConfig::new("Boss", 150, 9),
        ).unwrap();
        let run = |seed| {
            let mut rng = SeededVariance::from_seed(seed);
            let mut s = start.clone();
            while !s.is_over() {
                s = resolve_turn(&s, Intent::Attack, &mut rng).unwrap();
            }
            s
        };
        prop_assert_eq!(run(seed), run(seed));
    }
}
