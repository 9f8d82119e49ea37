use battle_engine::api::{simulate_battle, simulate_battle_many, BattleConfig};
use battle_engine::{
    create_battle, resolve_turn, BattleError, BattleState, ChapterConfig, Intent, SeededVariance,
};
use jni::objects::{JClass, JString};
use jni::sys::jstring;
use jni::JNIEnv;
use serde::Deserialize;
use serde_json::json;

fn ok(env: &JNIEnv, value: serde_json::Value) -> jstring {
    let payload = json!({ "ok": true, "result": value });
    env.new_string(payload.to_string())
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

fn err(env: &JNIEnv, e: impl std::fmt::Display, kind: &str) -> jstring {
    let payload = json!({ "ok": false, "error": e.to_string(), "kind": kind });
    env.new_string(payload.to_string())
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

fn respond(env: &JNIEnv, res: Result<serde_json::Value, FfiError>) -> jstring {
    match res {
        Ok(v) => ok(env, v),
        Err(e) => err(env, &e.message, e.kind),
    }
}

/// Error surfaced across the JNI boundary, tagged for the Kotlin side.
#[derive(Debug)]
pub struct FfiError {
    pub kind: &'static str,
    pub message: String,
}

impl From<BattleError> for FfiError {
    fn from(e: BattleError) -> Self {
        Self {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for FfiError {
    fn from(e: serde_json::Error) -> Self {
        Self {
            kind: "invalid_json",
            message: e.to_string(),
        }
    }
}

impl From<anyhow::Error> for FfiError {
    fn from(e: anyhow::Error) -> Self {
        Self {
            kind: "simulation_failed",
            message: format!("{:#}", e),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TurnRequest {
    pub state: BattleState,
    pub intent: Intent,
    #[serde(default)]
    pub seed: u64,
}

fn read_input(env: &mut JNIEnv, json: &JString) -> Result<String, FfiError> {
    env.get_string(json).map(Into::into).map_err(|e| FfiError {
        kind: "jni",
        message: e.to_string(),
    })
}

#[no_mangle]
pub extern "system" fn Java_com_nutriquest_BattleFfi_version<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jstring {
    env.new_string(concat!("battle-ffi ", env!("CARGO_PKG_VERSION")))
        .map(|s| s.into_raw())
        .unwrap_or(std::ptr::null_mut())
}

/// `{chapter config}` → `{"ok":true,"result":<BattleState>}`
#[no_mangle]
pub extern "system" fn Java_com_nutriquest_BattleFfi_createBattleJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let res = read_input(&mut env, &json).and_then(|s| create_battle_internal(&s));
    respond(&env, res)
}

/// `{"state":..,"intent":"attack","seed":n}` → `{"ok":true,"result":{"state":..,"turn":..}}`
#[no_mangle]
pub extern "system" fn Java_com_nutriquest_BattleFfi_resolveTurnJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let res = read_input(&mut env, &json).and_then(|s| resolve_turn_internal(&s));
    respond(&env, res)
}

#[no_mangle]
pub extern "system" fn Java_com_nutriquest_BattleFfi_simulateBattleJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let res = read_input(&mut env, &json).and_then(|s| {
        let cfg: BattleConfig = serde_json::from_str(&s)?;
        Ok(serde_json::to_value(simulate_battle(cfg)?)?)
    });
    respond(&env, res)
}

#[no_mangle]
pub extern "system" fn Java_com_nutriquest_BattleFfi_simulateBattleManyJson(
    mut env: JNIEnv,
    _class: JClass,
    json: JString,
) -> jstring {
    let res = read_input(&mut env, &json).and_then(|s| simulate_many_internal(&s));
    respond(&env, res)
}

// Internal functions for testing without JNI overhead
pub fn create_battle_internal(input: &str) -> Result<serde_json::Value, FfiError> {
    let chapter: ChapterConfig = serde_json::from_str(input)?;
    let state = create_battle(chapter.chapter_level, &chapter.player, &chapter.boss)?;
    Ok(serde_json::to_value(state)?)
}

pub fn resolve_turn_internal(input: &str) -> Result<serde_json::Value, FfiError> {
    let req: TurnRequest = serde_json::from_str(input)?;
    req.state.validate()?;
    let mut variance = SeededVariance::for_turn(req.seed, req.state.turn_number());
    let next = resolve_turn(&req.state, req.intent, &mut variance)?;
    Ok(json!({ "turn": next.last_turn(), "state": next }))
}

pub fn simulate_many_internal(input: &str) -> Result<serde_json::Value, FfiError> {
    let mut root: serde_json::Value = serde_json::from_str(input)?;
    let samples = match root.get("samples") {
        None => 100,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| FfiError {
                kind: "invalid_json",
                message: format!("samples must be an integer in 0..={}, got {}", u32::MAX, v),
            })?,
    };
    if let Some(obj) = root.as_object_mut() {
        obj.remove("samples");
    }
    let cfg: BattleConfig = serde_json::from_value(root)?;
    Ok(serde_json::to_value(simulate_battle_many(cfg, samples)?)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER: &str = r#"{"name":"Test","chapter_level":1,
        "player":{"name":"Nutri","max_health":100,"base_attack_power":20},
        "boss":{"name":"Crumb","max_health":40,"base_attack_power":5}}"#;

    #[test]
    fn create_then_resolve_roundtrips_state() {
        let state = create_battle_internal(CHAPTER).unwrap();
        let req = json!({ "state": state, "intent": "attack", "seed": 7 });
        let out = resolve_turn_internal(&req.to_string()).unwrap();
        assert_eq!(out["state"]["turn_number"], 2);
        assert_eq!(out["turn"]["intent"], "attack");
        assert_eq!(out["turn"]["turn"], 1);
    }

    #[test]
    fn same_seed_same_turn() {
        let state = create_battle_internal(CHAPTER).unwrap();
        let req = json!({ "state": state, "intent": "attack", "seed": 99 }).to_string();
        assert_eq!(
            resolve_turn_internal(&req).unwrap(),
            resolve_turn_internal(&req).unwrap()
        );
    }

    #[test]
    fn invalid_config_is_tagged() {
        let bad = CHAPTER.replace("\"max_health\":100", "\"max_health\":0");
        let e = create_battle_internal(&bad).unwrap_err();
        assert_eq!(e.kind, "invalid_config");
    }

    #[test]
    fn locked_companion_is_tagged() {
        let state = create_battle_internal(CHAPTER).unwrap();
        let first = json!({ "state": state, "intent": "companion" }).to_string();
        let after = resolve_turn_internal(&first).unwrap();
        let second = json!({ "state": after["state"], "intent": "companion" }).to_string();
        let e = resolve_turn_internal(&second).unwrap_err();
        assert_eq!(e.kind, "action_unavailable");
    }

    #[test]
    fn garbage_json_is_rejected() {
        assert_eq!(resolve_turn_internal("{").unwrap_err().kind, "invalid_json");
    }

    #[test]
    fn tampered_state_is_rejected() {
        let mut state = create_battle_internal(CHAPTER).unwrap();
        state["player"]["max_health"] = json!(0);
        state["player"]["base_attack_power"] = json!(0);
        state["player"]["current_health"] = json!(500);
        state["turn_number"] = json!(0);
        state["chapter_level"] = json!(0);
        state["companion_cooldown_remaining"] = json!(9);
        let req = json!({ "state": state, "intent": "attack" }).to_string();
        let e = resolve_turn_internal(&req).unwrap_err();
        assert_eq!(e.kind, "invalid_config");
    }

    #[test]
    fn each_broken_invariant_is_rejected() {
        let base = create_battle_internal(CHAPTER).unwrap();
        let cases: [(&str, &str, serde_json::Value); 6] = [
            ("boss", "max_health", json!(0)),
            ("boss", "base_attack_power", json!(0)),
            ("player", "current_health", json!(101)),
            ("", "turn_number", json!(0)),
            ("", "chapter_level", json!(0)),
            ("", "companion_cooldown_remaining", json!(3)),
        ];
        for (side, field, value) in cases {
            let mut state = base.clone();
            if side.is_empty() {
                state[field] = value;
            } else {
                state[side][field] = value;
            }
            let req = json!({ "state": state, "intent": "defend" }).to_string();
            let e = resolve_turn_internal(&req).unwrap_err();
            assert_eq!(e.kind, "invalid_config", "{} {}", side, field);
            assert!(e.message.contains(field), "{}", e.message);
        }
    }

    #[test]
    fn status_must_match_health() {
        let mut state = create_battle_internal(CHAPTER).unwrap();
        state["status"] = json!("boss_defeated");
        let req = json!({ "state": state, "intent": "attack" }).to_string();
        let e = resolve_turn_internal(&req).unwrap_err();
        assert_eq!(e.kind, "invalid_config");
        assert!(e.message.contains("boss.current_health"));
    }

    #[test]
    fn oversized_samples_are_rejected() {
        let e = simulate_many_internal(r#"{"chapter_id":"sugar_rush","samples":4294967296}"#)
            .unwrap_err();
        assert_eq!(e.kind, "invalid_json");
        let e = simulate_many_internal(r#"{"chapter_id":"sugar_rush","samples":-1}"#).unwrap_err();
        assert_eq!(e.kind, "invalid_json");
    }

    #[test]
    fn simulate_many_counts_samples() {
        let out =
            simulate_many_internal(r#"{"chapter_id":"sugar_rush","seed":3,"samples":10}"#).unwrap();
        assert_eq!(out["samples"], 10);
    }
}
