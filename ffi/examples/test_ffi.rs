use battle_ffi::{create_battle_internal, resolve_turn_internal};
use serde_json::json;

const CHAPTER: &str = r#"{"name":"Demo","chapter_level":1,
    "player":{"name":"Nutri","max_health":100,"base_attack_power":20},
    "boss":{"name":"Sugar Crash","max_health":60,"base_attack_power":8}}"#;

fn main() {
    let mut state = match create_battle_internal(CHAPTER) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("create failed: {} ({})", e.message, e.kind);
            return;
        }
    };
    println!("created: turn={} status={}", state["turn_number"], state["status"]);

    for intent in ["companion", "companion", "defend", "attack", "counter", "attack"] {
        let req = json!({ "state": state, "intent": intent, "seed": 2025 }).to_string();
        match resolve_turn_internal(&req) {
            Ok(out) => {
                println!(
                    "{:<9} → boss_hp={} player_hp={} status={}",
                    intent, out["turn"]["boss_health"], out["turn"]["player_health"], out["turn"]["status"]
                );
                state = out["state"].clone();
            }
            Err(e) => println!("{:<9} → rejected: {} ({})", intent, e.message, e.kind),
        }
    }
}
