use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod api;
pub mod battle;
pub mod combatant;
pub mod content;
pub mod error;
pub mod resolve;
pub mod state;

pub use battle::Battle;
pub use combatant::{Combatant, CombatantConfig};
pub use content::ChapterConfig;
pub use error::BattleError;
pub use resolve::{create_battle, resolve_turn, COMPANION_COOLDOWN_TURNS};
pub use state::{BattleState, BattleStatus, Intent, ParseIntentError, TurnResult};

pub const VARIANCE_MIN: f64 = 0.85;
pub const VARIANCE_MAX: f64 = 1.15;

/// Source of the damage multiplier rolled for each attack.
///
/// Values outside `[VARIANCE_MIN, VARIANCE_MAX]` are clamped by the engine,
/// so a source only has to be "roughly right" to be safe.
pub trait VarianceSource {
    fn variance(&mut self) -> f64;
}

/// Seedable ChaCha8 stream, uniform over the variance range.
pub struct SeededVariance { rng: ChaCha8Rng }

impl SeededVariance {
    pub fn from_seed(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Stream for a single turn of a battle, for callers that keep no RNG between turns.
    pub fn for_turn(seed: u64, turn: u32) -> Self {
        // golden-ratio stride keeps neighbouring turns from sharing a seed
        Self::from_seed(seed ^ u64::from(turn).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }
}

impl VarianceSource for SeededVariance {
    fn variance(&mut self) -> f64 {
        self.rng.gen_range(VARIANCE_MIN..=VARIANCE_MAX)
    }
}

/// Constant multiplier; `FixedVariance(1.0)` makes every turn fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedVariance(pub f64);

impl VarianceSource for FixedVariance {
    fn variance(&mut self) -> f64 {
        self.0
    }
}

impl<V: VarianceSource + ?Sized> VarianceSource for Box<V> {
    fn variance(&mut self) -> f64 {
        (**self).variance()
    }
}

/// Clamp a raw multiplier into range and express it in per-mille (850..=1150).
pub fn variance_permille(raw: f64) -> u32 {
    let v = if raw.is_nan() { 1.0 } else { raw.clamp(VARIANCE_MIN, VARIANCE_MAX) };
    (v * 1000.0).round() as u32
}
