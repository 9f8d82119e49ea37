use crate::combatant::CombatantConfig;
use crate::content::ChapterConfig;
use crate::error::BattleError;
use crate::resolve::{create_battle, resolve};
use crate::state::{BattleState, BattleStatus, Intent, TurnResult};
use crate::VarianceSource;

/// A battle session: the current state plus the variance stream that drives it.
pub struct Battle<V> {
    state: BattleState,
    variance: V,
}

impl<V: VarianceSource> Battle<V> {
    pub fn new(
        chapter_level: u32,
        player: &CombatantConfig,
        boss: &CombatantConfig,
        variance: V,
    ) -> Result<Self, BattleError> {
        let state = create_battle(chapter_level, player, boss)?;
        Ok(Self { state, variance })
    }

    pub fn from_chapter(chapter: &ChapterConfig, variance: V) -> Result<Self, BattleError> {
        Self::new(chapter.chapter_level, &chapter.player, &chapter.boss, variance)
    }

    /// Resume a session from a previously saved state.
    pub fn resume(state: BattleState, variance: V) -> Result<Self, BattleError> {
        state.validate()?;
        Ok(Self { state, variance })
    }

    /// Resolve one turn. On error the session keeps its previous state.
    pub fn submit(&mut self, intent: Intent) -> Result<TurnResult, BattleError> {
        let (next, turn) = resolve(&self.state, intent, &mut self.variance)?;
        self.state = next;
        Ok(turn)
    }

    pub fn state(&self) -> &BattleState {
        &self.state
    }

    pub fn status(&self) -> BattleStatus {
        self.state.status()
    }

    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    pub fn companion_ready(&self) -> bool {
        self.state.companion_ready()
    }

    pub fn available_intents(&self) -> Vec<Intent> {
        self.state.available_intents()
    }

    pub fn into_state(self) -> BattleState {
        self.state
    }
}
