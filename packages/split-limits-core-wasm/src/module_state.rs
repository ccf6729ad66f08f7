use lazy_static::lazy_static;
use parking_lot::Mutex;

use crate::overlay::SplitStats;

// Module state kept between calls from JavaScript
pub struct ModuleState {
    // Stats of the most recent split that ran to completion
    pub last_split: Option<SplitStats>,
    pub splits_run: usize,
}

// Create a global static instance of the module state
lazy_static! {
    static ref MODULE_STATE: Mutex<ModuleState> = Mutex::new(ModuleState::new());
}

impl ModuleState {
    pub fn new() -> Self {
        ModuleState {
            last_split: None,
            splits_run: 0,
        }
    }

    pub fn with_mut<F, R>(f: F) -> R
    where
        F: FnOnce(&mut ModuleState) -> R,
    {
        let mut guard = MODULE_STATE.lock();
        f(&mut guard)
    }

    pub fn with<F, R>(f: F) -> R
    where
        F: FnOnce(&ModuleState) -> R,
    {
        let guard = MODULE_STATE.lock();
        f(&guard)
    }

    pub fn record_split(&mut self, stats: SplitStats) {
        self.splits_run += 1;
        self.last_split = Some(stats);
    }
}

impl Default for ModuleState {
    fn default() -> Self {
        ModuleState::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_split_keeps_latest() {
        let mut state = ModuleState::new();
        assert!(state.last_split.is_none());

        state.record_split(SplitStats { fragments: 3, ..SplitStats::default() });
        state.record_split(SplitStats { fragments: 7, ..SplitStats::default() });

        assert_eq!(state.splits_run, 2);
        assert_eq!(state.last_split.as_ref().map(|s| s.fragments), Some(7));
    }

    #[test]
    fn global_state_counts_up() {
        let before = ModuleState::with(|state| state.splits_run);
        ModuleState::with_mut(|state| state.record_split(SplitStats::default()));
        let after = ModuleState::with(|state| state.splits_run);
        assert!(after > before);
    }
}
