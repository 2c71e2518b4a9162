//! City list screen phase (load/delete).
//!
//! Only one operation runs per screen at a time. Used by the city screen controller.

/// Phase of one screen visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenPhase {
    #[default]
    Idle,
    Loading,
    DeleteConfirming,
}

impl ScreenPhase {
    /// True if a sync (focus refresh, add) can be started.
    pub fn can_start_sync(self) -> bool {
        matches!(self, ScreenPhase::Idle)
    }

    /// True if a delete confirmation can be opened.
    pub fn can_start_delete(self) -> bool {
        matches!(self, ScreenPhase::Idle)
    }

    /// Phase after the confirmation dialog is shown.
    pub fn on_delete_requested(self) -> Self {
        ScreenPhase::DeleteConfirming
    }

    /// Phase after the user confirms or any load begins.
    pub fn on_loading(self) -> Self {
        ScreenPhase::Loading
    }

    /// Phase after the dialog is dismissed.
    pub fn on_delete_cancelled(self) -> Self {
        ScreenPhase::Idle
    }

    /// Phase after a load finishes, successfully or not.
    pub fn on_loaded(self) -> Self {
        ScreenPhase::Idle
    }
}
