//! UI collaborators the city screen talks to.

/// Yes/no confirmation dialog.
///
/// Called synchronously from the async screen flows. Implementations that
/// wait on user input must not block the runtime worker; wrap the wait in
/// `tokio::task::block_in_place` or answer from state gathered beforehand.
pub trait Confirmer: Send + Sync {
    /// Returns true if the user accepted.
    fn confirm(&self, title: &str, message: &str) -> bool;
}

/// Transient notification (toast).
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}
