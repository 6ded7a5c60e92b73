//! Unit of work port — atomic application of a change set.

use std::future::Future;

use freight_terminal_domain::changeset::ChangeSet;
use freight_terminal_domain::error::TerminalError;

/// Applies every change of a [`ChangeSet`] or none of them.
pub trait UnitOfWork {
    /// Commit `changes` in order inside a single transaction.
    ///
    /// An update or delete targeting a row that does not exist aborts the
    /// whole set with [`TerminalError::NotFound`].
    fn commit(&self, changes: ChangeSet) -> impl Future<Output = Result<(), TerminalError>> + Send;
}
