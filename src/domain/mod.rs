use crate::external_connections::TransactionHandle;
use tracing::error;

pub mod todo;
pub mod user;

#[cfg(test)]
pub(crate) mod test_util;

/// Tracks whether an update request touched a field. Absent fields are left alone, which
/// is different from a field being explicitly set to a "falsy" value like `false` or `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    Unchanged,
    Set(T),
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        Self::Unchanged
    }
}

impl<T: Clone> FieldUpdate<T> {
    /// Overwrites [field] if this update carries a new value
    pub fn apply_to(&self, field: &mut T) {
        if let Self::Set(new_value) = self {
            *field = new_value.clone();
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(new_value) => Self::Set(new_value),
            None => Self::Unchanged,
        }
    }
}

/// Rolls back a transaction on a failure path. A failed rollback is only logged, since the
/// caller is already returning the error that caused it and the connection rolls back on drop anyway.
pub(crate) async fn roll_back(txn: impl TransactionHandle, action: &str) {
    if let Err(rollback_err) = txn.rollback().await {
        error!("Could not roll back transaction while {action}: {rollback_err:#}");
    }
}
