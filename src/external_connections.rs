use sqlx::PgConnection;

/// Something which can lend out an active database connection
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Grants business logic access to external systems (currently just the database) without
/// knowing whether it's working on a pooled connection or inside a transaction.
pub trait ExternalConnectivity {
    type DbHandle<'cxn_borrow>: ConnectionHandle
    where
        Self: 'cxn_borrow;

    async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error>;
}

/// Something which can begin a database transaction. The returned handle is itself an
/// [ExternalConnectivity], so driven ports work the same way inside and outside a transaction.
pub trait Transactable {
    type Handle: TransactionHandle;

    async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error>;
}

/// An in-flight transaction. Dropping the handle without committing rolls the transaction back,
/// but callers on a failure path should call [TransactionHandle::rollback] so it happens eagerly.
pub trait TransactionHandle: ExternalConnectivity {
    async fn commit(self) -> Result<(), anyhow::Error>;
    async fn rollback(self) -> Result<(), anyhow::Error>;
}

/// Convenience bound for the HTTP layer, which needs to hand the same connectivity
/// to both read-only and transactional service operations
pub trait TransactableExternalConnectivity: ExternalConnectivity + Transactable {}

impl<T: ExternalConnectivity + Transactable> TransactableExternalConnectivity for T {}

#[cfg(test)]
pub mod test_util {
    use super::*;
    use anyhow::anyhow;
    use std::sync::{Arc, RwLock};

    /// Uninhabited connection handle. Fakes never reach a real database, so this can't be built.
    pub enum NoDatabase {}

    impl ConnectionHandle for NoDatabase {
        fn borrow_connection(&mut self) -> &mut PgConnection {
            match *self {}
        }
    }

    /// Tallies what happened to the transactions started from a [FakeExternalConnectivity]
    #[derive(Default, Debug, PartialEq, Eq, Clone)]
    pub struct TransactionLog {
        pub started: u32,
        pub committed: u32,
        pub rolled_back: u32,
    }

    /// Stand-in for the real external connectivity. In-memory driven port fakes ignore it,
    /// but it still records the transaction lifecycle so tests can verify commit/rollback.
    #[derive(Clone)]
    pub struct FakeExternalConnectivity {
        log: Arc<RwLock<TransactionLog>>,
    }

    impl FakeExternalConnectivity {
        pub fn new() -> Self {
            FakeExternalConnectivity {
                log: Arc::new(RwLock::new(TransactionLog::default())),
            }
        }

        pub fn transaction_log(&self) -> TransactionLog {
            self.log.read().expect("transaction log rwlock poisoned").clone()
        }
    }

    impl ExternalConnectivity for FakeExternalConnectivity {
        type DbHandle<'cxn_borrow> = NoDatabase;

        async fn database_cxn(&mut self) -> Result<Self::DbHandle<'_>, anyhow::Error> {
            Err(anyhow!("fake connectivity has no database to connect to"))
        }
    }

    impl Transactable for FakeExternalConnectivity {
        type Handle = FakeExternalConnectivity;

        async fn start_transaction(&self) -> Result<Self::Handle, anyhow::Error> {
            self.log.write().expect("transaction log rwlock poisoned").started += 1;

            Ok(FakeExternalConnectivity {
                log: Arc::clone(&self.log),
            })
        }
    }

    impl TransactionHandle for FakeExternalConnectivity {
        async fn commit(self) -> Result<(), anyhow::Error> {
            self.log.write().expect("transaction log rwlock poisoned").committed += 1;
            Ok(())
        }

        async fn rollback(self) -> Result<(), anyhow::Error> {
            self.log.write().expect("transaction log rwlock poisoned").rolled_back += 1;
            Ok(())
        }
    }
}
