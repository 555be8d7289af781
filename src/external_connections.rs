use async_trait::async_trait;
use sqlx::PgConnection;

/// A borrowed handle to an active database connection
pub trait ConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection;
}

/// Owns clients for connecting to external systems. Allows business logic to be
/// agnostic of the external systems it communicates with so driven adapters can
/// easily be swapped out for other implementations
#[async_trait]
pub trait ExternalConnectivity: Send + Sync {
    type DbHandle<'cxn_borrow>: ConnectionHandle + Send
    where
        Self: 'cxn_borrow;

    async fn database_cxn<'borrow>(
        &'borrow mut self,
    ) -> Result<Self::DbHandle<'borrow>, anyhow::Error>;
}
