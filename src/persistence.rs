pub mod db_todo_driven_ports;
pub mod db_user_driven_ports;

use crate::external_connections;
use crate::external_connections::ConnectionHandle;
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::{PgConnection, PgPool, Postgres};

/// Data structure which owns clients for connecting to external systems.
/// Acquired once at startup and handed down to route handlers so the
/// persistence handle is passed explicitly rather than living in a global.
#[derive(Clone)]
pub struct ExternalConnectivity {
    db: PgPool,
}

impl ExternalConnectivity {
    /// Accepts the database pool used to connect to PostgreSQL and constructs
    /// an instance of ExternalConnectivity owning it
    pub fn new(db: PgPool) -> Self {
        ExternalConnectivity { db }
    }
}

/// A handle from ExternalConnectivity which can connect to a database
pub struct PoolConnectionHandle {
    active_connection: PoolConnection<Postgres>,
}

impl ConnectionHandle for PoolConnectionHandle {
    fn borrow_connection(&mut self) -> &mut PgConnection {
        &mut self.active_connection
    }
}

#[async_trait]
impl external_connections::ExternalConnectivity for ExternalConnectivity {
    type DbHandle<'cxn_borrow>
        = PoolConnectionHandle
    where
        Self: 'cxn_borrow;

    async fn database_cxn<'borrow>(
        &'borrow mut self,
    ) -> Result<Self::DbHandle<'borrow>, anyhow::Error> {
        let handle = PoolConnectionHandle {
            active_connection: self.db.acquire().await?,
        };

        Ok(handle)
    }
}
