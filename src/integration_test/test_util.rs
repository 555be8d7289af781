use crate::{app_env, db};
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{thread_rng, Rng};
use sqlx::{Connection, PgConnection, PgPool};
use std::{env, future::Future};
use tokio::runtime::Runtime;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

struct TestDatabase {
    base_url: String,
    db_name: String,
}

impl TestDatabase {
    /// Provisions a randomly named database on the PostgreSQL server at [base_url]
    async fn create(base_url: &str) -> Result<Self, sqlx::Error> {
        let mut rng = thread_rng();
        let schema_id: u32 = rng.gen_range(10_000..99_999);
        let db_name = format!("test_db_{}", schema_id);

        let mut conn = PgConnection::connect(base_url).await?;
        sqlx::query(format!("CREATE DATABASE {}", db_name).as_str())
            .execute(&mut conn)
            .await?;
        let _ = conn.close().await;

        Ok(Self {
            base_url: String::from(base_url),
            db_name,
        })
    }

    fn db_name(&self) -> &str {
        self.db_name.as_str()
    }

    /// Removes the provisioned database once the test is done with it. The test's
    /// connection pool must be closed before calling this.
    async fn drop_database(self) {
        let conn = PgConnection::connect(self.base_url.as_str()).await;
        let mut conn = match conn {
            Ok(cxn) => cxn,
            Err(conn_err) => {
                println!(
                    "Failed to reconnect to drop test database {}, please remove it manually. Error: {}",
                    self.db_name, conn_err
                );
                return;
            }
        };

        let drop_result = sqlx::query(format!("DROP DATABASE {} WITH (FORCE)", self.db_name).as_str())
            .execute(&mut conn)
            .await;
        if let Err(db_err) = drop_result {
            println!(
                "Failed to drop test database {}, please remove it manually. Error: {}",
                self.db_name, db_err
            );
        }
    }
}

/// Creates a temp database for a test, applies this application's migrations to it,
/// and hands the test a pool connected to it. The database is dropped once the
/// test completes.
///
/// Expects that the TEST_DB_URL environment variable is populated
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let pg_connection_base_url = env::var(app_env::test::TEST_DB_URL)
            .expect("You must provide the TEST_DB_URL environment variable as the base postgres connection string");
        let test_db = match TestDatabase::create(&pg_connection_base_url).await {
            Ok(tdb) => tdb,
            Err(db_err) => panic!("Failed to start test database: {}", db_err),
        };

        let sqlx_pool = db::connect_sqlx(
            format!("{}/{}", pg_connection_base_url, test_db.db_name()).as_str(),
        )
        .await;
        db::run_migrations(&sqlx_pool)
            .await
            .expect("Failed to apply migrations to the test database");

        test_fn(sqlx_pool.clone()).await;

        sqlx_pool.close().await;
        test_db.drop_database().await;
    });
}
