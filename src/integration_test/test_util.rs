use crate::app_env::AppConfig;
use crate::{SharedData, api, app_env, db, persistence};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use serde::de::DeserializeOwned;
use sqlx::{Connection, PgConnection, PgPool};
use std::env;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tower::ServiceExt;

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
    async fn create(base_url: &str) -> Result<Self, sqlx::Error> {
        let db_id: u32 = thread_rng().gen_range(10_000..99_999);
        let db_name = format!("test_db_{db_id}");
        let mut conn = PgConnection::connect(base_url).await?;

        sqlx::query(&format!("CREATE DATABASE {db_name}"))
            .execute(&mut conn)
            .await?;
        conn.close().await?;

        Ok(Self {
            base_url: base_url.to_owned(),
            db_name,
        })
    }

    fn url(&self) -> String {
        format!("{}/{}", self.base_url, self.db_name)
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let base_url = self.base_url.clone();
        let db_name = self.db_name.clone();

        let result = TOKIO_RT.block_on(async move {
            let mut conn = PgConnection::connect(&base_url).await?;
            sqlx::query(&format!("DROP DATABASE IF EXISTS {db_name} WITH (FORCE)"))
                .execute(&mut conn)
                .await?;
            conn.close().await
        });

        if let Err(error) = result {
            println!(
                "Warning: failed to drop test database {}, you may need to do it manually. Error: {error}",
                self.db_name
            );
        }
    }
}

fn test_db_base_url() -> String {
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    env::var(app_env::test::TEST_DB_URL).expect(
        "You must provide the TEST_DB_URL environment variable as the base postgres connection string",
    )
}

/// Creates a throwaway database with the service schema and runs [test_fn] against it. The
/// database is dropped afterwards, including when [test_fn] panics.
///
/// Expects that the TEST_DB_URL environment variable is populated
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    let pg_connection_base_url = test_db_base_url();
    // Created outside the test's block_on so unwinding drops it with no runtime entered
    let test_db = TOKIO_RT
        .block_on(TestDatabase::create(&pg_connection_base_url))
        .unwrap_or_else(|db_err| panic!("Failed to start test database: {db_err}"));

    TOKIO_RT.block_on(async {
        let sqlx_pool = db::connect_sqlx(&test_db.url(), 5)
            .await
            .expect("could not connect to the test database");
        db::ensure_schema(&sqlx_pool)
            .await
            .expect("could not create the schema in the test database");

        test_fn(sqlx_pool.clone()).await;

        sqlx_pool.close().await;
    });
}

/// Builds the application router on top of [pool] with default configuration
pub fn app(pool: PgPool) -> Router {
    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(pool),
    });

    api::build_router(&AppConfig::default(), shared_data)
}

/// Sends a request with an optional JSON body through the router
pub async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request should build");

    router
        .clone()
        .oneshot(request)
        .await
        .expect("router should always produce a response")
}

/// Sends a request, checks the status, and parses the JSON response body
pub async fn send_expecting<T: DeserializeOwned>(
    router: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
    expected_status: StatusCode,
) -> T {
    let response = send(router, method, uri, body).await;
    assert_eq!(expected_status, response.status(), "unexpected status from {uri}");

    crate::api::test_util::deserialize_body(response.into_body()).await
}

mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::Mutex;

    #[test]
    #[cfg_attr(not(feature = "integration_test"), ignore)]
    fn database_is_dropped_after_a_failing_test() {
        let recorded_name = Arc::new(Mutex::new(None::<String>));
        let name_from_test = Arc::clone(&recorded_name);

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            prepare_db_and_test(|db| async move {
                let name: String = sqlx::query_scalar("SELECT current_database()")
                    .fetch_one(&db)
                    .await
                    .expect("current database should be readable");
                *name_from_test.lock().expect("name mutex poisoned") = Some(name.clone());

                assert!(name.is_empty(), "failing once the database exists");
            });
        }));
        assert!(outcome.is_err());

        let db_name = recorded_name
            .lock()
            .expect("name mutex poisoned")
            .clone()
            .expect("test body should have recorded its database");
        let remaining: i64 = TOKIO_RT.block_on(async {
            let mut conn = PgConnection::connect(&test_db_base_url())
                .await
                .expect("could not connect to the test server");
            sqlx::query_scalar("SELECT count(*) FROM pg_catalog.pg_database WHERE datname = $1")
                .bind(&db_name)
                .fetch_one(&mut conn)
                .await
                .expect("database listing should succeed")
        });

        assert_eq!(0, remaining);
    }
}
