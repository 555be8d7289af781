/// URL for accessing the PostgreSQL database (should contain a database name in the path)
pub const DB_URL: &str = "DATABASE_URL";
/// Port the HTTP server listens on. Defaults to 5000 when absent.
pub const PORT: &str = "PORT";
/// Log level configuration for the application. For formatting info, see
/// [tracing_subscriber's EnvFilter documentation](https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html)
pub const LOG_LEVEL: &str = "LOG_LEVEL";
