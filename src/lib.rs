pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod schema;
pub mod state;

pub use app::app;
pub use state::AppState;

/// Install the global tracing subscriber writing to stdout; `RUST_LOG`
/// overrides the default filter
pub fn init_tracing() {
    init_tracing_with_writer(std::io::stdout);
}

/// Same as [`init_tracing`] with a custom writer. The CLI logs to stderr so
/// stdout carries only command output.
pub fn init_tracing_with_writer<W>(writer: W)
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).init();
}
