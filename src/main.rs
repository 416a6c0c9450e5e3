use chrono::Local;
use macro_tracker::{
    export::PdfCapability, router, AppState, Config, CsvFileStore, MacroLog,
};
use std::net::SocketAddr;
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if let Some(parent) = config.data_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    // The run date is fixed at startup and does not roll over at midnight.
    let today = Local::now().date_naive();
    let log = MacroLog::open(Box::new(CsvFileStore::new(&config.data_path)), today).await?;
    info!(path = %config.data_path.display(), rows = log.entries().len(), %today, "macro log ready");

    let pdf = PdfCapability::detect(config.pdf_export);
    if !pdf.is_available() {
        warn!("PDF export unavailable; only CSV downloads will be offered");
    }

    let app = router(AppState::new(log, pdf));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
