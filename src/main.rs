use clap::Parser;
use layout_export::adapters::http::{self, HttpSettings};
use layout_export::config::LogFormat;
use layout_export::utils::{logger, validation::Validate};
use layout_export::{CliConfig, ExportEngine, ReactTailwindPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    let config = match cli.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    match config.logging.format {
        LogFormat::Compact => logger::init_cli_logger(config.logging.verbose),
        LogFormat::Json => logger::init_json_logger(config.logging.verbose),
    }

    tracing::info!("Starting layout-export server");
    tracing::debug!("Config: {:?}", config);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let pipeline = ReactTailwindPipeline::new(config.export.clone());
    let engine = ExportEngine::new(pipeline).with_archive_options(config.archive_options());
    let app = http::router(engine, &HttpSettings::from_config(&config))?;

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Listening on http://{}", addr);
    tracing::info!("🔓 Accepting cross-origin requests from {}", config.cors.allowed_origin);

    http::serve(listener, app, shutdown_signal()).await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
