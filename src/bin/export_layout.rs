use clap::Parser;
use layout_export::utils::{logger, validation::Validate};
use layout_export::{ExportEngine, Layout, ReactTailwindPipeline, TomlConfig};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "export-layout")]
#[command(about = "Export a saved layout document to a React + Tailwind project ZIP")]
struct Args {
    /// Layout JSON: an export request object or a bare array of elements
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long, default_value = "react-tailwind-project.zip")]
    output: PathBuf,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let config = match &args.config {
        Some(path) => TomlConfig::from_file(path),
        None => Ok(TomlConfig::default()),
    }
    .and_then(|config| config.validate().map(|_| config));

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    let document = std::fs::read(&args.input)?;
    let layout = match Layout::from_json_document(&document) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("❌ {} is not a layout document: {}", args.input.display(), e);
            std::process::exit(1);
        }
    };

    println!("📦 Exporting {} elements to {}", layout.len(), args.output.display());

    let pipeline = ReactTailwindPipeline::new(config.export.clone());
    let engine = ExportEngine::new(pipeline).with_archive_options(config.archive_options());
    let sink = BufWriter::new(File::create(&args.output)?);

    match engine.export_to(&layout, sink).await {
        Ok(writer) => {
            writer.into_inner().map_err(|e| e.into_error())?.sync_all()?;
            println!("✅ Wrote {}", args.output.display());
            Ok(())
        }
        Err(e) => {
            let _ = std::fs::remove_file(&args.output);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    }
}
