use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::{Path, PathBuf};

use cronos_rs::cronos::config::SettingsLoader;
use cronos_rs::cronos::report::ComplianceReport;
use cronos_rs::cronos::request::{Admission, ExtractRequest, RequestLoader, SimulateRequest};
use cronos_rs::cronos::server;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a condition change described in a request file
    Analyze {
        /// Path to the request file (YAML or JSON)
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Rewrite a guard in a source file and print both versions
    Simulate {
        /// Python source file
        #[arg(short, long)]
        source: PathBuf,

        /// Condition text as written in the guard
        #[arg(long)]
        old: String,

        /// Replacement condition
        #[arg(long)]
        new: String,
    },
    /// List the comparisons and guards found in a source file
    Extract {
        /// Python source file
        #[arg(short, long)]
        source: PathBuf,
    },
    /// Start the HTTP API
    Serve {
        /// Overrides the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn read_source(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    let mut settings = SettingsLoader::new()
        .load(args.config.as_ref())
        .context("loading settings")?;

    match args.command {
        Commands::Analyze { file } => {
            let request = RequestLoader::new()
                .load_request(&file)
                .with_context(|| format!("loading request {}", file.display()))?;
            request.admit(&settings.limits)?;

            let report = settings.analyzer().analyze(&request)?;
            let envelope = ComplianceReport::new(report);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Commands::Simulate { source, old, new } => {
            let request = SimulateRequest {
                source_code: read_source(&source)?,
                old_condition: old,
                new_condition: new,
            };
            request.admit(&settings.limits)?;
            println!("{}", serde_json::to_string_pretty(&request.run()?)?);
        }
        Commands::Extract { source } => {
            let request = ExtractRequest {
                source_code: read_source(&source)?,
            };
            request.admit(&settings.limits)?;
            println!("{}", serde_json::to_string_pretty(&request.run()?)?);
        }
        Commands::Serve { port } => {
            if let Some(port) = port {
                settings.server.port = port;
            }
            tracing::subscriber::set_global_default(tracing_subscriber::fmt().finish())
                .context("installing tracing subscriber")?;
            log::info!("Starting server on port {}", settings.server.port);
            server::serve(settings).await?;
        }
    }

    Ok(())
}
