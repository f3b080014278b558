//! Point d'entrée CLI pour envdiag

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// Charger .env au démarrage
fn load_env() {
    // Chercher .env dans le répertoire courant ou parent
    if dotenvy::dotenv().is_err() {
        // Essayer depuis le répertoire du binaire
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                let _ = dotenvy::from_path(dir.join(".env"));
            }
        }
    }
}

mod cli;

use cli::Commands;

/// Diagnostic environnemental d'une aire d'étude via WFS 2.0
#[derive(Parser)]
#[command(name = "envdiag")]
#[command(author, version)]
#[command(about = "Croiser une aire d'étude avec des couches environnementales WFS")]
#[command(long_about = "Interroge un service WFS 2.0 (GetFeature + filtre FES Intersects) pour chaque couche configurée et exporte les valeurs intersectées par couche.\n\nL'URL du service vient de --wfs-url, de la variable WFS_URL ou du fichier --services.")]
struct Cli {
    /// Augmenter la verbosité (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Mode silencieux
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // Charger .env avant tout
    load_env();

    let cli = Cli::parse();

    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Run(args) => {
            info!(
                study_area = %args.study_area.display(),
                layers = %args.layers.display(),
                "Diagnostic environnemental"
            );
            cli::cmd_run(&args)?;
        }
        Commands::Request(args) => {
            info!(layer = %args.layer, "Corps de requête GetFeature");
            cli::cmd_request(&args)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::WARN,
        (_, 0) => Level::INFO,
        (_, 1) => Level::DEBUG,
        (_, _) => Level::TRACE,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout reste réservé au corps de requête et au rapport
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();
}
