//! qpr - contribute question papers to a shared GitHub repository
//!
//! CLI binary over the `qpr_contrib` library.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "qpr")]
#[command(about = "Contribute files to the question paper repository")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to <config dir>/qpr/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload files into folders and open a pull request
    Contribute {
        /// FOLDER=FILE[::NAME][,FILE[::NAME]...], e.g. Physics/PHY403/2025=endsem.pdf
        #[arg(short, long = "group", value_name = "SPEC", required = true)]
        groups: Vec<String>,

        /// Pull request title
        #[arg(short, long)]
        title: Option<String>,

        /// Pull request description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Write directly to the upstream repository (institutional email)
        #[arg(long)]
        direct: bool,

        /// Institutional email address (with --direct)
        #[arg(long, requires = "direct")]
        email: Option<String>,

        /// Display name for attribution (with --direct)
        #[arg(long, requires = "direct")]
        name: Option<String>,

        /// Show the planned batches without uploading anything
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup {
        /// OAuth app client id, to print a browser authorization link
        #[arg(long, requires = "redirect_uri")]
        client_id: Option<String>,

        /// OAuth redirect URI registered for the app
        #[arg(long)]
        redirect_uri: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Contribute {
            groups,
            title,
            description,
            direct,
            email,
            name,
            dry_run,
            yes,
        } => {
            let groups = groups
                .iter()
                .map(|raw| cli::parse_group_spec(raw))
                .collect::<Result<Vec<_>, _>>()?;
            let options = cli::ContributeOptions {
                groups,
                title: title.unwrap_or_default(),
                description,
                direct,
                email,
                name,
                dry_run,
                yes,
            };
            cli::run_contribute(config, options).await?;
        }
        Commands::Auth { action } => match action {
            AuthAction::Test => cli::run_auth_test(config).await?,
            AuthAction::Setup {
                client_id,
                redirect_uri,
            } => cli::run_auth_setup(client_id.as_deref(), redirect_uri.as_deref())?,
        },
    }

    Ok(())
}
