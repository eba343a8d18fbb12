//! `opencrm`: command-line client for the OpenCRM admin console.
//!
//! Drives the same session, permission and data services the console
//! views use, against a live backend.

mod app;
mod commands;

use clap::{Parser, Subcommand};

/// OpenCRM console client.
#[derive(Parser, Debug)]
#[command(name = "opencrm", about = "OpenCRM console client")]
struct Cli {
    /// Path to the session file (default: ~/.opencrm/session.toml).
    #[arg(long = "session-file", global = true)]
    session_file: Option<String>,

    /// Output format: table or json.
    #[arg(long = "output", short = 'o', global = true, default_value = "table")]
    output: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Login with email and password.
    Login {
        /// Account email.
        #[arg(long)]
        email: Option<String>,
        /// Password (not recommended, use the interactive prompt).
        #[arg(long)]
        password: Option<String>,
    },

    /// Logout and clear the stored session.
    Logout,

    /// Show the current session, verified against the server.
    Status,

    /// List a resource (leads, users, roles, ...).
    Get {
        /// Resource type.
        resource: String,
        /// Page number.
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Rows per page.
        #[arg(long = "per-page", default_value_t = 10)]
        per_page: u64,
        /// Search term.
        #[arg(long)]
        search: Option<String>,
    },

    /// Resolve selectable filter options for a reference domain.
    Options {
        /// Domain (brands, units, merchants, teams, users, roles,
        /// permissions, leads).
        domain: String,
        /// Search term.
        #[arg(long)]
        search: Option<String>,
    },

    /// Print the menu composed for the current session.
    Menu {
        /// Current navigation path.
        #[arg(default_value = "/")]
        path: String,
    },

    /// Show version.
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let json_output = cli.output == "json";
    let session_file = cli.session_file.map(std::path::PathBuf::from);
    let app = app::App::bootstrap(session_file)?;

    match cli.command {
        Commands::Login { email, password } => {
            let email = match email {
                Some(e) => e,
                None => prompt_line("Email: ")?,
            };
            let password = match password {
                Some(p) => p,
                None => rpassword::prompt_password("Password: ")?,
            };
            commands::login::login(&app, &email, &password).await?;
        }

        Commands::Logout => {
            commands::login::logout(&app).await?;
        }

        Commands::Status => {
            commands::status::status(&app, json_output).await?;
        }

        Commands::Get {
            resource,
            page,
            per_page,
            search,
        } => {
            commands::resource::get(&app, &resource, page, per_page, search.as_deref(), json_output)
                .await?;
        }

        Commands::Options { domain, search } => {
            commands::options::options(&app, &domain, search.as_deref(), json_output).await?;
        }

        Commands::Menu { path } => {
            commands::menu::menu(&app, &path, json_output)?;
        }

        Commands::Version => {
            println!("opencrm {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

fn prompt_line(prompt: &str) -> anyhow::Result<String> {
    use std::io::Write;
    eprint!("{prompt}");
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
