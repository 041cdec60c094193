pub mod cache;
pub mod cli;
pub mod clients;
pub mod config;
pub mod domain;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, SearchFilters};
pub use config::Config;
pub use state::AppState;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    init_tracing(&config);

    let Some(command) = cli.command else {
        print_help();
        return Ok(());
    };

    if let Commands::Init = command {
        let path = cli.config.unwrap_or_else(Config::default_config_path);
        return cli::cmd_init(&path);
    }

    let state = AppState::new(config)?;
    debug!(
        base_url = %state.config.api.base_url,
        data_dir = %state.config.data_dir().display(),
        "Application state ready"
    );

    match command {
        Commands::Search {
            query,
            sort,
            genre,
            min_rating,
            stats,
        } => {
            let filters = SearchFilters {
                sort,
                genre,
                min_rating,
                stats,
            };
            cli::cmd_search(&state, &query.join(" "), &filters).await
        }
        Commands::Show { id } => cli::cmd_show(&state, &id).await,
        Commands::Episodes { id, season } => cli::cmd_episodes(&state, &id, season).await,
        Commands::History { clear } => cli::cmd_history(&state, clear),
        Commands::Suggest { partial } => cli::cmd_suggest(&state, &partial),
        Commands::Interactive => cli::cmd_interactive(&state).await,
        Commands::Init => Ok(()),
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.general.log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_help() {
    println!("TVApi - TV show search");
    println!();
    println!("Usage: tvapi <command> [args]");
    println!();
    println!("Commands:");
    println!("  search <query>        Search for shows (--sort, --genre, --min-rating, --stats)");
    println!("  show <id>             Show details for a show");
    println!("  episodes <id>         List episodes (--season N)");
    println!("  history               Recent searches (--clear to forget them)");
    println!("  suggest [partial]     Suggest past searches");
    println!("  interactive           Live search from stdin");
    println!("  init                  Create default config file");
    println!();
    println!("Run 'tvapi help <command>' for details.");
}
