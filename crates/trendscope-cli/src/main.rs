mod collect;
mod dashboard;
mod query;

use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use trendscope_core::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "trendscope")]
#[command(about = "Social media trend collector, analytics API, and terminal dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the API and open the dashboard against it
    Run {
        /// Port for the API; overrides the port in TRENDSCOPE_BIND_ADDR
        #[arg(long)]
        port: Option<u16>,

        /// Seconds between dashboard refreshes
        #[arg(long, default_value_t = 30)]
        refresh_secs: u64,

        /// Where to write logs while the dashboard owns the terminal
        #[arg(long, default_value = "trendscope.log")]
        log_file: PathBuf,
    },
    /// Run collectors and store their records
    Collect {
        /// Restrict collection to one platform (youtube or instagram)
        #[arg(long)]
        platform: Option<String>,
    },
    /// List stored records, newest first
    Records {
        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(long)]
        limit: Option<String>,
    },
    /// Print the analytics summary for stored records
    Summary {
        #[command(flatten)]
        scope: ScopeArgs,

        #[arg(long)]
        top_n: Option<String>,
    },
    /// Open the dashboard against a running API
    Dashboard {
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        api_url: String,

        /// Seconds between refreshes
        #[arg(long, default_value_t = 30)]
        refresh_secs: u64,

        /// Print one plain-text snapshot and exit
        #[arg(long)]
        once: bool,

        #[arg(long, default_value = "trendscope.log")]
        log_file: PathBuf,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check that the database answers a trivial query
    Ping,
}

/// Platform and date-range filters shared by the read commands.
#[derive(Debug, Default, Args)]
struct ScopeArgs {
    /// youtube or instagram
    #[arg(long)]
    platform: Option<String>,

    /// Inclusive lower bound, RFC 3339 or YYYY-MM-DD
    #[arg(long)]
    since: Option<String>,

    /// Inclusive upper bound, RFC 3339 or YYYY-MM-DD
    #[arg(long)]
    until: Option<String>,
}

impl ScopeArgs {
    fn into_raw(
        self,
        top_n: Option<String>,
        limit: Option<String>,
    ) -> trendscope_core::RawAnalyticsQuery {
        trendscope_core::RawAnalyticsQuery {
            platform: self.platform,
            since: self.since,
            until: self.until,
            top_n,
            limit,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("trendscope: no command given; run `trendscope --help` for usage");
        return Ok(());
    };

    let config = trendscope_core::load_app_config()?;

    match command {
        Commands::Run {
            port,
            refresh_secs,
            log_file,
        } => {
            let config = match port {
                Some(port) => config.with_port(port),
                None => config,
            };
            init_tracing(&config, Some(log_file.as_path()))?;
            run_all(Arc::new(config), refresh_secs).await
        }
        Commands::Collect { platform } => {
            init_tracing(&config, None)?;
            let pool = connect(&config).await?;
            collect::run_collect(&pool, &config, platform.as_deref()).await
        }
        Commands::Records { scope, limit } => {
            init_tracing(&config, None)?;
            let pool = connect(&config).await?;
            query::run_records(&pool, &scope.into_raw(None, limit)).await
        }
        Commands::Summary { scope, top_n } => {
            init_tracing(&config, None)?;
            let pool = connect(&config).await?;
            query::run_summary(&pool, &scope.into_raw(top_n, None)).await
        }
        Commands::Dashboard {
            api_url,
            refresh_secs,
            once,
            log_file,
        } => {
            if once {
                init_tracing(&config, None)?;
                dashboard::print_snapshot(&api_url).await
            } else {
                init_tracing(&config, Some(log_file.as_path()))?;
                dashboard::run_dashboard(&api_url, refresh_secs).await
            }
        }
        Commands::Db { command } => {
            init_tracing(&config, None)?;
            let pool = trendscope_db::connect_pool(
                &config.database_url,
                trendscope_db::PoolConfig::from_app_config(&config),
            )
            .await?;
            match command {
                DbCommands::Migrate => {
                    let applied = trendscope_db::run_migrations(&pool).await?;
                    println!("migrations complete: {applied} applied");
                }
                DbCommands::Ping => {
                    trendscope_db::ping(&pool).await?;
                    println!("database reachable: {}", config.database_url);
                }
            }
            Ok(())
        }
    }
}

/// Logs go to stderr, or to `log_file` when the dashboard owns the terminal.
fn init_tracing(config: &AppConfig, log_file: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Opens the configured database and applies pending migrations.
async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::SqlitePool> {
    let pool_config = trendscope_db::PoolConfig::from_app_config(config);
    let pool = trendscope_db::connect_pool(&config.database_url, pool_config).await?;
    trendscope_db::run_migrations(&pool).await?;
    Ok(pool)
}

/// Serves the API in the background and runs the dashboard in the foreground.
/// Quitting the dashboard shuts the API down.
async fn run_all(config: Arc<AppConfig>, refresh_secs: u64) -> anyhow::Result<()> {
    let pool = connect(&config).await?;

    // Bound before the dashboard's first fetch so it never races the server.
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    let mut api_addr = listener.local_addr()?;
    if api_addr.ip().is_unspecified() {
        api_addr.set_ip(Ipv4Addr::LOCALHOST.into());
    }
    let api_url = format!("http://{api_addr}");

    let app = trendscope_server::build_app(trendscope_server::AppState::new(pool, config));
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(trendscope_server::serve_on(listener, app, async move {
        let _ = stop_rx.await;
    }));

    let dashboard = dashboard::run_dashboard(&api_url, refresh_secs).await;

    let _ = stop_tx.send(());
    server.await??;
    dashboard
}

#[cfg(test)]
mod tests;
