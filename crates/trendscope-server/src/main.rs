use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "trendscope-server", about = "Trendscope HTTP API", version)]
struct Args {
    /// Port to listen on; overrides the port in TRENDSCOPE_BIND_ADDR.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = trendscope_core::load_app_config()?;
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    let config = Arc::new(config);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = trendscope_db::PoolConfig::from_app_config(&config);
    let pool = trendscope_db::connect_pool(&config.database_url, pool_config).await?;
    trendscope_db::run_migrations(&pool).await?;

    trendscope_server::serve(config, pool, trendscope_server::shutdown_signal()).await
}
