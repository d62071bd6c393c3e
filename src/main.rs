use clap::Parser;
use ring_balancer::api;
use ring_balancer::config::Cli;
use ring_balancer::dispatcher::Dispatcher;
use ring_balancer::pool::NodePool;
use ring_balancer::provisioner::LocalProvisioner;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let ring_config = cli.ring_config()?;
    tracing::info!(
        "Starting balancer on {} ({} slots, {} virtual nodes per server)",
        cli.bind,
        ring_config.num_slots,
        ring_config.virtual_nodes
    );

    // 1. Node runtime:
    let provisioner = Arc::new(LocalProvisioner::new(cli.backend_host));

    // 2. Pool and dispatcher:
    let pool = NodePool::new(ring_config, provisioner, cli.call_timeout());
    let dispatcher = Dispatcher::new(pool.clone());

    // 3. Initial membership:
    let initial = cli.initial_nodes();
    if !initial.is_empty() {
        match pool.add_nodes(&initial).await {
            Ok(snapshot) => tracing::info!("Started with nodes {:?}", snapshot.nodes),
            Err(partial) => tracing::warn!("Initial nodes only partially started: {}", partial),
        }
    }

    // 4. HTTP server:
    let app = api::router(pool.clone(), dispatcher);

    tracing::info!("HTTP server listening on {}", cli.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(cli.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    tracing::info!("Shutting down, stopping all nodes");
    if let Err(partial) = pool.clear().await {
        tracing::warn!("{}", partial);
    }

    Ok(())
}
