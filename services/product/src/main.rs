use anyhow::Context as _;
use tracing::info;

use shop_core::config::{cache_from_env, connect_database, load_dotenv};
use shop_core::health::serve_probes;
use shop_core::middleware::{propagate_request_id_layer, request_id_layer};
use shop_core::tracing::init_tracing;
use shop_proto::product::product_command_service_server::ProductCommandServiceServer;
use shop_proto::product::product_query_service_server::ProductQueryServiceServer;

use shop_product::config::ProductConfig;
use shop_product::grpc_server::ProductGrpcServer;
use shop_product::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let config = ProductConfig::from_env()?;

    let db = connect_database(&config.database_url).await?;
    let cache = cache_from_env("product")?;

    let state = AppState {
        db: db.clone(),
        cache,
    };

    // Health probes
    let http_port = config.ports.http;
    tokio::spawn(async move {
        if let Err(e) = serve_probes(http_port, db).await {
            tracing::error!(error = %e, "health probe server stopped");
        }
    });

    // gRPC server
    let server = ProductGrpcServer { state };
    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.ports.grpc)
        .parse()
        .context("invalid gRPC address")?;
    info!("product gRPC server listening on {addr}");
    tonic::transport::Server::builder()
        .layer(request_id_layer())
        .layer(propagate_request_id_layer())
        .add_service(ProductQueryServiceServer::new(server.clone()))
        .add_service(ProductCommandServiceServer::new(server))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down product service");
        })
        .await
        .context("gRPC server error")?;

    Ok(())
}
