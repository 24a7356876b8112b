use anyhow::Context as _;
use tracing::info;

use shop_core::config::{cache_from_env, connect_database, load_dotenv};
use shop_core::health::serve_probes;
use shop_core::middleware::{propagate_request_id_layer, request_id_layer};
use shop_core::tracing::init_tracing;
use shop_proto::order::order_command_service_server::OrderCommandServiceServer;
use shop_proto::order::order_item_command_service_server::OrderItemCommandServiceServer;
use shop_proto::order::order_item_query_service_server::OrderItemQueryServiceServer;
use shop_proto::order::order_query_service_server::OrderQueryServiceServer;

use shop_order::config::OrderConfig;
use shop_order::grpc_server::OrderGrpcServer;
use shop_order::infra::grpc::{GrpcProductClient, GrpcUserClient};
use shop_order::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let config = OrderConfig::from_env()?;

    let db = connect_database(&config.database_url).await?;
    let cache = cache_from_env("order")?;

    let state = AppState {
        db: db.clone(),
        cache,
        users: GrpcUserClient::connect_lazy(config.user_addr.clone())?,
        products: GrpcProductClient::connect_lazy(config.product_addr.clone())?,
    };

    // Health probes
    let http_port = config.ports.http;
    tokio::spawn(async move {
        if let Err(e) = serve_probes(http_port, db).await {
            tracing::error!(error = %e, "health probe server stopped");
        }
    });

    // gRPC server
    let server = OrderGrpcServer { state };
    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.ports.grpc)
        .parse()
        .context("invalid gRPC address")?;
    info!("order gRPC server listening on {addr}");
    tonic::transport::Server::builder()
        .layer(request_id_layer())
        .layer(propagate_request_id_layer())
        .add_service(OrderQueryServiceServer::new(server.clone()))
        .add_service(OrderCommandServiceServer::new(server.clone()))
        .add_service(OrderItemQueryServiceServer::new(server.clone()))
        .add_service(OrderItemCommandServiceServer::new(server))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down order service");
        })
        .await
        .context("gRPC server error")?;

    Ok(())
}
