use anyhow::Context as _;
use tracing::info;

use shop_core::config::{cache_from_env, connect_database, load_dotenv};
use shop_core::health::serve_probes;
use shop_core::middleware::{propagate_request_id_layer, request_id_layer};
use shop_core::tracing::init_tracing;
use shop_proto::user::user_command_service_server::UserCommandServiceServer;
use shop_proto::user::user_query_service_server::UserQueryServiceServer;

use shop_user::config::UserConfig;
use shop_user::grpc_server::UserGrpcServer;
use shop_user::infra::grpc::GrpcRoleClient;
use shop_user::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let config = UserConfig::from_env()?;

    let db = connect_database(&config.database_url).await?;
    let cache = cache_from_env("user")?;
    let roles = GrpcRoleClient::connect_lazy(config.role_addr.clone())?;

    let state = AppState {
        db: db.clone(),
        cache,
        roles,
        default_role: config.default_role.clone(),
    };

    // Health probes
    let http_port = config.ports.http;
    tokio::spawn(async move {
        if let Err(e) = serve_probes(http_port, db).await {
            tracing::error!(error = %e, "health probe server stopped");
        }
    });

    // gRPC server
    let server = UserGrpcServer { state };
    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.ports.grpc)
        .parse()
        .context("invalid gRPC address")?;
    info!(default_role = %config.default_role, "user gRPC server listening on {addr}");
    tonic::transport::Server::builder()
        .layer(request_id_layer())
        .layer(propagate_request_id_layer())
        .add_service(UserQueryServiceServer::new(server.clone()))
        .add_service(UserCommandServiceServer::new(server))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down user service");
        })
        .await
        .context("gRPC server error")?;

    Ok(())
}
