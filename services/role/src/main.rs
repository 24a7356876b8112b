use anyhow::Context as _;
use tracing::info;

use shop_core::config::{cache_from_env, connect_database, load_dotenv};
use shop_core::context::RequestContext;
use shop_core::health::serve_probes;
use shop_core::middleware::{propagate_request_id_layer, request_id_layer};
use shop_core::tracing::init_tracing;
use shop_proto::role::role_command_service_server::RoleCommandServiceServer;
use shop_proto::role::role_query_service_server::RoleQueryServiceServer;
use shop_proto::role::user_role_service_server::UserRoleServiceServer;

use shop_role::config::RoleConfig;
use shop_role::domain::types::DEFAULT_ROLES;
use shop_role::grpc_server::RoleGrpcServer;
use shop_role::state::AppState;
use shop_role::usecase::seed::seed_roles;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    init_tracing();

    let config = RoleConfig::from_env()?;

    let db = connect_database(&config.database_url).await?;
    let cache = cache_from_env("role")?;

    let state = AppState {
        db: db.clone(),
        cache,
    };

    if config.seed {
        let created = seed_roles(&state.role_repo(), &RequestContext::new(), &DEFAULT_ROLES)
            .await
            .map_err(|e| anyhow::anyhow!("failed to seed roles: {e}"))?;
        info!(created, "role seeding finished");
    }

    // Health probes
    let http_port = config.ports.http;
    tokio::spawn(async move {
        if let Err(e) = serve_probes(http_port, db).await {
            tracing::error!(error = %e, "health probe server stopped");
        }
    });

    // gRPC server
    let server = RoleGrpcServer { state };
    let addr: std::net::SocketAddr = format!("0.0.0.0:{}", config.ports.grpc)
        .parse()
        .context("invalid gRPC address")?;
    info!("role gRPC server listening on {addr}");
    tonic::transport::Server::builder()
        .layer(request_id_layer())
        .layer(propagate_request_id_layer())
        .add_service(RoleQueryServiceServer::new(server.clone()))
        .add_service(RoleCommandServiceServer::new(server.clone()))
        .add_service(UserRoleServiceServer::new(server))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down role service");
        })
        .await
        .context("gRPC server error")?;

    Ok(())
}
