use tonic::transport::Channel;

use shop_core::context::RequestContext;
use shop_core::error::ErrorResponse;
use shop_proto::role::role_query_service_client::RoleQueryServiceClient;
use shop_proto::role::user_role_service_client::UserRoleServiceClient;
use shop_proto::role::{FindByNameRequest, UserRoleRequest};

use crate::domain::repository::RoleClient;
use crate::error::UserServiceError;

const SERVICE: &str = "role";

/// Role service over gRPC. Without an address every call fails as unavailable.
#[derive(Clone, Default)]
pub struct GrpcRoleClient {
    pub queries: Option<RoleQueryServiceClient<Channel>>,
    pub assignments: Option<UserRoleServiceClient<Channel>>,
}

impl GrpcRoleClient {
    /// Lazily connected clients for `addr`; the first call dials.
    pub fn connect_lazy(addr: Option<String>) -> anyhow::Result<Self> {
        let Some(addr) = addr else {
            tracing::warn!(service = SERVICE, "no address configured, client disabled");
            return Ok(Self::default());
        };
        let channel = Channel::from_shared(addr.clone())
            .map_err(|e| anyhow::anyhow!("invalid {SERVICE} address {addr}: {e}"))?
            .connect_lazy();
        Ok(Self {
            queries: Some(RoleQueryServiceClient::new(channel.clone())),
            assignments: Some(UserRoleServiceClient::new(channel)),
        })
    }
}

fn unavailable() -> UserServiceError {
    UserServiceError::Role(ErrorResponse::upstream_unavailable(SERVICE))
}

fn remote(status: &tonic::Status) -> UserServiceError {
    let err = ErrorResponse::from_status(status, SERVICE);
    if err.is_cancelled() {
        UserServiceError::Cancelled
    } else {
        UserServiceError::Role(err)
    }
}

impl RoleClient for GrpcRoleClient {
    async fn find_role_id(
        &self,
        ctx: &RequestContext,
        name: &str,
    ) -> Result<i32, UserServiceError> {
        let mut client = self.queries.clone().ok_or_else(unavailable)?;
        let request = ctx.outbound(FindByNameRequest {
            name: name.to_owned(),
        });
        let response = client
            .find_by_name(request)
            .await
            .map_err(|status| remote(&status))?
            .into_inner();
        response
            .data
            .map(|role| role.id)
            .ok_or_else(|| UserServiceError::Role(ErrorResponse::not_found("role not found")))
    }

    async fn assign_role(
        &self,
        ctx: &RequestContext,
        user_id: i32,
        role_id: i32,
    ) -> Result<(), UserServiceError> {
        let mut client = self.assignments.clone().ok_or_else(unavailable)?;
        let request = ctx.outbound(UserRoleRequest { user_id, role_id });
        client
            .assign_role(request)
            .await
            .map_err(|status| remote(&status))?;
        Ok(())
    }
}
