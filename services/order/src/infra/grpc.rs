use tonic::transport::Channel;

use shop_core::context::RequestContext;
use shop_core::error::ErrorResponse;
use shop_core::timestamp::{parse_optional, parse_rfc3339};
use shop_domain::product::Product;
use shop_domain::user::User;
use shop_proto::common::FindByIdRequest;
use shop_proto::product::product_command_service_client::ProductCommandServiceClient;
use shop_proto::product::product_query_service_client::ProductQueryServiceClient;
use shop_proto::product::{ProductResponse, UpdateProductStockRequest};
use shop_proto::user::UserResponse;
use shop_proto::user::user_query_service_client::UserQueryServiceClient;

use crate::domain::repository::{ProductClient, UserClient};
use crate::error::OrderServiceError;

const USER_SERVICE: &str = "user";
const PRODUCT_SERVICE: &str = "product";

fn lazy_channel(service: &'static str, addr: Option<String>) -> anyhow::Result<Option<Channel>> {
    let Some(addr) = addr else {
        tracing::warn!(service, "no address configured, client disabled");
        return Ok(None);
    };
    let channel = Channel::from_shared(addr.clone())
        .map_err(|e| anyhow::anyhow!("invalid {service} address {addr}: {e}"))?
        .connect_lazy();
    Ok(Some(channel))
}

/// Maps a failed upstream call. `missing` is what a remote 404 means here.
fn remote(
    status: &tonic::Status,
    service: &'static str,
    missing: OrderServiceError,
) -> OrderServiceError {
    let err = ErrorResponse::from_status(status, service);
    if err.is_cancelled() {
        OrderServiceError::Cancelled
    } else if err.is_not_found() {
        missing
    } else {
        tracing::warn!(service, code = err.code, message = %err.message, "upstream call failed");
        OrderServiceError::UpstreamUnavailable(service)
    }
}

// ── User service ─────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct GrpcUserClient {
    pub client: Option<UserQueryServiceClient<Channel>>,
}

impl GrpcUserClient {
    pub fn connect_lazy(addr: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: lazy_channel(USER_SERVICE, addr)?.map(UserQueryServiceClient::new),
        })
    }
}

impl UserClient for GrpcUserClient {
    async fn find_by_id(&self, ctx: &RequestContext, id: i32) -> Result<User, OrderServiceError> {
        let mut client = self
            .client
            .clone()
            .ok_or(OrderServiceError::UpstreamUnavailable(USER_SERVICE))?;
        let response = client
            .find_by_id(ctx.outbound(FindByIdRequest { id }))
            .await
            .map_err(|status| remote(&status, USER_SERVICE, OrderServiceError::UserNotFound))?
            .into_inner();
        let user = response.data.ok_or(OrderServiceError::UserNotFound)?;
        Ok(user_from_proto(user)?)
    }
}

fn user_from_proto(user: UserResponse) -> anyhow::Result<User> {
    Ok(User {
        id: user.id,
        firstname: user.firstname,
        lastname: user.lastname,
        email: user.email,
        is_verified: user.is_verified,
        created_at: parse_rfc3339(&user.created_at)?,
        updated_at: parse_rfc3339(&user.updated_at)?,
        deleted_at: parse_optional(user.deleted_at.as_deref())?,
    })
}

// ── Product service ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct GrpcProductClient {
    pub queries: Option<ProductQueryServiceClient<Channel>>,
    pub commands: Option<ProductCommandServiceClient<Channel>>,
}

impl GrpcProductClient {
    pub fn connect_lazy(addr: Option<String>) -> anyhow::Result<Self> {
        let channel = lazy_channel(PRODUCT_SERVICE, addr)?;
        Ok(Self {
            queries: channel.clone().map(ProductQueryServiceClient::new),
            commands: channel.map(ProductCommandServiceClient::new),
        })
    }
}

impl ProductClient for GrpcProductClient {
    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i32,
    ) -> Result<Product, OrderServiceError> {
        let mut client = self
            .queries
            .clone()
            .ok_or(OrderServiceError::UpstreamUnavailable(PRODUCT_SERVICE))?;
        let response = client
            .find_by_id(ctx.outbound(FindByIdRequest { id }))
            .await
            .map_err(|status| remote(&status, PRODUCT_SERVICE, OrderServiceError::ProductNotFound))?
            .into_inner();
        let product = response.data.ok_or(OrderServiceError::ProductNotFound)?;
        Ok(product_from_proto(product)?)
    }

    async fn update_stock(
        &self,
        ctx: &RequestContext,
        id: i32,
        stock: i32,
    ) -> Result<Product, OrderServiceError> {
        let mut client = self
            .commands
            .clone()
            .ok_or(OrderServiceError::UpstreamUnavailable(PRODUCT_SERVICE))?;
        let response = client
            .update_product_count_stock(ctx.outbound(UpdateProductStockRequest { id, stock }))
            .await
            .map_err(|status| remote(&status, PRODUCT_SERVICE, OrderServiceError::ProductNotFound))?
            .into_inner();
        let product = response.data.ok_or(OrderServiceError::ProductNotFound)?;
        Ok(product_from_proto(product)?)
    }
}

fn product_from_proto(product: ProductResponse) -> anyhow::Result<Product> {
    Ok(Product {
        id: product.id,
        name: product.name,
        price: product.price,
        stock: product.stock,
        created_at: parse_rfc3339(&product.created_at)?,
        updated_at: parse_rfc3339(&product.updated_at)?,
        deleted_at: parse_optional(product.deleted_at.as_deref())?,
    })
}
