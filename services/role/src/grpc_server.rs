use tonic::{Request, Response, Status};

use shop_core::context::RequestContext;
use shop_domain::pagination::PageRequest;
use shop_domain::response::{self, STATUS_SUCCESS};
use shop_domain::role::Role;
use shop_domain::view::ListView;
use shop_proto::common::{Empty, FindAllRequest, FindByIdRequest};
use shop_proto::role::{
    ApiResponsePaginationRole, ApiResponseRole, ApiResponseRoleAll, ApiResponseRoleDelete,
    ApiResponseUserRole, ApiResponseUserRoleDelete, ApiResponsesRole, CreateRoleRequest,
    FindByNameRequest, FindByUserIdRequest, UpdateRoleRequest, UserRoleRequest,
    role_command_service_server::RoleCommandService, role_query_service_server::RoleQueryService,
    user_role_service_server::UserRoleService,
};

use crate::mapper::{pagination, role_response, user_role_response};
use crate::state::AppState;

const ENTITY: &str = "role";
const ASSIGNMENT: &str = "user role";

#[derive(Clone)]
pub struct RoleGrpcServer {
    pub state: AppState,
}

impl RoleGrpcServer {
    async fn find_page(
        &self,
        request: Request<FindAllRequest>,
        view: ListView,
    ) -> Result<Response<ApiResponsePaginationRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let page = PageRequest::new(req.page, req.page_size, req.search);

        let result = self
            .state
            .queries()
            .find_page(&ctx, view, page.clone())
            .await?;

        Ok(Response::new(ApiResponsePaginationRole {
            status: STATUS_SUCCESS.to_owned(),
            message: response::fetched_many(ENTITY),
            pagination: Some(pagination(result.pagination(&page))),
            data: result.items.into_iter().map(role_response).collect(),
        }))
    }
}

fn single(message: String, role: Role) -> Response<ApiResponseRole> {
    Response::new(ApiResponseRole {
        status: STATUS_SUCCESS.to_owned(),
        message,
        data: Some(role_response(role)),
    })
}

#[tonic::async_trait]
impl RoleQueryService for RoleGrpcServer {
    async fn find_all(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationRole>, Status> {
        self.find_page(request, ListView::All).await
    }

    async fn find_by_id(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let role = self
            .state
            .queries()
            .find_by_id(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::fetched(ENTITY), role))
    }

    async fn find_by_active(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationRole>, Status> {
        self.find_page(request, ListView::Active).await
    }

    async fn find_by_trashed(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationRole>, Status> {
        self.find_page(request, ListView::Trashed).await
    }

    async fn find_by_name(
        &self,
        request: Request<FindByNameRequest>,
    ) -> Result<Response<ApiResponseRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let name = request.into_inner().name;
        let role = self.state.queries().find_by_name(&ctx, name.trim()).await?;
        Ok(single(response::fetched(ENTITY), role))
    }

    async fn find_by_user_id(
        &self,
        request: Request<FindByUserIdRequest>,
    ) -> Result<Response<ApiResponsesRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let roles = self
            .state
            .queries()
            .find_by_user_id(&ctx, request.into_inner().user_id)
            .await?;
        Ok(Response::new(ApiResponsesRole {
            status: STATUS_SUCCESS.to_owned(),
            message: response::fetched_many(ENTITY),
            data: roles.into_iter().map(role_response).collect(),
        }))
    }
}

#[tonic::async_trait]
impl RoleCommandService for RoleGrpcServer {
    async fn create(
        &self,
        request: Request<CreateRoleRequest>,
    ) -> Result<Response<ApiResponseRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let name = request.into_inner().name;
        let role = self.state.commands().create(&ctx, &name).await?;
        Ok(single(response::created(ENTITY), role))
    }

    async fn update(
        &self,
        request: Request<UpdateRoleRequest>,
    ) -> Result<Response<ApiResponseRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let role = self.state.commands().update(&ctx, req.id, &req.name).await?;
        Ok(single(response::updated(ENTITY), role))
    }

    async fn trash(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let role = self
            .state
            .commands()
            .trash(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::trashed(ENTITY), role))
    }

    async fn restore(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let role = self
            .state
            .commands()
            .restore(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::restored(ENTITY), role))
    }

    async fn delete_permanent(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseRoleDelete>, Status> {
        let ctx = RequestContext::from_request(&request);
        self.state
            .commands()
            .delete_permanent(&ctx, request.into_inner().id)
            .await?;
        Ok(Response::new(ApiResponseRoleDelete {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted(ENTITY),
        }))
    }

    async fn restore_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseRoleAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.commands().restore_all(&ctx).await?;
        Ok(Response::new(ApiResponseRoleAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::restored_all(ENTITY, affected),
        }))
    }

    async fn delete_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseRoleAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.commands().delete_all(&ctx).await?;
        Ok(Response::new(ApiResponseRoleAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted_all(ENTITY, affected),
        }))
    }
}

#[tonic::async_trait]
impl UserRoleService for RoleGrpcServer {
    async fn assign_role(
        &self,
        request: Request<UserRoleRequest>,
    ) -> Result<Response<ApiResponseUserRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let assignment = self
            .state
            .user_roles()
            .assign(&ctx, req.user_id, req.role_id)
            .await?;
        Ok(Response::new(ApiResponseUserRole {
            status: STATUS_SUCCESS.to_owned(),
            message: response::created(ASSIGNMENT),
            data: Some(user_role_response(assignment)),
        }))
    }

    async fn update_role(
        &self,
        request: Request<UserRoleRequest>,
    ) -> Result<Response<ApiResponseUserRole>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let assignment = self
            .state
            .user_roles()
            .update_role(&ctx, req.user_id, req.role_id)
            .await?;
        Ok(Response::new(ApiResponseUserRole {
            status: STATUS_SUCCESS.to_owned(),
            message: response::updated(ASSIGNMENT),
            data: Some(user_role_response(assignment)),
        }))
    }

    async fn remove_role(
        &self,
        request: Request<UserRoleRequest>,
    ) -> Result<Response<ApiResponseUserRoleDelete>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        self.state
            .user_roles()
            .remove(&ctx, req.user_id, req.role_id)
            .await?;
        Ok(Response::new(ApiResponseUserRoleDelete {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted(ASSIGNMENT),
        }))
    }
}
