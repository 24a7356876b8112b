use tonic::{Request, Response, Status};

use shop_core::context::RequestContext;
use shop_domain::pagination::PageRequest;
use shop_domain::response::{self, STATUS_SUCCESS};
use shop_domain::user::User;
use shop_domain::view::ListView;
use shop_proto::common::{Empty, FindAllRequest, FindByIdRequest};
use shop_proto::user::{
    ApiResponsePaginationUser, ApiResponseUser, ApiResponseUserAll, ApiResponseUserDelete,
    ApiResponseUserWithPassword, CreateUserRequest, FindByEmailRequest,
    FindByVerificationCodeRequest, UpdateUserRequest, UpdateUserVerifiedRequest,
    user_command_service_server::UserCommandService, user_query_service_server::UserQueryService,
};

use crate::domain::types::{CreateUser, UpdateUser};
use crate::mapper::{pagination, user_response, user_with_password_response};
use crate::state::AppState;

const ENTITY: &str = "user";

#[derive(Clone)]
pub struct UserGrpcServer {
    pub state: AppState,
}

impl UserGrpcServer {
    async fn find_page(
        &self,
        request: Request<FindAllRequest>,
        view: ListView,
    ) -> Result<Response<ApiResponsePaginationUser>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let page = PageRequest::new(req.page, req.page_size, req.search);

        let result = self
            .state
            .queries()
            .find_page(&ctx, view, page.clone())
            .await?;

        Ok(Response::new(ApiResponsePaginationUser {
            status: STATUS_SUCCESS.to_owned(),
            message: response::fetched_many(ENTITY),
            pagination: Some(pagination(result.pagination(&page))),
            data: result.items.into_iter().map(user_response).collect(),
        }))
    }
}

fn single(message: String, user: User) -> Response<ApiResponseUser> {
    Response::new(ApiResponseUser {
        status: STATUS_SUCCESS.to_owned(),
        message,
        data: Some(user_response(user)),
    })
}

#[tonic::async_trait]
impl UserQueryService for UserGrpcServer {
    async fn find_all(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationUser>, Status> {
        self.find_page(request, ListView::All).await
    }

    async fn find_by_id(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseUser>, Status> {
        let ctx = RequestContext::from_request(&request);
        let user = self
            .state
            .queries()
            .find_by_id(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::fetched(ENTITY), user))
    }

    async fn find_by_active(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationUser>, Status> {
        self.find_page(request, ListView::Active).await
    }

    async fn find_by_trashed(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationUser>, Status> {
        self.find_page(request, ListView::Trashed).await
    }

    async fn find_by_email(
        &self,
        request: Request<FindByEmailRequest>,
    ) -> Result<Response<ApiResponseUser>, Status> {
        let ctx = RequestContext::from_request(&request);
        let email = request.into_inner().email;
        let user = self.state.queries().find_by_email(&ctx, &email).await?;
        Ok(single(response::fetched(ENTITY), user))
    }

    async fn find_by_email_and_verify(
        &self,
        request: Request<FindByEmailRequest>,
    ) -> Result<Response<ApiResponseUserWithPassword>, Status> {
        let ctx = RequestContext::from_request(&request);
        let email = request.into_inner().email;
        let found = self
            .state
            .queries()
            .find_by_email_and_verify(&ctx, &email)
            .await?;
        Ok(Response::new(ApiResponseUserWithPassword {
            status: STATUS_SUCCESS.to_owned(),
            message: response::fetched(ENTITY),
            data: Some(user_with_password_response(found)),
        }))
    }

    async fn find_by_verification_code(
        &self,
        request: Request<FindByVerificationCodeRequest>,
    ) -> Result<Response<ApiResponseUser>, Status> {
        let ctx = RequestContext::from_request(&request);
        let code = request.into_inner().verification_code;
        let user = self
            .state
            .queries()
            .find_by_verification_code(&ctx, &code)
            .await?;
        Ok(single(response::fetched(ENTITY), user))
    }
}

#[tonic::async_trait]
impl UserCommandService for UserGrpcServer {
    async fn create(
        &self,
        request: Request<CreateUserRequest>,
    ) -> Result<Response<ApiResponseUser>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let input = CreateUser {
            firstname: req.firstname,
            lastname: req.lastname,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        };
        let user = self.state.commands().create(&ctx, input).await?;
        Ok(single(response::created(ENTITY), user))
    }

    async fn update(
        &self,
        request: Request<UpdateUserRequest>,
    ) -> Result<Response<ApiResponseUser>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let input = UpdateUser {
            id: req.id,
            firstname: req.firstname,
            lastname: req.lastname,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        };
        let user = self.state.commands().update(&ctx, input).await?;
        Ok(single(response::updated(ENTITY), user))
    }

    async fn update_is_verified(
        &self,
        request: Request<UpdateUserVerifiedRequest>,
    ) -> Result<Response<ApiResponseUser>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let user = self
            .state
            .commands()
            .update_is_verified(&ctx, req.id, req.is_verified)
            .await?;
        Ok(single(response::updated(ENTITY), user))
    }

    async fn trash(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseUser>, Status> {
        let ctx = RequestContext::from_request(&request);
        let user = self
            .state
            .commands()
            .trash(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::trashed(ENTITY), user))
    }

    async fn restore(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseUser>, Status> {
        let ctx = RequestContext::from_request(&request);
        let user = self
            .state
            .commands()
            .restore(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::restored(ENTITY), user))
    }

    async fn delete_permanent(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseUserDelete>, Status> {
        let ctx = RequestContext::from_request(&request);
        self.state
            .commands()
            .delete_permanent(&ctx, request.into_inner().id)
            .await?;
        Ok(Response::new(ApiResponseUserDelete {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted(ENTITY),
        }))
    }

    async fn restore_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseUserAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.commands().restore_all(&ctx).await?;
        Ok(Response::new(ApiResponseUserAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::restored_all(ENTITY, affected),
        }))
    }

    async fn delete_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseUserAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.commands().delete_all(&ctx).await?;
        Ok(Response::new(ApiResponseUserAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted_all(ENTITY, affected),
        }))
    }
}
