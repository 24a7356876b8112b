use tonic::{Request, Response, Status};

use shop_core::context::RequestContext;
use shop_domain::pagination::PageRequest;
use shop_domain::response::{self, STATUS_SUCCESS};
use shop_domain::view::ListView;
use shop_proto::common::{Empty, FindAllRequest, FindByIdRequest};
use shop_proto::product::{
    ApiResponsePaginationProduct, ApiResponseProduct, ApiResponseProductAll,
    ApiResponseProductDelete, CreateProductRequest, FindByNameRequest, UpdateProductRequest,
    UpdateProductStockRequest, product_command_service_server::ProductCommandService,
    product_query_service_server::ProductQueryService,
};

use crate::domain::types::{CreateProduct, UpdateProduct};
use crate::mapper::{pagination, product_response};
use crate::state::AppState;

const ENTITY: &str = "product";

#[derive(Clone)]
pub struct ProductGrpcServer {
    pub state: AppState,
}

impl ProductGrpcServer {
    async fn find_page(
        &self,
        request: Request<FindAllRequest>,
        view: ListView,
    ) -> Result<Response<ApiResponsePaginationProduct>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let page = PageRequest::new(req.page, req.page_size, req.search);

        let result = self
            .state
            .queries()
            .find_page(&ctx, view, page.clone())
            .await?;

        Ok(Response::new(ApiResponsePaginationProduct {
            status: STATUS_SUCCESS.to_owned(),
            message: response::fetched_many(ENTITY),
            pagination: Some(pagination(result.pagination(&page))),
            data: result.items.into_iter().map(product_response).collect(),
        }))
    }
}

fn single(message: String, product: shop_domain::product::Product) -> Response<ApiResponseProduct> {
    Response::new(ApiResponseProduct {
        status: STATUS_SUCCESS.to_owned(),
        message,
        data: Some(product_response(product)),
    })
}

#[tonic::async_trait]
impl ProductQueryService for ProductGrpcServer {
    async fn find_all(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationProduct>, Status> {
        self.find_page(request, ListView::All).await
    }

    async fn find_by_id(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseProduct>, Status> {
        let ctx = RequestContext::from_request(&request);
        let product = self
            .state
            .queries()
            .find_by_id(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::fetched(ENTITY), product))
    }

    async fn find_by_active(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationProduct>, Status> {
        self.find_page(request, ListView::Active).await
    }

    async fn find_by_trashed(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationProduct>, Status> {
        self.find_page(request, ListView::Trashed).await
    }

    async fn find_by_name(
        &self,
        request: Request<FindByNameRequest>,
    ) -> Result<Response<ApiResponseProduct>, Status> {
        let ctx = RequestContext::from_request(&request);
        let name = request.into_inner().name;
        let product = self.state.queries().find_by_name(&ctx, name.trim()).await?;
        Ok(single(response::fetched(ENTITY), product))
    }
}

#[tonic::async_trait]
impl ProductCommandService for ProductGrpcServer {
    async fn create(
        &self,
        request: Request<CreateProductRequest>,
    ) -> Result<Response<ApiResponseProduct>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let input = CreateProduct {
            name: req.name.trim().to_owned(),
            price: req.price,
            stock: req.stock,
        };
        let product = self.state.commands().create(&ctx, input).await?;
        Ok(single(response::created(ENTITY), product))
    }

    async fn update(
        &self,
        request: Request<UpdateProductRequest>,
    ) -> Result<Response<ApiResponseProduct>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let input = UpdateProduct {
            id: req.id,
            name: req.name.trim().to_owned(),
            price: req.price,
            stock: req.stock,
        };
        let product = self.state.commands().update(&ctx, input).await?;
        Ok(single(response::updated(ENTITY), product))
    }

    async fn update_product_count_stock(
        &self,
        request: Request<UpdateProductStockRequest>,
    ) -> Result<Response<ApiResponseProduct>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let product = self
            .state
            .commands()
            .update_stock(&ctx, req.id, req.stock)
            .await?;
        Ok(single(response::updated(ENTITY), product))
    }

    async fn trash(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseProduct>, Status> {
        let ctx = RequestContext::from_request(&request);
        let product = self
            .state
            .commands()
            .trash(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::trashed(ENTITY), product))
    }

    async fn restore(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseProduct>, Status> {
        let ctx = RequestContext::from_request(&request);
        let product = self
            .state
            .commands()
            .restore(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::restored(ENTITY), product))
    }

    async fn delete_permanent(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseProductDelete>, Status> {
        let ctx = RequestContext::from_request(&request);
        self.state
            .commands()
            .delete_permanent(&ctx, request.into_inner().id)
            .await?;
        Ok(Response::new(ApiResponseProductDelete {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted(ENTITY),
        }))
    }

    async fn restore_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseProductAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.commands().restore_all(&ctx).await?;
        Ok(Response::new(ApiResponseProductAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::restored_all(ENTITY, affected),
        }))
    }

    async fn delete_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseProductAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.commands().delete_all(&ctx).await?;
        Ok(Response::new(ApiResponseProductAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted_all(ENTITY, affected),
        }))
    }
}
