use tonic::{Request, Response, Status};

use shop_core::context::RequestContext;
use shop_domain::order::{Order, OrderItem};
use shop_domain::pagination::PageRequest;
use shop_domain::response::{self, STATUS_SUCCESS};
use shop_domain::view::ListView;
use shop_proto::common::{Empty, FindAllRequest, FindByIdRequest};
use shop_proto::order::{
    ApiResponseOrder, ApiResponseOrderAll, ApiResponseOrderDelete, ApiResponseOrderItem,
    ApiResponseOrderItemAll, ApiResponseOrderItemDelete, ApiResponsePaginationOrder,
    ApiResponsePaginationOrderItem, ApiResponsesOrderItem, CreateOrderRequest,
    FindByOrderRequest, UpdateOrderRequest, order_command_service_server::OrderCommandService,
    order_item_command_service_server::OrderItemCommandService,
    order_item_query_service_server::OrderItemQueryService,
    order_query_service_server::OrderQueryService,
};

use crate::domain::types::{CreateOrder, OrderLine, UpdateLine, UpdateOrder};
use crate::mapper::{order_item_response, order_response, pagination};
use crate::state::AppState;

const ORDER: &str = "order";
const ORDER_ITEM: &str = "order item";

#[derive(Clone)]
pub struct OrderGrpcServer {
    pub state: AppState,
}

impl OrderGrpcServer {
    async fn find_order_page(
        &self,
        request: Request<FindAllRequest>,
        view: ListView,
    ) -> Result<Response<ApiResponsePaginationOrder>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let page = PageRequest::new(req.page, req.page_size, req.search);

        let result = self
            .state
            .queries()
            .find_page(&ctx, view, page.clone())
            .await?;

        Ok(Response::new(ApiResponsePaginationOrder {
            status: STATUS_SUCCESS.to_owned(),
            message: response::fetched_many(ORDER),
            pagination: Some(pagination(result.pagination(&page))),
            data: result.items.into_iter().map(order_response).collect(),
        }))
    }

    async fn find_item_page(
        &self,
        request: Request<FindAllRequest>,
        view: ListView,
    ) -> Result<Response<ApiResponsePaginationOrderItem>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let page = PageRequest::new(req.page, req.page_size, req.search);

        let result = self
            .state
            .item_queries()
            .find_page(&ctx, view, page.clone())
            .await?;

        Ok(Response::new(ApiResponsePaginationOrderItem {
            status: STATUS_SUCCESS.to_owned(),
            message: response::fetched_many(ORDER_ITEM),
            pagination: Some(pagination(result.pagination(&page))),
            data: result.items.into_iter().map(order_item_response).collect(),
        }))
    }
}

fn single(message: String, order: Order) -> Response<ApiResponseOrder> {
    Response::new(ApiResponseOrder {
        status: STATUS_SUCCESS.to_owned(),
        message,
        data: Some(order_response(order)),
    })
}

fn single_item(message: String, item: OrderItem) -> Response<ApiResponseOrderItem> {
    Response::new(ApiResponseOrderItem {
        status: STATUS_SUCCESS.to_owned(),
        message,
        data: Some(order_item_response(item)),
    })
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[tonic::async_trait]
impl OrderQueryService for OrderGrpcServer {
    async fn find_all(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationOrder>, Status> {
        self.find_order_page(request, ListView::All).await
    }

    async fn find_by_id(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseOrder>, Status> {
        let ctx = RequestContext::from_request(&request);
        let order = self
            .state
            .queries()
            .find_by_id(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::fetched(ORDER), order))
    }

    async fn find_by_active(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationOrder>, Status> {
        self.find_order_page(request, ListView::Active).await
    }

    async fn find_by_trashed(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationOrder>, Status> {
        self.find_order_page(request, ListView::Trashed).await
    }
}

#[tonic::async_trait]
impl OrderCommandService for OrderGrpcServer {
    async fn create(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> Result<Response<ApiResponseOrder>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let input = CreateOrder {
            user_id: req.user_id,
            items: req
                .items
                .into_iter()
                .map(|item| OrderLine {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        };
        let order = self.state.commands().create(&ctx, input).await?;
        Ok(single(response::created(ORDER), order))
    }

    async fn update(
        &self,
        request: Request<UpdateOrderRequest>,
    ) -> Result<Response<ApiResponseOrder>, Status> {
        let ctx = RequestContext::from_request(&request);
        let req = request.into_inner();
        let input = UpdateOrder {
            order_id: req.order_id,
            user_id: req.user_id,
            items: req
                .items
                .into_iter()
                .map(|item| UpdateLine {
                    order_item_id: item.order_item_id,
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
        };
        let order = self.state.commands().update(&ctx, input).await?;
        Ok(single(response::updated(ORDER), order))
    }

    async fn trash(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseOrder>, Status> {
        let ctx = RequestContext::from_request(&request);
        let order = self
            .state
            .commands()
            .trash(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::trashed(ORDER), order))
    }

    async fn restore(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseOrder>, Status> {
        let ctx = RequestContext::from_request(&request);
        let order = self
            .state
            .commands()
            .restore(&ctx, request.into_inner().id)
            .await?;
        Ok(single(response::restored(ORDER), order))
    }

    async fn delete_permanent(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseOrderDelete>, Status> {
        let ctx = RequestContext::from_request(&request);
        self.state
            .commands()
            .delete_permanent(&ctx, request.into_inner().id)
            .await?;
        Ok(Response::new(ApiResponseOrderDelete {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted(ORDER),
        }))
    }

    async fn restore_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseOrderAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.commands().restore_all(&ctx).await?;
        Ok(Response::new(ApiResponseOrderAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::restored_all(ORDER, affected),
        }))
    }

    async fn delete_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseOrderAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.commands().delete_all(&ctx).await?;
        Ok(Response::new(ApiResponseOrderAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted_all(ORDER, affected),
        }))
    }
}

// ── Order items ──────────────────────────────────────────────────────────────

#[tonic::async_trait]
impl OrderItemQueryService for OrderGrpcServer {
    async fn find_all(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationOrderItem>, Status> {
        self.find_item_page(request, ListView::All).await
    }

    async fn find_by_active(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationOrderItem>, Status> {
        self.find_item_page(request, ListView::Active).await
    }

    async fn find_by_trashed(
        &self,
        request: Request<FindAllRequest>,
    ) -> Result<Response<ApiResponsePaginationOrderItem>, Status> {
        self.find_item_page(request, ListView::Trashed).await
    }

    async fn find_order_item_by_order(
        &self,
        request: Request<FindByOrderRequest>,
    ) -> Result<Response<ApiResponsesOrderItem>, Status> {
        let ctx = RequestContext::from_request(&request);
        let items = self
            .state
            .item_queries()
            .find_by_order(&ctx, request.into_inner().order_id)
            .await?;
        Ok(Response::new(ApiResponsesOrderItem {
            status: STATUS_SUCCESS.to_owned(),
            message: response::fetched_many(ORDER_ITEM),
            data: items.into_iter().map(order_item_response).collect(),
        }))
    }
}

#[tonic::async_trait]
impl OrderItemCommandService for OrderGrpcServer {
    async fn trash(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseOrderItem>, Status> {
        let ctx = RequestContext::from_request(&request);
        let item = self
            .state
            .item_commands()
            .trash(&ctx, request.into_inner().id)
            .await?;
        Ok(single_item(response::trashed(ORDER_ITEM), item))
    }

    async fn restore(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseOrderItem>, Status> {
        let ctx = RequestContext::from_request(&request);
        let item = self
            .state
            .item_commands()
            .restore(&ctx, request.into_inner().id)
            .await?;
        Ok(single_item(response::restored(ORDER_ITEM), item))
    }

    async fn delete_permanent(
        &self,
        request: Request<FindByIdRequest>,
    ) -> Result<Response<ApiResponseOrderItemDelete>, Status> {
        let ctx = RequestContext::from_request(&request);
        self.state
            .item_commands()
            .delete_permanent(&ctx, request.into_inner().id)
            .await?;
        Ok(Response::new(ApiResponseOrderItemDelete {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted(ORDER_ITEM),
        }))
    }

    async fn restore_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseOrderItemAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.item_commands().restore_all(&ctx).await?;
        Ok(Response::new(ApiResponseOrderItemAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::restored_all(ORDER_ITEM, affected),
        }))
    }

    async fn delete_all(
        &self,
        request: Request<Empty>,
    ) -> Result<Response<ApiResponseOrderItemAll>, Status> {
        let ctx = RequestContext::from_request(&request);
        let affected = self.state.item_commands().delete_all(&ctx).await?;
        Ok(Response::new(ApiResponseOrderItemAll {
            status: STATUS_SUCCESS.to_owned(),
            message: response::deleted_all(ORDER_ITEM, affected),
        }))
    }
}
