//! Generated gRPC contracts for the shop services.

pub mod common {
    tonic::include_proto!("common");
}

pub mod user {
    tonic::include_proto!("user");
}

pub mod role {
    tonic::include_proto!("role");
}

pub mod product {
    tonic::include_proto!("product");
}

pub mod order {
    tonic::include_proto!("order");
}
