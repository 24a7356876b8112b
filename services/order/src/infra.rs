pub mod db;
pub mod grpc;
