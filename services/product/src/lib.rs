pub mod config;
pub mod domain;
pub mod error;
pub mod grpc_server;
pub mod infra;
pub mod mapper;
pub mod state;
pub mod usecase;
