//! HTTP Layer - RESTful API
//!
//! 阅读页与小说页的只读接口

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use routes::create_routes;
pub use server::{HttpServer, ListenConfig};
pub use state::AppState;
