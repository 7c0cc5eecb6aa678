//! axum adapter: request extraction, response building and the demo server.

mod error;
mod extract;
pub mod models;
mod response;
mod server;
pub mod services;
pub mod state;

pub use error::ApiError;
pub use response::into_response;
pub use server::{router, run};
