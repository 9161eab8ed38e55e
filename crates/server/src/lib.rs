#![forbid(unsafe_code)]

pub mod config;
mod error;
pub mod logging;
mod routes;
mod state;

pub use routes::app;
pub use state::AppState;
