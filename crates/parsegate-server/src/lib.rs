pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod format;
pub mod routes;
pub mod state;
