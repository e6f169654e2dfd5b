pub mod config;
pub mod error;
pub mod models;
pub mod proxy;
pub mod rag;
pub mod server;
