pub mod cache;
pub mod config;
pub mod engine;
pub mod persistence;
pub mod store;
pub mod tcp;

pub use config::ServerConfig;
pub use store::Store;
