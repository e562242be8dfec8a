pub mod backend;
pub mod cache;
pub mod database;
pub mod impls;
pub mod model;
mod services;

pub use backend::BackendClient;
pub use cache::CacheService;
pub use database::{Database, MIGRATOR};
