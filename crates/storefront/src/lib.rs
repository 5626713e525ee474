pub mod abstract_trait;
pub mod cache;
pub mod handler;
pub mod middleware;
pub mod state;
