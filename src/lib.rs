pub mod api;
pub mod browser;
pub mod config;
pub mod cookies;
pub mod error;
pub mod sync;
