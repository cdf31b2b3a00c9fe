pub mod config;
pub mod error;
pub mod server;
pub mod spotify;
pub mod tools;
