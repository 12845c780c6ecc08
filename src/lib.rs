pub mod client;
pub mod cmd;
pub mod config;
pub mod edge;
pub mod logs;
pub mod server;
pub mod types;
