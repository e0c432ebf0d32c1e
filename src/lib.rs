pub mod banner;
pub mod config;
pub mod consts;
pub mod error;
pub mod metrics;
pub mod server;
pub mod source;
