pub mod config;
pub mod logging;

pub mod checksum;
pub mod fetch;
pub mod refresh;
pub mod registry;
pub mod render;
pub mod rewrite;
pub mod store;
pub mod trigger;
