#![forbid(unsafe_code)]

pub mod assets;
pub mod cli;
pub mod content_store;
pub mod error;
pub mod index;
pub mod indexer;
pub mod logging;
pub mod pid;
pub mod render;
pub mod server;
