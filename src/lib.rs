//! todo-assist library
//!
//! This module exports the core components for testing and integration.

pub mod ai;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod server;
pub mod store;
pub mod types;
pub mod view;
