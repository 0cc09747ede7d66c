//! CLI command implementations
//!
//! The registry lives and dies with the process, so every command hosts
//! the plugins it touches for the duration of the invocation.

pub mod config;
pub mod info;
pub mod install;
pub mod list;
pub mod reload;
pub mod start;
pub mod stop;
pub mod uninstall;
