pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod nav;
pub mod panel;
pub mod session;
pub mod store;
