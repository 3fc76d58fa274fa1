pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod profile;
pub mod resolve;
pub mod runner;
pub mod sheet;
