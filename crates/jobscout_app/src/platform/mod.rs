pub mod app;
pub mod config;
mod credentials;
pub mod logging;
mod ui;
