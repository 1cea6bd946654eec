pub mod config;
pub mod decision;
pub mod error;
pub mod game;
pub mod metrics;
pub mod output;
pub mod report;
pub mod scenario;
pub mod scoring;
pub mod server;
pub mod service;
pub mod session;
pub mod store;
