pub mod app;
pub mod config;
pub mod effects;
pub mod error;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod view;
