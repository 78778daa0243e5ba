pub mod api;
pub mod calendar;
pub mod cli;
pub mod core;
pub mod error;
pub mod feed;
pub mod integration;
pub mod sources;
pub mod utils;
