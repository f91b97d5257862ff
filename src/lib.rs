pub mod api;
pub mod capabilities;
pub mod cli;
pub mod config;
pub mod db;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod notify;
pub mod parsers;
pub mod pipeline;
pub mod process;
pub mod reporting;
pub mod trigger;
pub mod utils;
