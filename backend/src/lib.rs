pub mod config;
pub mod db;
pub mod feed;
pub mod ingestion;
pub mod metrics;
pub mod notify;
pub mod persistence;

pub mod error;
pub mod logger;
