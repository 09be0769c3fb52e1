pub mod config;
pub mod knowledge;
pub mod observability;
