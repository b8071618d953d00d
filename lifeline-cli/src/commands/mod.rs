pub mod config;
pub mod diagnose;
pub mod history;
pub mod serve;
