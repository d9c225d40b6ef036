pub mod config;
pub mod error;
pub mod github;
pub mod maven;
pub mod types;
pub mod xml;
