pub mod assemble;
pub mod classifier;
pub mod config;
pub mod document;
pub mod error;
pub mod query;
pub mod result;
pub mod stats;
