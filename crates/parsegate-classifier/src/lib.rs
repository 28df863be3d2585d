pub mod backend;

mod address;
mod codes;
mod hints;
mod user_agent;

pub use backend::LocalClassifier;
