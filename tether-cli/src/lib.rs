pub mod commands;
pub mod persist;

pub use commands::Session;
