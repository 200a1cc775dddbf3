pub mod abc;
pub mod config;
pub mod dominant;
pub mod engine;
pub mod fractals;
pub mod swings;
