pub mod monitor;
pub mod replay;
