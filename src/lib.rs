pub mod business_logic;
pub mod errors;
pub mod models;
pub mod services;
