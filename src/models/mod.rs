pub mod candle;
pub mod events;
pub mod pattern;
pub mod status;
pub mod swing;
