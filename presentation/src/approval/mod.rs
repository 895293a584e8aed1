//! Human approval surfaces

pub mod console;
