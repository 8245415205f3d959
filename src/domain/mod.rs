// Domain layer - Core types and pure series logic
pub mod error;
pub mod reading;
pub mod series;
