pub mod error;
pub mod logger;
pub mod monitor;
pub mod select;
pub mod validation;
