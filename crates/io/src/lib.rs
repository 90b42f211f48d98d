// File I/O operations

pub mod csv;
pub mod error;
pub mod json;

pub use error::IoError;
