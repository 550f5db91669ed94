pub mod ekv;
pub mod error;
pub mod ffi;
pub mod simulator;
pub mod vectors;

mod backend;
mod callbacks;
mod loader;

// Re-export commonly used types
pub use error::NgSpiceError;
pub use simulator::NgSpice;
pub use vectors::{Complex, Vector, VectorData, VectorSet};

// Error types
pub type Result<T> = std::result::Result<T, NgSpiceError>;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
