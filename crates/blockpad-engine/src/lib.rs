pub mod convert;
pub mod editing;
pub mod io;
pub mod models;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use convert::*;
pub use editing::*;
pub use io::{AutoSave, DocumentFormat, IoError, SaveStatus};
pub use models::*;
