pub mod clock;
pub mod errors;
pub mod ids;
pub mod logging;
pub mod serde_ext;
pub mod sqlite;

pub use errors::WorkflowError;
