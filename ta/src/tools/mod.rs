//! Tools the model can call while composing a response

mod executor;
mod traits;
pub mod weather;

pub use executor::ToolExecutor;
pub use traits::{Tool, ToolResult};
