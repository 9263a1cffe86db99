//! Tool registry
//!
//! The fixed set of operations a host can invoke: typed calls, their
//! advertised definitions, and the async dispatcher.

mod call;
mod definitions;
mod toolbox;

pub use call::*;
pub use definitions::tool_definitions;
pub use toolbox::{dispatch, Toolbox};
