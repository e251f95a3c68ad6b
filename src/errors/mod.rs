mod tool_error;

pub use tool_error::{ToolError, ToolErrorKind};
