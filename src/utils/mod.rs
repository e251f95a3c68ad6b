pub mod arg_aliases;
pub mod convert;
pub mod data_path;
pub mod filter;
pub mod fs_atomic;
pub mod merge;
pub mod paths;
pub mod sql;
pub mod suggest;
pub mod text;
pub mod tool_errors;
