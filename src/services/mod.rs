pub mod cache;
pub mod collection;
pub mod db_driver;
pub mod db_table;
pub mod logger;
pub mod registry;
pub mod response;
pub mod storage;
pub mod tool_executor;
