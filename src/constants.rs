pub mod cache {
    pub const DEFAULT_PREFIX: &str = "doc";
    /// Keeps a cache file inert if the web server ever serves it directly.
    pub const CONTENT_PREFIX: &str = "<?php die(\"Unauthorized access.\"); ?>";
    pub const FILE_EXTENSION: &str = "php";
    pub const FILE_MODE: u32 = 0o640;
    pub const TAG_STRING: &str = "str";
    pub const TAG_OBJECT: &str = "obj";
    pub const TAG_ARRAY: &str = "arr";
    pub const TAG_LEN: usize = 3;
}

pub mod storage {
    pub const DEFAULT_TABLE_PREFIX: &str = "ddtools_";
    pub const DEFAULT_COLUMN_ATTRS: &str = "TEXT NULL";
    pub const ID_COLUMN: &str = "id";
    pub const ID_COLUMN_ATTRS: &str = "INTEGER PRIMARY KEY AUTOINCREMENT";
}

pub mod response {
    pub const ALLOWED_META_KEYS: &[&str] = &["code", "eTag", "success", "message"];
    pub const REQUIRED_META_KEYS: &[&str] = &["code", "success"];
    pub const ALLOWED_MESSAGE_KEYS: &[&str] = &["content", "title"];
    pub const REQUIRED_MESSAGE_KEYS: &[&str] = &["content"];
    pub const CODE_SUCCESS: i64 = 200;
    pub const CODE_FAILURE: i64 = 400;
}

pub mod registry {
    pub const NOT_FOUND_CODE: u16 = 500;
}
