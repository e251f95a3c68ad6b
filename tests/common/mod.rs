#![allow(dead_code)]

use ddtools::app::{App, AppPaths};
use ddtools::stores::QuickStorage;
use once_cell::sync::Lazy;
use std::path::PathBuf;
use std::sync::Mutex;

pub static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub fn temp_dir(prefix: &str) -> PathBuf {
    std::env::temp_dir().join(format!("{}-{}", prefix, uuid::Uuid::new_v4()))
}

pub fn restore_env(key: &str, previous: Option<String>) {
    match previous {
        Some(value) => std::env::set_var(key, value),
        None => std::env::remove_var(key),
    }
}

/// App rooted in `root`, with its own session tier.
pub fn app_in(root: &PathBuf) -> App {
    app_with_session(root, QuickStorage::new())
}

pub fn app_with_session(root: &PathBuf, quick: QuickStorage) -> App {
    App::with_paths(
        AppPaths {
            cache_dir: Some(root.join("cache")),
            db_path: root.join("ddtools.sqlite"),
            table_prefix: "test_".to_string(),
        },
        quick,
    )
    .expect("app")
}
