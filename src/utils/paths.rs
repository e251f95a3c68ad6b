use std::env;
use std::path::PathBuf;

fn normalize_env_path(value: Option<String>) -> Option<PathBuf> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lowered = trimmed.to_lowercase();
    if lowered == "undefined" || lowered == "null" {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

fn resolve_home_dir() -> Option<PathBuf> {
    env::var("HOME").ok().map(PathBuf::from)
}

fn resolve_xdg_state_dir() -> Option<PathBuf> {
    if let Some(path) = normalize_env_path(env::var("XDG_STATE_HOME").ok()) {
        return Some(path);
    }
    resolve_home_dir().map(|home| home.join(".local").join("state"))
}

fn resolve_entry_dir() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
}

pub fn resolve_base_dir() -> PathBuf {
    if let Some(path) = normalize_env_path(env::var("DDTOOLS_BASE_DIR").ok()) {
        return path;
    }
    if let Some(path) = resolve_xdg_state_dir() {
        return path.join("ddtools");
    }
    resolve_entry_dir().unwrap_or_else(|| env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

pub fn resolve_cache_dir() -> PathBuf {
    if let Some(path) = normalize_env_path(env::var("DDTOOLS_CACHE_DIR").ok()) {
        return path;
    }
    resolve_base_dir().join("cache").join("ddCache")
}

pub fn resolve_db_path() -> PathBuf {
    if let Some(path) = normalize_env_path(env::var("DDTOOLS_DB_PATH").ok()) {
        return path;
    }
    resolve_base_dir().join("ddtools.sqlite")
}

pub fn resolve_table_prefix() -> String {
    match env::var("DDTOOLS_TABLE_PREFIX") {
        Ok(prefix) if !prefix.trim().is_empty() => prefix.trim().to_string(),
        _ => crate::constants::storage::DEFAULT_TABLE_PREFIX.to_string(),
    }
}

pub fn resolve_store_info() -> serde_json::Value {
    serde_json::json!({
        "base_dir": resolve_base_dir(),
        "cache_dir": resolve_cache_dir(),
        "db_path": resolve_db_path(),
        "table_prefix": resolve_table_prefix(),
    })
}

#[cfg(test)]
mod tests {
    use super::normalize_env_path;

    #[test]
    fn ignores_placeholder_values() {
        assert_eq!(normalize_env_path(Some("  ".to_string())), None);
        assert_eq!(normalize_env_path(Some("undefined".to_string())), None);
        assert_eq!(normalize_env_path(Some("NULL".to_string())), None);
        assert_eq!(
            normalize_env_path(Some(" /tmp/x ".to_string())),
            Some(std::path::PathBuf::from("/tmp/x"))
        );
    }
}
