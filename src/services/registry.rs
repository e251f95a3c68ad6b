use crate::constants::registry::NOT_FOUND_CODE;
use crate::errors::ToolError;
use crate::utils::suggest::suggest;
use std::collections::BTreeMap;

pub type Constructor<P, T> = Box<dyn Fn(P) -> Result<T, ToolError> + Send + Sync>;

/// Named constructors for one family of implementations (e.g. storages).
pub struct Registry<P, T> {
    kind: String,
    constructors: BTreeMap<String, Constructor<P, T>>,
}

/// `"db"` → `"Db"`.
pub fn capitalize_name(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl<P, T> Registry<P, T> {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            constructors: BTreeMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(P) -> Result<T, ToolError> + Send + Sync + 'static,
    {
        self.constructors.insert(name.into(), Box::new(constructor));
        self
    }

    pub fn names(&self) -> Vec<String> {
        self.constructors.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn create_child_instance(
        &self,
        name: &str,
        params: P,
        capitalize: bool,
    ) -> Result<T, ToolError> {
        let resolved = if capitalize {
            capitalize_name(name)
        } else {
            name.trim().to_string()
        };
        match self.constructors.get(&resolved) {
            Some(constructor) => constructor(params),
            None => {
                let known = self.names();
                let did_you_mean = suggest(&resolved, &known, 3);
                let mut err = ToolError::not_found(format!("{} “{}” not found.", self.kind, resolved))
                    .with_details(serde_json::json!({
                        "code": NOT_FOUND_CODE,
                        "known": known,
                        "did_you_mean": did_you_mean,
                    }));
                if !did_you_mean.is_empty() {
                    err = err.with_hint(format!("Did you mean: {}?", did_you_mean.join(", ")));
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ToolErrorKind;

    fn registry() -> Registry<u32, String> {
        let mut registry = Registry::new("Storage");
        registry
            .register("Db", |n: u32| Ok(format!("db:{}", n)))
            .register("Memory", |n: u32| Ok(format!("memory:{}", n)));
        registry
    }

    #[test]
    fn capitalizes_names_on_request() {
        assert_eq!(capitalize_name("dB"), "Db");
        assert_eq!(registry().create_child_instance("db", 2, true).unwrap(), "db:2");
        assert!(registry().create_child_instance("db", 2, false).is_err());
    }

    #[test]
    fn unknown_name_is_not_found_with_code() {
        let err = registry().create_child_instance("Dbb", 1, false).unwrap_err();
        assert_eq!(err.kind, ToolErrorKind::NotFound);
        assert_eq!(err.message, "Storage “Dbb” not found.");
        let details = err.details.unwrap();
        assert_eq!(details["code"], 500);
        assert_eq!(details["did_you_mean"][0], "Db");
    }
}
