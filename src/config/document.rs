//! Read-only view over a parsed config document.

use std::sync::Arc;

/// A parsed configuration document with dotted-path accessors.
///
/// Cloning is cheap; documents are immutable snapshots of the file at load
/// time, refreshed through
/// [`ConfigManager::reload`](super::ConfigManager::reload).
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    root: Arc<toml::Value>,
}

impl ConfigDocument {
    pub(crate) fn new(root: toml::Value) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    /// An empty document (what a freshly created config file parses to).
    pub(crate) fn empty() -> Self {
        Self::new(toml::Value::Table(toml::Table::new()))
    }

    fn lookup(&self, path: &str) -> Option<&toml::Value> {
        path.split('.')
            .try_fold(self.root.as_ref(), |value, key| value.get(key))
    }

    /// Whether a value exists at the dotted path (e.g. "settings.debug").
    pub fn contains(&self, path: &str) -> bool {
        self.lookup(path).is_some()
    }

    pub fn get_str(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(|v| v.as_str())
    }

    pub fn get_str_or<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.get_str(path).unwrap_or(default)
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.lookup(path).and_then(|v| v.as_integer())
    }

    pub fn get_i64_or(&self, path: &str, default: i64) -> i64 {
        self.get_i64(path).unwrap_or(default)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.lookup(path).and_then(|v| v.as_float())
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.lookup(path).and_then(|v| v.as_bool())
    }

    pub fn get_bool_or(&self, path: &str, default: bool) -> bool {
        self.get_bool(path).unwrap_or(default)
    }

    /// Deserialize the whole document into a typed config struct.
    pub fn deserialize<T>(&self) -> Result<T, toml::de::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        self.root.as_ref().clone().try_into()
    }

    /// String elements of an array value; non-string elements are skipped.
    pub fn get_str_list(&self, path: &str) -> Vec<String> {
        self.lookup(path)
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> ConfigDocument {
        ConfigDocument::new(text.parse().unwrap())
    }

    #[test]
    fn dotted_path_lookup() {
        let doc = doc(
            r#"
            [settings]
            debug = true
            max-warns = 3
            motd = "welcome"
        "#,
        );

        assert_eq!(doc.get_bool("settings.debug"), Some(true));
        assert_eq!(doc.get_i64("settings.max-warns"), Some(3));
        assert_eq!(doc.get_str("settings.motd"), Some("welcome"));
        assert!(doc.contains("settings"));
        assert!(!doc.contains("settings.missing"));
    }

    #[test]
    fn defaults_apply_on_missing_or_mistyped() {
        let doc = doc("[settings]\ndebug = \"yes\"");

        // Wrong type falls back too
        assert!(!doc.get_bool_or("settings.debug", false));
        assert_eq!(doc.get_i64_or("settings.limit", 10), 10);
        assert_eq!(doc.get_str_or("settings.motd", "hi"), "hi");
    }

    #[test]
    fn deserialize_into_typed_struct() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Limits {
            max_warns: i64,
            #[serde(default)]
            strict: bool,
        }

        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct AppConfig {
            limits: Limits,
        }

        let doc = doc("[limits]\nmax_warns = 3\n");
        let config: AppConfig = doc.deserialize().unwrap();
        assert_eq!(
            config,
            AppConfig {
                limits: Limits {
                    max_warns: 3,
                    strict: false
                }
            }
        );
    }

    #[test]
    fn string_lists() {
        let doc = doc(r#"worlds = ["lobby", "arena", 3]"#);
        assert_eq!(doc.get_str_list("worlds"), vec!["lobby", "arena"]);
        assert!(doc.get_str_list("missing").is_empty());
    }
}
