// Placeholder -> dataset mapping supplied by the caller
use std::collections::BTreeMap;

use super::error::LifecycleError;

/// Explicit placeholder bindings plus an optional dataset used for every
/// placeholder without an explicit entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetMap {
    explicit: BTreeMap<String, String>,
    fallback: Option<String>,
}

impl DatasetMap {
    pub fn explicit<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            explicit: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            fallback: None,
        }
    }

    pub fn single(dataset: impl Into<String>) -> Self {
        Self {
            explicit: BTreeMap::new(),
            fallback: Some(dataset.into()),
        }
    }

    pub fn with_fallback(mut self, dataset: Option<String>) -> Self {
        self.fallback = dataset;
        self
    }

    /// Parse `placeholder=dataset,placeholder=dataset`
    pub fn parse(key: &'static str, raw: &str) -> Result<Self, LifecycleError> {
        let mut explicit = Vec::new();
        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let (placeholder, dataset) = entry
                .split_once('=')
                .map(|(p, d)| (p.trim(), d.trim()))
                .filter(|(p, d)| !p.is_empty() && !d.is_empty())
                .ok_or_else(|| LifecycleError::InvalidConfiguration {
                    key,
                    value: entry.to_string(),
                })?;
            explicit.push((placeholder, dataset));
        }
        Ok(Self::explicit(explicit))
    }

    pub fn lookup(&self, placeholder: &str) -> Option<&str> {
        self.explicit
            .get(placeholder)
            .or(self.fallback.as_ref())
            .map(String::as_str)
    }

    pub fn explicit_placeholders(&self) -> impl Iterator<Item = &str> {
        self.explicit.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let map = DatasetMap::parse("DATASET_MAP", "orders=ds-1, customers = ds-2,").unwrap();
        assert_eq!(map.lookup("orders"), Some("ds-1"));
        assert_eq!(map.lookup("customers"), Some("ds-2"));
        assert_eq!(map.lookup("returns"), None);
    }

    #[test]
    fn test_parse_rejects_entry_without_dataset() {
        let err = DatasetMap::parse("TARGET_DATASET_MAP", "orders=ds-1,customers").unwrap_err();
        assert_eq!(
            err,
            LifecycleError::InvalidConfiguration {
                key: "TARGET_DATASET_MAP",
                value: "customers".to_string(),
            }
        );
        assert!(DatasetMap::parse("DATASET_MAP", "orders=").is_err());
    }

    #[test]
    fn test_explicit_entry_wins_over_fallback() {
        let map = DatasetMap::explicit([("orders", "ds-1")]).with_fallback(Some("ds-all".to_string()));
        assert_eq!(map.lookup("orders"), Some("ds-1"));
        assert_eq!(map.lookup("anything"), Some("ds-all"));
        assert_eq!(DatasetMap::default().lookup("orders"), None);
    }
}
