use std::collections::HashMap;

/// Read access to an icon library: icon name to sprite include url.
pub trait IconCatalog: Send + Sync {
    /// Case-insensitive lookup.
    fn lookup(&self, name: &str) -> Option<&str>;
}

/// Icon catalog backed by a map, typically filled from the export configuration.
#[derive(Debug, Clone, Default)]
pub struct MapIconCatalog {
    icons: HashMap<String, String>,
}

impl MapIconCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, url: impl Into<String>) {
        self.icons
            .insert(name.as_ref().to_lowercase(), url.into());
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for MapIconCatalog {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for (name, url) in iter {
            catalog.insert(name, url);
        }
        catalog
    }
}

impl IconCatalog for MapIconCatalog {
    fn lookup(&self, name: &str) -> Option<&str> {
        self.icons.get(&name.to_lowercase()).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let catalog: MapIconCatalog = [("Kafka", "https://example.com/kafka.puml")]
            .into_iter()
            .collect();
        assert_eq!(catalog.lookup("kafka"), Some("https://example.com/kafka.puml"));
        assert_eq!(catalog.lookup("KAFKA"), Some("https://example.com/kafka.puml"));
        assert_eq!(catalog.lookup("redis"), None);
        assert_eq!(catalog.len(), 1);
    }
}
