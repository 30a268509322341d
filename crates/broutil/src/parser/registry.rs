use std::collections::HashMap;
use std::path::Path;

use super::model::LogKind;

/// File extension → log format mapping.
///
/// Built once before any discovery runs and read-only afterwards; the
/// aggregator owns its registry rather than reaching for a global.
#[derive(Debug, Clone, Default)]
pub struct FormatRegistry {
    kinds: HashMap<String, LogKind>,
}

impl FormatRegistry {
    /// An empty registry; nothing is supported until registered.
    pub fn new() -> Self {
        Self {
            kinds: HashMap::new(),
        }
    }

    /// Registry with the standard Bro extensions.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("log", LogKind::Ascii);
        registry.register("log.gz", LogKind::Ascii);
        registry.register("log.bz2", LogKind::Ascii);
        registry.register("ds", LogKind::DataSeries);
        registry
    }

    /// Register (or replace) the format for an extension.
    pub fn register(&mut self, extension: impl Into<String>, kind: LogKind) {
        self.kinds.insert(extension.into(), kind);
    }

    pub fn lookup(&self, path: impl AsRef<Path>) -> Option<LogKind> {
        extension_of(path.as_ref()).and_then(|ext| self.kinds.get(ext).copied())
    }

    pub fn supports(&self, path: impl AsRef<Path>) -> bool {
        self.lookup(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

/// Compound extension of a file name: everything after the first dot that
/// is not the name's leading character.
///
/// `conn.log.gz` → `log.gz`, `.hidden.log` → `log`, `conn` → `None`.
pub fn extension_of(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let mut chars = name.char_indices();
    let (_, first) = chars.next()?;
    let rest_start = first.len_utf8();
    let dot = name[rest_start..].find('.')?;
    Some(&name[rest_start + dot + 1..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("conn.log")), Some("log"));
        assert_eq!(extension_of(Path::new("conn.log.gz")), Some("log.gz"));
        assert_eq!(extension_of(Path::new("/var/bro/logs/dns.log.bz2")), Some("log.bz2"));
        assert_eq!(extension_of(Path::new("http.ds")), Some("ds"));
        assert_eq!(extension_of(Path::new(".hidden.log")), Some("log"));
        assert_eq!(extension_of(Path::new("conn")), None);
        assert_eq!(extension_of(Path::new("/a.dir/conn")), None);
    }

    #[test]
    fn test_default_registry_supports_bro_extensions() {
        let registry = FormatRegistry::with_defaults();
        assert_eq!(registry.len(), 4);

        assert!(registry.supports("conn.log"));
        assert!(registry.supports("logs/conn.log.gz"));
        assert!(registry.supports("conn.log.bz2"));
        assert!(registry.supports("/tmp/conn.ds"));

        assert_eq!(registry.lookup("conn.log.gz"), Some(LogKind::Ascii));
        assert_eq!(registry.lookup("conn.ds"), Some(LogKind::DataSeries));
    }

    #[test]
    fn test_unregistered_extensions_are_unsupported() {
        let registry = FormatRegistry::with_defaults();
        assert!(!registry.supports("conn.txt"));
        assert!(!registry.supports("conn.log.zip"));
        assert!(!registry.supports("conn"));
        assert!(!registry.supports("conn.2024-01-01.log"));
        assert_eq!(registry.lookup("conn.csv"), None);
    }

    #[test]
    fn test_extension_matching_is_case_sensitive() {
        let registry = FormatRegistry::with_defaults();
        assert!(!registry.supports("conn.LOG"));
        assert!(!registry.supports("conn.Log.gz"));
        assert!(!registry.supports("conn.DS"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = FormatRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.supports("conn.log"));

        registry.register("log", LogKind::DataSeries);
        registry.register("log", LogKind::Ascii);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.lookup("conn.log"), Some(LogKind::Ascii));
    }
}
