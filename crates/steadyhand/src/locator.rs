//! Locator resolution: semantic element names to driver locators.
//!
//! Test scripts refer to elements by name (`"submit"`, `"acceptCookies"`).
//! The names map to `{type, value}` entries in a read-only locator catalog,
//! usually a JSON file:
//!
//! ```json
//! {
//!   "submit": { "type": "id", "value": "submit-btn" },
//!   "jobTitles": { "type": "css", "value": ".position-title" }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use crate::result::{SteadyError, SteadyResult};

/// Supported locator strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// XPath expression
    XPath,
    /// CSS selector
    Css,
    /// Element `id` attribute
    Id,
    /// Element `name` attribute
    Name,
}

impl Strategy {
    /// All strategies, in catalog order
    pub const ALL: [Self; 4] = [Self::XPath, Self::Css, Self::Id, Self::Name];

    /// Parse a catalog `type` value, ignoring case
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(raw))
    }

    /// Normalized name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::XPath => "xpath",
            Self::Css => "css",
            Self::Id => "id",
            Self::Name => "name",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved (strategy, value) pair identifying zero or more elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// How to match
    pub strategy: Strategy,
    /// What to match
    pub value: String,
}

impl Locator {
    /// Create a locator
    #[must_use]
    pub fn new(strategy: Strategy, value: impl Into<String>) -> Self {
        Self {
            strategy,
            value: value.into(),
        }
    }

    /// XPath locator
    #[must_use]
    pub fn xpath(value: impl Into<String>) -> Self {
        Self::new(Strategy::XPath, value)
    }

    /// CSS locator
    #[must_use]
    pub fn css(value: impl Into<String>) -> Self {
        Self::new(Strategy::Css, value)
    }

    /// Id locator
    #[must_use]
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(Strategy::Id, value)
    }

    /// Name locator
    #[must_use]
    pub fn name(value: impl Into<String>) -> Self {
        Self::new(Strategy::Name, value)
    }

    /// The equivalent CSS selector, where one exists.
    ///
    /// XPath has no CSS equivalent.
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self.strategy {
            Strategy::Css => Some(self.value.clone()),
            Strategy::Id => Some(format!("[id={}]", css_string(&self.value))),
            Strategy::Name => Some(format!("[name={}]", css_string(&self.value))),
            Strategy::XPath => None,
        }
    }

    /// JavaScript expression evaluating to an array of all matches
    #[must_use]
    pub fn to_query_all(&self) -> String {
        match self.to_css() {
            Some(css) => format!("Array.from(document.querySelectorAll({}))", js_string(&css)),
            None => format!(
                "(() => {{ const r = document.evaluate({}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                 return Array.from({{ length: r.snapshotLength }}, \
                 (_, i) => r.snapshotItem(i)); }})()",
                js_string(&self.value)
            ),
        }
    }
}

/// Quote `value` as a CSS string: `"` and `\` are backslash-escaped,
/// control characters become hex escapes.
pub(crate) fn css_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for c in value.chars() {
        match c {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(c);
            }
            c if c.is_control() => quoted.push_str(&format!("\\{:x} ", u32::from(c))),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Quote `value` as a JavaScript string literal
pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "By.{}: {}", self.strategy, self.value)
    }
}

// =============================================================================
// LOCATOR SOURCE
// =============================================================================

/// One raw catalog entry, as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorEntry {
    /// Strategy name, any case
    #[serde(rename = "type")]
    pub kind: String,
    /// Strategy value
    pub value: String,
}

impl LocatorEntry {
    /// Create an entry
    #[must_use]
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
        }
    }
}

/// Read-only lookup of raw locator entries by element name
pub trait LocatorSource {
    /// Look up the entry for `name`
    fn entry(&self, name: &str) -> Option<LocatorEntry>;
}

/// Locator catalog loaded from JSON
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocatorCatalog {
    entries: BTreeMap<String, LocatorEntry>,
}

impl LocatorCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from JSON text
    pub fn from_json_str(json: &str) -> SteadyResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a catalog from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SteadyResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Add or replace an entry
    #[must_use]
    pub fn with_entry(
        mut self,
        name: impl Into<String>,
        kind: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.entries
            .insert(name.into(), LocatorEntry::new(kind, value));
        self
    }

    /// Element names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LocatorSource for LocatorCatalog {
    fn entry(&self, name: &str) -> Option<LocatorEntry> {
        self.entries.get(name).cloned()
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Resolve an element name to a locator.
///
/// Fails with [`SteadyError::Configuration`] if the name is missing or its
/// `type` is not one of xpath, css, id, name.
pub fn resolve<S: LocatorSource + ?Sized>(source: &S, name: &str) -> SteadyResult<Locator> {
    let entry = source
        .entry(name)
        .ok_or_else(|| SteadyError::configuration(name, "no entry in locator catalog"))?;

    let strategy = Strategy::parse(&entry.kind).ok_or_else(|| {
        SteadyError::configuration(name, format!("Unsupported locator type: {}", entry.kind))
    })?;

    Ok(Locator::new(strategy, entry.value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{any, prop_assert_eq, proptest};
    use proptest::strategy::Strategy as _;

    fn catalog() -> LocatorCatalog {
        LocatorCatalog::from_json_str(
            r#"{
                "submit": { "type": "id", "value": "submit-btn" },
                "title": { "type": "XPath", "value": "//h1" },
                "search": { "type": "NAME", "value": "q" },
                "cards": { "type": "css", "value": ".card" },
                "broken": { "type": "linkText", "value": "Careers" }
            }"#,
        )
        .unwrap()
    }

    mod strategy_tests {
        use super::*;

        #[test]
        fn test_parse_is_case_insensitive() {
            assert_eq!(Strategy::parse("XPath"), Some(Strategy::XPath));
            assert_eq!(Strategy::parse("xpath"), Some(Strategy::XPath));
            assert_eq!(Strategy::parse("XPATH"), Some(Strategy::XPath));
        }

        #[test]
        fn test_parse_requires_exact_name() {
            assert_eq!(Strategy::parse(" Css "), None);
            assert_eq!(Strategy::parse("css\n"), None);
        }

        #[test]
        fn test_parse_rejects_unknown() {
            assert_eq!(Strategy::parse("linkText"), None);
            assert_eq!(Strategy::parse(""), None);
        }

        #[test]
        fn test_display_is_normalized() {
            assert_eq!(Strategy::XPath.to_string(), "xpath");
            assert_eq!(Locator::id("submit-btn").to_string(), "By.id: submit-btn");
        }
    }

    mod locator_tests {
        use super::*;

        #[test]
        fn test_to_css() {
            assert_eq!(Locator::css(".a").to_css().as_deref(), Some(".a"));
            assert_eq!(
                Locator::id("submit-btn").to_css().as_deref(),
                Some("[id=\"submit-btn\"]")
            );
            assert_eq!(Locator::name("q").to_css().as_deref(), Some("[name=\"q\"]"));
            assert!(Locator::xpath("//a").to_css().is_none());
        }

        #[test]
        fn test_to_css_escapes_per_css() {
            assert_eq!(
                Locator::id(r#"a"b\c"#).to_css().as_deref(),
                Some(r#"[id="a\"b\\c"]"#)
            );
            assert_eq!(Locator::name("café").to_css().as_deref(), Some("[name=\"café\"]"));
            assert_eq!(Locator::id("a\nb").to_css().as_deref(), Some("[id=\"a\\a b\"]"));
        }

        #[test]
        fn test_query_all_quotes_as_js() {
            let query = Locator::id("café").to_query_all();
            assert_eq!(query, r#"Array.from(document.querySelectorAll("[id=\"café\"]"))"#);
        }

        #[test]
        fn test_query_all_xpath_uses_snapshot() {
            let query = Locator::xpath("//li").to_query_all();
            assert!(query.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
            assert!(query.contains("\"//li\""));
        }
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_resolve_id() {
            let locator = resolve(&catalog(), "submit").unwrap();
            assert_eq!(locator, Locator::id("submit-btn"));
        }

        #[test]
        fn test_resolve_normalizes_type() {
            assert_eq!(resolve(&catalog(), "title").unwrap().strategy, Strategy::XPath);
            assert_eq!(resolve(&catalog(), "search").unwrap().strategy, Strategy::Name);
        }

        #[test]
        fn test_missing_name_is_configuration_error() {
            let err = resolve(&catalog(), "nope").unwrap_err();
            match err {
                SteadyError::Configuration { element, .. } => assert_eq!(element, "nope"),
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_unsupported_type_is_configuration_error() {
            let err = resolve(&catalog(), "broken").unwrap_err();
            assert!(matches!(err, SteadyError::Configuration { .. }));
            assert!(err.to_string().contains("Unsupported locator type: linkText"));
        }

        #[test]
        fn test_catalog_builder_and_names() {
            let catalog = LocatorCatalog::new()
                .with_entry("b", "css", ".b")
                .with_entry("a", "id", "a");
            assert_eq!(catalog.len(), 2);
            assert_eq!(catalog.names().collect::<Vec<_>>(), vec!["a", "b"]);
        }

        #[test]
        fn test_catalog_load_from_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("locators.json");
            std::fs::write(&path, r##"{"go": {"type": "css", "value": "#go"}}"##).unwrap();

            let catalog = LocatorCatalog::load(&path).unwrap();
            assert_eq!(resolve(&catalog, "go").unwrap(), Locator::css("#go"));
        }

        #[test]
        fn test_catalog_rejects_malformed_json() {
            let err = LocatorCatalog::from_json_str(r#"{"go": {"type": "css"}}"#).unwrap_err();
            assert!(matches!(err, SteadyError::Json(_)));
        }
    }

    fn any_case(word: &'static str) -> impl proptest::strategy::Strategy<Value = String> {
        proptest::collection::vec(any::<bool>(), word.len()).prop_map(move |upper| {
            word.chars()
                .zip(upper)
                .map(|(c, up)| if up { c.to_ascii_uppercase() } else { c })
                .collect()
        })
    }

    proptest! {
        /// Any casing of a supported type resolves to the same strategy
        #[test]
        fn prop_type_matching_ignores_case(kind in any_case("xpath")) {
            let catalog = LocatorCatalog::new().with_entry("el", kind, "//div");
            prop_assert_eq!(resolve(&catalog, "el").unwrap().strategy, Strategy::XPath);
        }
    }
}
