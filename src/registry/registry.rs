use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use super::RegistryError;
use super::converters::Converter;
use super::formats::FormatAliases;
use super::kinds::{KindHierarchy, ValueKind};
use crate::mediatype::parse_media_type;

const ANY_MEDIA_TYPE: &str = "*/*";

/// Converters keyed by `(kind, media type)`.
///
/// Built during setup and read-only afterwards; the dispatcher holds it
/// behind an `Arc` snapshot.
#[derive(Clone)]
pub struct ConverterRegistry {
    kinds: KindHierarchy,
    formats: FormatAliases,
    converters: HashMap<(ValueKind, String), Arc<dyn Converter>>,
    /// Media types served by each kind, in registration order.
    kind_media_types: BTreeMap<ValueKind, Vec<String>>,
    /// Kinds serving each media type, in registration order.
    media_type_kinds: HashMap<String, Vec<ValueKind>>,
}

impl ConverterRegistry {
    /// Empty registry with the built-in `object` and `error` kinds declared.
    pub fn new() -> Self {
        let mut kinds = KindHierarchy::new();
        for builtin in [ValueKind::OBJECT, ValueKind::ERROR] {
            // Fresh hierarchy, cannot collide.
            let _ = kinds.declare(builtin, &[]);
        }

        Self {
            kinds,
            formats: FormatAliases::default(),
            converters: HashMap::new(),
            kind_media_types: BTreeMap::new(),
            media_type_kinds: HashMap::new(),
        }
    }

    /// Registry with the stock JSON and error page converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        if let Err(err) = super::defaults::register_defaults(&mut registry) {
            tracing::error!(error = %err, "Failed to register default converters");
        }
        registry
    }

    pub fn declare_kind(
        &mut self,
        kind: ValueKind,
        parents: &[ValueKind],
    ) -> Result<(), RegistryError> {
        self.kinds.declare(kind, parents)
    }

    pub fn kinds(&self) -> &KindHierarchy {
        &self.kinds
    }

    pub fn formats(&self) -> &FormatAliases {
        &self.formats
    }

    pub fn formats_mut(&mut self) -> &mut FormatAliases {
        &mut self.formats
    }

    /// Register `converter` for `kind` under every listed media type.
    ///
    /// An empty list registers under `*/*`. Replacing an existing
    /// `(kind, media type)` entry is allowed and logged.
    pub fn register<I, S>(
        &mut self,
        kind: ValueKind,
        media_types: I,
        converter: Arc<dyn Converter>,
    ) -> Result<(), RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.kinds.contains(kind) {
            return Err(RegistryError::UnknownKind(kind));
        }

        let mut media_types: Vec<String> = media_types
            .into_iter()
            .map(|media_type| {
                let media_type: String = media_type.into();
                media_type.trim().to_string()
            })
            .collect();

        if media_types.is_empty() {
            tracing::warn!(%kind, "Converter registered without media types, defaulting to */*");
            media_types.push(ANY_MEDIA_TYPE.to_string());
        }

        for media_type in &media_types {
            parse_media_type(media_type)?;
        }

        for media_type in media_types {
            let key = (kind, media_type.clone());
            if self.converters.insert(key, converter.clone()).is_some() {
                tracing::warn!(%kind, %media_type, "Overriding converter");
            }

            let served = self.kind_media_types.entry(kind).or_default();
            if !served.contains(&media_type) {
                served.push(media_type.clone());
            }

            let serving = self.media_type_kinds.entry(media_type).or_default();
            if !serving.contains(&kind) {
                serving.push(kind);
            }
        }

        Ok(())
    }

    /// Register by generic format names (`html`, `json`, ...), expanding
    /// aliases into their concrete media types.
    pub fn register_formats(
        &mut self,
        kind: ValueKind,
        formats: &[&str],
        converter: Arc<dyn Converter>,
    ) -> Result<(), RegistryError> {
        let mut media_types: Vec<String> = Vec::new();
        for format in formats {
            for media_type in self.formats.expand(format) {
                if !media_types.contains(&media_type) {
                    media_types.push(media_type);
                }
            }
        }
        self.register(kind, media_types, converter)
    }

    pub fn has_candidates(&self, kind: ValueKind) -> bool {
        self.kinds
            .lineage(kind)
            .iter()
            .any(|k| self.kind_media_types.contains_key(k))
    }

    /// Media types a value of `kind` can be rendered as.
    ///
    /// Ancestors come first, so on equal scores the most specific kind's
    /// media types sit later in the list and win.
    pub fn candidate_media_types_for(&self, kind: ValueKind) -> Vec<String> {
        let mut candidates: Vec<String> = Vec::new();

        for k in self.kinds.lineage(kind) {
            for media_type in self.kind_media_types.get(&k).into_iter().flatten() {
                if !candidates.contains(media_type) {
                    candidates.push(media_type.clone());
                }
            }
        }

        candidates
    }

    /// The most specific kind in `kind`'s lineage that serves `media_type`.
    ///
    /// Equally specific kinds resolve to the one registered first for that
    /// media type.
    pub fn resolve_specificity(&self, kind: ValueKind, media_type: &str) -> Option<ValueKind> {
        let lineage = self.kinds.lineage(kind);
        let serving = self.media_type_kinds.get(media_type)?;

        let matching: Vec<(ValueKind, u32)> = serving
            .iter()
            .filter(|k| lineage.contains(k))
            .filter_map(|k| self.kinds.depth(*k).map(|depth| (*k, depth)))
            .collect();

        let best_depth = matching.iter().map(|(_, depth)| *depth).max()?;
        let mut tied = matching
            .iter()
            .filter(|(_, depth)| *depth == best_depth)
            .map(|(k, _)| *k);

        let winner = tied.next()?;
        let others: Vec<ValueKind> = tied.collect();
        if !others.is_empty() {
            tracing::warn!(
                value_kind = %kind,
                %media_type,
                chosen = %winner,
                ?others,
                "Cannot determine exact converter match, using first registered"
            );
        }

        Some(winner)
    }

    pub fn converter(&self, kind: ValueKind, media_type: &str) -> Option<Arc<dyn Converter>> {
        self.converters
            .get(&(kind, media_type.to_string()))
            .cloned()
    }

    pub fn media_types_of(&self, kind: ValueKind) -> &[String] {
        self.kind_media_types
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ConverterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConverterRegistry")
            .field("kinds", &self.kinds)
            .field("media_types", &self.kind_media_types)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiate::{ResponseHead, Value};
    use crate::registry::convert_with;

    const A: ValueKind = ValueKind::new("a");
    const B: ValueKind = ValueKind::new("b");
    const C: ValueKind = ValueKind::new("c");

    fn constant(text: &'static str) -> Arc<dyn Converter> {
        convert_with(move |_value, _head| Value::from(text))
    }

    fn render(registry: &ConverterRegistry, kind: ValueKind, media_type: &str) -> String {
        let converter = registry.converter(kind, media_type).unwrap();
        match converter.convert(Value::Empty, &mut ResponseHead::default()) {
            Value::Text(text) => text,
            other => panic!("unexpected converter output: {other:?}"),
        }
    }

    fn abc_registry() -> ConverterRegistry {
        let mut registry = ConverterRegistry::new();
        registry.declare_kind(A, &[]).unwrap();
        registry.declare_kind(B, &[A]).unwrap();
        registry.declare_kind(C, &[B]).unwrap();
        registry.register(A, ["text/plain"], constant("A")).unwrap();
        registry.register(B, ["text/html"], constant("B")).unwrap();
        registry.register(C, ["text/plain"], constant("C")).unwrap();
        registry
    }

    #[test]
    fn test_register_requires_declared_kind() {
        let mut registry = ConverterRegistry::new();
        let result = registry.register(A, ["text/plain"], constant("A"));
        assert!(matches!(result, Err(RegistryError::UnknownKind(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_rejects_malformed_media_type() {
        let mut registry = ConverterRegistry::new();
        let result = registry.register(ValueKind::OBJECT, ["json"], constant("x"));
        assert!(matches!(result, Err(RegistryError::MalformedMediaType(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_empty_media_types_default_to_any() {
        let mut registry = ConverterRegistry::new();
        registry
            .register(ValueKind::OBJECT, Vec::<String>::new(), constant("x"))
            .unwrap();
        assert_eq!(registry.media_types_of(ValueKind::OBJECT), ["*/*"]);
    }

    #[test]
    fn test_candidates_include_ancestors() {
        let registry = abc_registry();
        assert_eq!(registry.candidate_media_types_for(A), vec!["text/plain"]);
        assert_eq!(
            registry.candidate_media_types_for(B),
            vec!["text/plain", "text/html"]
        );
        assert_eq!(
            registry.candidate_media_types_for(C),
            vec!["text/plain", "text/html"]
        );
        assert!(registry.has_candidates(C));
        assert!(!registry.has_candidates(ValueKind::ERROR));
    }

    #[test]
    fn test_most_specific_kind_wins() {
        let registry = abc_registry();
        assert_eq!(registry.resolve_specificity(C, "text/plain"), Some(C));
        assert_eq!(registry.resolve_specificity(B, "text/plain"), Some(A));
        assert_eq!(registry.resolve_specificity(C, "text/html"), Some(B));
        assert_eq!(registry.resolve_specificity(A, "text/html"), None);
    }

    #[test]
    fn test_equal_specificity_first_registered_wins() {
        let left = ValueKind::new("left");
        let right = ValueKind::new("right");
        let both = ValueKind::new("both");

        let mut registry = ConverterRegistry::new();
        registry.declare_kind(left, &[]).unwrap();
        registry.declare_kind(right, &[]).unwrap();
        registry.declare_kind(both, &[right, left]).unwrap();
        registry.register(right, ["text/plain"], constant("right")).unwrap();
        registry.register(left, ["text/plain"], constant("left")).unwrap();

        assert_eq!(registry.resolve_specificity(both, "text/plain"), Some(right));
    }

    #[test]
    fn test_reregistration_overwrites_only_its_key() {
        let mut registry = abc_registry();
        assert_eq!(render(&registry, A, "text/plain"), "A");

        registry.register(A, ["text/plain"], constant("A2")).unwrap();

        assert_eq!(render(&registry, A, "text/plain"), "A2");
        assert_eq!(render(&registry, B, "text/html"), "B");
        assert_eq!(render(&registry, C, "text/plain"), "C");
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.media_types_of(A), ["text/plain"]);
    }

    #[test]
    fn test_register_formats_expands_aliases() {
        let mut registry = ConverterRegistry::new();
        registry
            .register_formats(ValueKind::OBJECT, &["html", "json", "text/csv"], constant("x"))
            .unwrap();

        assert_eq!(
            registry.media_types_of(ValueKind::OBJECT),
            [
                "text/html",
                "application/xhtml+xml",
                "application/json",
                "text/json",
                "text/csv"
            ]
        );
    }
}
