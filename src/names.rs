//! Name Registry
//!
//! Tracks every entity, relationship and converse name in one compilation
//! run. Entity and relationship names share a single namespace in the
//! generated interface (`fields_<name>`, `get_relationship_<name>`, ...),
//! so any collision is fatal.
//!
//! Also home to the small naming helpers the compiler shares: field name
//! normalization and "did you mean" lookups.

use std::collections::HashSet;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use tracing::trace;

use crate::error::{CompileError, Result};

/// Registry of names already claimed in this run
#[derive(Debug, Default)]
pub struct NameRegistry {
    seen: HashSet<String>,
    order: Vec<String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a name. Matching is exact and case-sensitive.
    pub fn register(&mut self, name: &str) -> Result<()> {
        if !self.seen.insert(name.to_string()) {
            return Err(CompileError::DuplicateName {
                name: name.to_string(),
            });
        }
        trace!(name, "registered name");
        self.order.push(name.to_string());
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    /// Number of names registered so far
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }
}

/// Turn a schema field name into an output identifier (hyphens become underscores)
pub fn normalize_field_name(name: &str) -> String {
    name.replace('-', "_")
}

/// Length difference allowed when a candidate is matched inside the query
const REVERSE_MATCH_GAP: usize = 1;

/// Best fuzzy match for `query` among `candidates`, if any candidate is close
pub fn closest_match<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a str>,
) -> Option<String> {
    let matcher = SkimMatcherV2::default().ignore_case();

    candidates
        .into_iter()
        .filter(|c| *c != query)
        .filter_map(|c| {
            // Reverse matching catches dropped characters, but only between
            // names of about the same length
            let forward = matcher.fuzzy_match(c, query);
            let backward = if c.len().abs_diff(query.len()) <= REVERSE_MATCH_GAP {
                matcher.fuzzy_match(query, c)
            } else {
                None
            };
            forward.max(backward).map(|score| (score, c))
        })
        .max_by(|a, b| {
            let len_gap = |c: &str| c.len().abs_diff(query.len());
            a.0.cmp(&b.0)
                .then_with(|| len_gap(b.1).cmp(&len_gap(a.1)))
                .then_with(|| b.1.cmp(a.1))
        })
        .map(|(_, c)| c.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_unique_names() {
        let mut registry = NameRegistry::new();
        for name in ["Genome", "Feature", "HasFeature", "IsFeatureOf"] {
            registry.register(name).unwrap();
        }
        assert_eq!(registry.len(), 4);
        assert!(registry.contains("HasFeature"));
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["Genome", "Feature", "HasFeature", "IsFeatureOf"]
        );
    }

    #[test]
    fn test_duplicate_is_rejected() {
        let mut registry = NameRegistry::new();
        registry.register("Genome").unwrap();
        let err = registry.register("Genome").unwrap_err();
        assert!(matches!(err, CompileError::DuplicateName { ref name } if name == "Genome"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_case_sensitive() {
        let mut registry = NameRegistry::new();
        registry.register("Genome").unwrap();
        registry.register("genome").unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_normalize_field_name() {
        assert_eq!(normalize_field_name("pub-date"), "pub_date");
        assert_eq!(normalize_field_name("a-b-c"), "a_b_c");
        // Idempotent
        assert_eq!(normalize_field_name("pub_date"), "pub_date");
        assert_eq!(normalize_field_name(&normalize_field_name("pub-date")), "pub_date");
    }

    #[test]
    fn test_closest_match() {
        let candidates = ["Genome", "Feature", "Subsystem"];
        assert_eq!(closest_match("Genom", candidates), Some("Genome".to_string()));
        assert_eq!(closest_match("features", candidates), Some("Feature".to_string()));
        assert_eq!(closest_match("xyz", candidates), None);
    }

    #[test]
    fn test_short_names_inside_long_query_are_not_suggested() {
        let types = ["int", "float", "string", "date"];
        assert_eq!(closest_match("point", types), None);
        assert_eq!(closest_match("update", types), None);
        assert_eq!(closest_match("strng", types), Some("string".to_string()));
    }
}
