//! Declarative mapping policy.
//!
//! Deserialized from the `[mapping]` table of the configuration file. The
//! `type` tag selects the variant:
//!
//! ```toml
//! [mapping]
//! type = "auto-balanced"
//! domains = ["img1.example.com", "img2.example.com"]
//! conditions = { extensions = ["png", "jpg"] }
//! ```

use serde::{Deserialize, Serialize};

/// A mapping policy tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MappingPolicy {
    /// One domain, optionally restricted to (or excluded from) extensions.
    Simple {
        domain: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conditions: Option<Conditions>,
    },

    /// A fallback domain plus ordered nested mappings.
    Complex {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback_domain: Option<String>,
        #[serde(default)]
        domains: Vec<MappingPolicy>,
    },

    /// Several domains sharing the load for a set of extensions.
    AutoBalanced {
        domains: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        conditions: Option<Conditions>,
    },

    /// Any `type` tag not listed above. Rejected at compile time.
    #[serde(other)]
    Unknown,
}

impl MappingPolicy {
    /// Conditions attached to this mapping, if the variant carries any.
    pub fn conditions(&self) -> Option<&Conditions> {
        match self {
            MappingPolicy::Simple { conditions, .. }
            | MappingPolicy::AutoBalanced { conditions, .. } => conditions.as_ref(),
            MappingPolicy::Complex { .. } | MappingPolicy::Unknown => None,
        }
    }
}

/// Applicability conditions of a mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Conditions {
    /// File extensions (without leading dot) this mapping applies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,

    /// Negated conditions: extensions this mapping must never serve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<NegatedConditions>,
}

impl Conditions {
    /// Include list, if present and non-empty.
    pub fn included(&self) -> Option<&[String]> {
        self.extensions.as_deref().filter(|e| !e.is_empty())
    }

    /// Exclude list, if present and non-empty.
    pub fn excluded(&self) -> Option<&[String]> {
        self.not
            .as_ref()
            .and_then(|n| n.extensions.as_deref())
            .filter(|e| !e.is_empty())
    }

    /// True when neither list restricts anything.
    pub fn is_empty(&self) -> bool {
        self.included().is_none() && self.excluded().is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct NegatedConditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_complex_tree() {
        let policy: MappingPolicy = toml::from_str(
            r#"
            type = "complex"
            fallback_domain = "f.example.com"

            [[domains]]
            type = "simple"
            domain = "css.example.com"
            conditions = { extensions = ["css"] }

            [[domains]]
            type = "auto-balanced"
            domains = ["a.example.com", "b.example.com"]
            conditions = { extensions = ["png", "jpg"] }
            "#,
        )
        .unwrap();

        match policy {
            MappingPolicy::Complex { fallback_domain, domains } => {
                assert_eq!(fallback_domain.as_deref(), Some("f.example.com"));
                assert_eq!(domains.len(), 2);
                assert!(matches!(domains[1], MappingPolicy::AutoBalanced { .. }));
            }
            other => panic!("unexpected policy: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_type_is_kept_for_compiler() {
        let policy: MappingPolicy =
            serde_json::from_str(r#"{"type": "round-robin", "domain": "x"}"#).unwrap();
        assert_eq!(policy, MappingPolicy::Unknown);
    }

    #[test]
    fn test_empty_lists_are_no_condition() {
        let conditions = Conditions {
            extensions: Some(vec![]),
            not: Some(NegatedConditions { extensions: Some(vec![]) }),
        };
        assert!(conditions.is_empty());
        assert!(conditions.included().is_none());
    }
}
