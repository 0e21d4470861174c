//! Core types for schema generation.

use serde::{Deserialize, Serialize};

/// Value of `@context` on every generated document.
pub const SCHEMA_CONTEXT: &str = "https://schema.org";

/// Availability marker carried by every generated offer.
pub const IN_STOCK: &str = "https://schema.org/InStock";

/// Base URL of the map link synthesized next to `geo`.
pub const MAP_LINK_BASE: &str = "https://maps.google.com/?q=";

/// Domain used by placeholder URLs when the form has no website.
pub const PLACEHOLDER_DOMAIN: &str = "YOUR-DOMAIN";

/// Kind of medical entity the document describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Practitioner,
    Clinic,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Practitioner => "practitioner",
            EntityKind::Clinic => "clinic",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "practitioner" => Some(EntityKind::Practitioner),
            "clinic" => Some(EntityKind::Clinic),
            _ => None,
        }
    }
}

/// Number of workplaces/departments attached to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cardinality {
    Single,
    Multiple,
}

impl Cardinality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cardinality::Single => "single",
            Cardinality::Multiple => "multiple",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" => Some(Cardinality::Single),
            "multiple" => Some(Cardinality::Multiple),
            _ => None,
        }
    }
}

/// Which variant of document to build.
///
/// Chosen once per session. A shape is always fully resolved; callers
/// gate on missing selections before building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flavor", rename_all = "camelCase")]
pub enum Shape {
    /// Practitioner or clinic, with one or several locations.
    Medical {
        entity: EntityKind,
        cardinality: Cardinality,
    },
    /// Generic local business tagged with free-form schema.org types.
    #[serde(rename_all = "camelCase")]
    LocalBusiness { business_types: Vec<String> },
    /// Single service offered by one or more providers.
    Service,
}

impl Shape {
    pub fn medical(entity: EntityKind, cardinality: Cardinality) -> Self {
        Shape::Medical {
            entity,
            cardinality,
        }
    }

    pub fn local_business<I, S>(business_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Shape::LocalBusiness {
            business_types: business_types.into_iter().map(Into::into).collect(),
        }
    }

    /// Short label used in file names and history listings.
    pub fn label(&self) -> String {
        match self {
            Shape::Medical {
                entity,
                cardinality,
            } => format!("{}-{}", entity.as_str(), cardinality.as_str()),
            Shape::LocalBusiness { .. } => "local-business".to_string(),
            Shape::Service => "service".to_string(),
        }
    }
}

/// What to emit for a blank field that has a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlankPolicy {
    /// Leave the field out of the document.
    #[default]
    Omit,
    /// Substitute the template's visible placeholder (e.g. "YOUR CLINIC NAME").
    Placeholder,
}

/// Options for document construction.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub blank_policy: BlankPolicy,
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the blank-field policy.
    pub fn blank_policy(mut self, policy: BlankPolicy) -> Self {
        self.blank_policy = policy;
        self
    }

    pub fn placeholders(&self) -> bool {
        self.blank_policy == BlankPolicy::Placeholder
    }
}

/// True when the string holds nothing but whitespace.
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Lowercase, hyphen-separated form of a name for URLs and fragment ids.
///
/// Runs of whitespace, `-` and `_` collapse to one hyphen; other
/// punctuation is dropped.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_hyphen = true;
        }
    }

    slug
}

/// Bare domain of a website URL: scheme and trailing slashes removed.
pub fn domain_of(url: &str) -> String {
    let trimmed = url.trim();
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    without_scheme.trim_end_matches('/').to_string()
}

/// Parse a user-entered decimal. Blank or malformed input yields `None`.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}
