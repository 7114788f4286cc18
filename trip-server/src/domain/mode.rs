//! Transport modes and mode filtering.

use std::fmt;

use serde::{Serialize, Serializer};

/// Broad classification of a transport mode.
///
/// The directory carries free-form mode names ("Jeepney", "LRT",
/// "UV Express"); each name is classified into one of these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModeKind {
    Bus,
    Jeepney,
    Train,
    Tricycle,
    Other,
}

impl ModeKind {
    /// Classify a free-form mode name.
    pub fn classify(name: &str) -> Self {
        let lower = name.to_lowercase();
        if lower.contains("jeep") {
            ModeKind::Jeepney
        } else if lower.contains("bus") {
            ModeKind::Bus
        } else if ["train", "rail", "lrt", "mrt", "pnr"]
            .iter()
            .any(|t| lower.contains(t))
        {
            ModeKind::Train
        } else if lower.contains("tricycle") || lower.contains("trike") {
            ModeKind::Tricycle
        } else {
            ModeKind::Other
        }
    }

    /// Line color used when drawing a ride leg of this kind.
    pub fn color_hint(&self) -> &'static str {
        match self {
            ModeKind::Bus => "#2563EB",
            ModeKind::Jeepney => "#F7A600",
            ModeKind::Train => "#16A34A",
            ModeKind::Tricycle => "#DB2777",
            ModeKind::Other => "#7C3AED",
        }
    }

    /// Icon name used when drawing a ride leg of this kind.
    pub fn icon_hint(&self) -> &'static str {
        match self {
            ModeKind::Bus => "bus",
            ModeKind::Jeepney => "jeepney",
            ModeKind::Train => "train",
            ModeKind::Tricycle => "tricycle",
            ModeKind::Other => "route",
        }
    }
}

/// The transport mode of a route: its name as published plus its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransportMode {
    name: String,
    kind: ModeKind,
}

impl TransportMode {
    /// Create a mode from its published name. Surrounding whitespace is trimmed.
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        let kind = ModeKind::classify(&name);
        Self { name, kind }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ModeKind {
        self.kind
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for TransportMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// Which transport modes a search may use.
///
/// A token filter admits a mode when any token is a case-insensitive
/// substring of the mode's name. A token filter with no tokens admits
/// nothing. The unrestricted filter admits every mode without matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeFilter {
    /// `None` admits every mode. Otherwise lowercased, trimmed,
    /// deduplicated and sorted.
    tokens: Option<Vec<String>>,
}

impl ModeFilter {
    /// Build a filter from raw tokens. Blank tokens are dropped.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokens: Vec<String> = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        tokens.sort();
        tokens.dedup();
        Self {
            tokens: Some(tokens),
        }
    }

    /// A filter that admits every mode, whatever its name.
    pub fn all() -> Self {
        Self { tokens: None }
    }

    /// Whether `mode` passes the filter.
    pub fn matches(&self, mode: &TransportMode) -> bool {
        let Some(tokens) = &self.tokens else {
            return true;
        };
        let name = mode.name().to_lowercase();
        tokens.iter().any(|token| name.contains(token.as_str()))
    }

    /// Whether this is the unrestricted filter.
    pub fn admits_all(&self) -> bool {
        self.tokens.is_none()
    }

    /// The filter's tokens; empty for the unrestricted filter.
    pub fn tokens(&self) -> &[String] {
        self.tokens.as_deref().unwrap_or_default()
    }

    /// Whether the filter admits nothing.
    pub fn is_empty(&self) -> bool {
        self.tokens.as_ref().is_some_and(Vec::is_empty)
    }

    /// Canonical string form, stable for equal filters.
    pub fn cache_key(&self) -> String {
        match &self.tokens {
            None => "*".to_string(),
            Some(tokens) => tokens.join(","),
        }
    }
}

impl Default for ModeFilter {
    fn default() -> Self {
        Self::all()
    }
}
