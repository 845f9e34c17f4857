//! Typed view over prefix-encoded label strings.
//!
//! # Design
//! - Labels are parsed into [`Label`] as soon as they are read; reconciliation
//!   logic never inspects prefix characters directly.
//! - Encoding is canonical: `parse(encode(label)) == label` for every label
//!   `encode` can produce, and non-canonical tier spellings (`tier-01`)
//!   parse as [`Label::Other`] so exact-string removal stays reliable.

use std::fmt::{self, Display, Formatter};

use regex::Regex;
use tlever_config::Prefixes;

use crate::error::{ReconcileError, ReconcileResult};

const TIER_STEM: &str = "tier-";
const FREE_SUFFIX: &str = "free";

/// Tier encoded in a tier label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TierLabel {
    /// Numeric ladder position.
    Index(usize),
    /// Exempt from the ladder.
    Free,
}

impl Display for TierLabel {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(index) => write!(formatter, "{index}"),
            Self::Free => formatter.write_str(FREE_SUFFIX),
        }
    }
}

/// A daemon label after prefix dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// `<tier-prefix>tier-<N>` or `<tier-prefix>tier-free`.
    Tier(TierLabel),
    /// `<category-prefix><relative-path>`.
    Category(String),
    /// `<tag-prefix><name>`.
    Tag(String),
    /// Anything else, kept verbatim.
    Other(String),
}

/// Converts between raw label strings and [`Label`] using configured prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelCodec {
    tier: char,
    category: char,
    tag: char,
}

impl From<&Prefixes> for LabelCodec {
    fn from(prefixes: &Prefixes) -> Self {
        Self::new(prefixes.tiers, prefixes.categories, prefixes.tags)
    }
}

impl LabelCodec {
    /// Codec for the given prefixes; callers guarantee they are distinct.
    #[must_use]
    pub const fn new(tier: char, category: char, tag: char) -> Self {
        Self { tier, category, tag }
    }

    /// Parse a raw label.
    #[must_use]
    pub fn parse(&self, raw: &str) -> Label {
        let mut chars = raw.chars();
        let Some(first) = chars.next() else {
            return Label::Other(String::new());
        };
        let rest = chars.as_str();

        if first == self.tier {
            return parse_tier(rest).map_or_else(|| Label::Other(raw.to_string()), Label::Tier);
        }
        if rest.is_empty() {
            return Label::Other(raw.to_string());
        }
        if first == self.category {
            Label::Category(rest.to_string())
        } else if first == self.tag {
            Label::Tag(rest.to_string())
        } else {
            Label::Other(raw.to_string())
        }
    }

    /// Parse every label in order.
    #[must_use]
    pub fn parse_all<S: AsRef<str>>(&self, raw: &[S]) -> Vec<Label> {
        raw.iter().map(|label| self.parse(label.as_ref())).collect()
    }

    /// Serialise a label to its wire string.
    #[must_use]
    pub fn encode(&self, label: &Label) -> String {
        match label {
            Label::Tier(tier) => format!("{}{TIER_STEM}{tier}", self.tier),
            Label::Category(path) => format!("{}{path}", self.category),
            Label::Tag(name) => format!("{}{name}", self.tag),
            Label::Other(raw) => raw.clone(),
        }
    }

    /// Wire string of numeric tier `index`.
    #[must_use]
    pub fn tier_label(&self, index: usize) -> String {
        self.encode(&Label::Tier(TierLabel::Index(index)))
    }

    /// Wire string of the free tier.
    #[must_use]
    pub fn free_label(&self) -> String {
        self.encode(&Label::Tier(TierLabel::Free))
    }

    /// Pattern matching any numeric tier label inside a comma-joined label
    /// list.
    ///
    /// # Errors
    ///
    /// Returns `ReconcileError::Pattern` if the pattern fails to compile.
    pub fn numeric_tier_pattern(&self) -> ReconcileResult<Regex> {
        let pattern = format!(
            r"(?:^|,){}{TIER_STEM}\d+(?:,|$)",
            regex::escape(&self.tier.to_string())
        );
        Regex::new(&pattern).map_err(|source| ReconcileError::Pattern { pattern, source })
    }
}

fn parse_tier(rest: &str) -> Option<TierLabel> {
    let suffix = rest.strip_prefix(TIER_STEM)?;
    if suffix == FREE_SUFFIX {
        return Some(TierLabel::Free);
    }
    let index = suffix.parse::<usize>().ok()?;
    (index.to_string() == suffix).then_some(TierLabel::Index(index))
}
