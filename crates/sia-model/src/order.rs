//! Canonical section order
//!
//! The report's table of contents is a hand-authored list of section ids. It
//! drives navigation and the global figure/table numbering, so it is data,
//! never derived from the ids themselves.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Ordered, duplicate-free list of section ids
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct SectionOrder {
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl SectionOrder {
    /// Build an order from section ids
    ///
    /// # Errors
    /// Returns error if a section id appears twice.
    pub fn new<I, S>(ids: I) -> Result<Self, OrderError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        let mut positions = HashMap::with_capacity(ids.len());
        for (index, id) in ids.iter().enumerate() {
            if positions.insert(id.clone(), index).is_some() {
                return Err(OrderError::DuplicateSection(id.clone()));
            }
        }
        Ok(Self { ids, positions })
    }

    /// Position of a section in the document, if listed
    #[inline]
    #[must_use]
    pub fn position(&self, section_id: &str) -> Option<usize> {
        self.positions.get(section_id).copied()
    }

    /// Whether the section is part of the canonical order
    #[inline]
    #[must_use]
    pub fn contains(&self, section_id: &str) -> bool {
        self.positions.contains_key(section_id)
    }

    /// Section ids in document order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    /// Number of listed sections
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when no section is listed
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Document order of two section ids
    ///
    /// Listed sections come first, by position. Unlisted ones follow in
    /// natural dotted order.
    #[must_use]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match (self.position(a), self.position(b)) {
            (Some(left), Some(right)) => left.cmp(&right),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => natural_cmp(a, b),
        }
    }
}

impl TryFrom<Vec<String>> for SectionOrder {
    type Error = OrderError;

    fn try_from(ids: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(ids)
    }
}

impl From<SectionOrder> for Vec<String> {
    fn from(order: SectionOrder) -> Self {
        order.ids
    }
}

/// Errors building a [`SectionOrder`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    /// Same section listed twice
    #[error("section '{0}' listed more than once")]
    DuplicateSection(String),
}

/// Compare dotted section ids segment by segment
///
/// Numeric segments compare as numbers, so `3.1.2` sorts before `3.1.10`.
/// Mixed segments fall back to plain string order.
#[must_use]
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.split('.');
    let mut right = b.split('.');
    loop {
        match (left.next(), right.next()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let ord = match (l.parse::<u64>(), r.parse::<u64>()) {
                    (Ok(ln), Ok(rn)) => ln.cmp(&rn),
                    _ => l.cmp(r),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
        }
    }
}
