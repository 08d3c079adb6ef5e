//! Composite key codecs
//!
//! Fields, tables, section statuses and image galleries are addressed by a
//! `(section_id, group_id?, name)` triple flattened into a single string:
//!
//! - `3.1.2::A.1::poblacion_total` (group-scoped)
//! - `3.1.1::descripcion` (document-wide)
//!
//! Scopes drop the trailing name: `3.1.2::A.1` or `3.1.1`.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Separator between key segments
pub const KEY_DELIMITER: &str = "::";

/// Validated `(section_id, group_id?, name)` triple
///
/// Serializes as its string form so it can be used directly as a map key in
/// snapshots.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompositeKey {
    section_id: String,
    group_id: Option<String>,
    name: String,
}

impl CompositeKey {
    /// Build a key from its parts
    ///
    /// # Errors
    /// Returns error if any present segment is empty or cannot be parsed back
    /// unambiguously.
    pub fn new(section_id: &str, group_id: Option<&str>, name: &str) -> Result<Self, KeyError> {
        check_segment(section_id)?;
        if let Some(group) = group_id {
            check_segment(group)?;
        }
        check_segment(name)?;
        Ok(Self {
            section_id: section_id.to_string(),
            group_id: group_id.map(str::to_string),
            name: name.to_string(),
        })
    }

    /// Owning section
    #[inline]
    #[must_use]
    pub fn section_id(&self) -> &str {
        &self.section_id
    }

    /// Owning group, if group-scoped
    #[inline]
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    /// Field or table name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Scope (section + group) this key lives in
    #[must_use]
    pub fn scope(&self) -> ScopeKey {
        ScopeKey {
            section_id: self.section_id.clone(),
            group_id: self.group_id.clone(),
        }
    }

    /// Split back into owned parts
    #[must_use]
    pub fn into_parts(self) -> (String, Option<String>, String) {
        (self.section_id, self.group_id, self.name)
    }

    /// Same section and name under another group
    ///
    /// # Errors
    /// Returns error if `group_id` is not a valid segment.
    pub fn with_group(&self, group_id: &str) -> Result<Self, KeyError> {
        Self::new(&self.section_id, Some(group_id), &self.name)
    }
}

impl Display for CompositeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.group_id {
            Some(group) => write!(
                f,
                "{}{KEY_DELIMITER}{group}{KEY_DELIMITER}{}",
                self.section_id, self.name
            ),
            None => write!(f, "{}{KEY_DELIMITER}{}", self.section_id, self.name),
        }
    }
}

impl FromStr for CompositeKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(KEY_DELIMITER).collect();
        match parts.as_slice() {
            [section, name] => Self::new(section, None, name),
            [section, group, name] => Self::new(section, Some(group), name),
            _ => Err(KeyError::PartCount {
                key: s.to_string(),
                found: parts.len(),
            }),
        }
    }
}

impl TryFrom<String> for CompositeKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CompositeKey> for String {
    fn from(key: CompositeKey) -> Self {
        key.to_string()
    }
}

/// `(section_id, group_id?)` pair used for section status and image galleries
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScopeKey {
    section_id: String,
    group_id: Option<String>,
}

impl ScopeKey {
    /// Build a scope key
    ///
    /// # Errors
    /// Returns error if a present segment is empty or ambiguous.
    pub fn new(section_id: &str, group_id: Option<&str>) -> Result<Self, KeyError> {
        check_segment(section_id)?;
        if let Some(group) = group_id {
            check_segment(group)?;
        }
        Ok(Self {
            section_id: section_id.to_string(),
            group_id: group_id.map(str::to_string),
        })
    }

    /// Owning section
    #[inline]
    #[must_use]
    pub fn section_id(&self) -> &str {
        &self.section_id
    }

    /// Owning group
    #[inline]
    #[must_use]
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    /// Same section under another group
    ///
    /// # Errors
    /// Returns error if `group_id` is not a valid segment.
    pub fn with_group(&self, group_id: &str) -> Result<Self, KeyError> {
        Self::new(&self.section_id, Some(group_id))
    }
}

impl Display for ScopeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.group_id {
            Some(group) => write!(f, "{}{KEY_DELIMITER}{group}", self.section_id),
            None => f.write_str(&self.section_id),
        }
    }
}

impl FromStr for ScopeKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(KEY_DELIMITER).collect();
        match parts.as_slice() {
            [section] => Self::new(section, None),
            [section, group] => Self::new(section, Some(group)),
            _ => Err(KeyError::PartCount {
                key: s.to_string(),
                found: parts.len(),
            }),
        }
    }
}

impl TryFrom<String> for ScopeKey {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScopeKey> for String {
    fn from(key: ScopeKey) -> Self {
        key.to_string()
    }
}

/// Build a field key string
///
/// # Errors
/// See [`CompositeKey::new`].
pub fn generate_key(
    section_id: &str,
    group_id: Option<&str>,
    name: &str,
) -> Result<String, KeyError> {
    CompositeKey::new(section_id, group_id, name).map(|key| key.to_string())
}

/// Parse a field or table key string back into its parts
///
/// # Errors
/// Returns error if the string does not have two or three segments.
pub fn parse_key(key: &str) -> Result<(String, Option<String>, String), KeyError> {
    key.parse::<CompositeKey>().map(CompositeKey::into_parts)
}

/// Build a table key string. Tables share the field key format.
///
/// # Errors
/// See [`CompositeKey::new`].
pub fn generate_table_key(
    section_id: &str,
    group_id: Option<&str>,
    table_name: &str,
) -> Result<String, KeyError> {
    generate_key(section_id, group_id, table_name)
}

/// Build an image gallery key string
///
/// # Errors
/// See [`ScopeKey::new`].
pub fn generate_image_group_key(
    section_id: &str,
    group_id: Option<&str>,
) -> Result<String, KeyError> {
    ScopeKey::new(section_id, group_id).map(|key| key.to_string())
}

/// Parse an image gallery key string
///
/// # Errors
/// Returns error if the string does not have one or two segments.
pub fn parse_image_group_key(key: &str) -> Result<(String, Option<String>), KeyError> {
    let scope: ScopeKey = key.parse()?;
    Ok((scope.section_id, scope.group_id))
}

// A segment ending or starting with ':' would merge with the delimiter.
fn check_segment(segment: &str) -> Result<(), KeyError> {
    if segment.is_empty() {
        return Err(KeyError::EmptySegment);
    }
    if segment.contains(KEY_DELIMITER) || segment.starts_with(':') || segment.ends_with(':') {
        return Err(KeyError::AmbiguousSegment(segment.to_string()));
    }
    Ok(())
}

/// Errors related to composite keys
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    /// Empty segment
    #[error("key contains empty segment")]
    EmptySegment,

    /// Segment clashes with the delimiter
    #[error("segment '{0}' clashes with the '::' delimiter")]
    AmbiguousSegment(String),

    /// Wrong number of segments
    #[error("key '{key}' has {found} segments")]
    PartCount { key: String, found: usize },
}
