// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// IPP attribute model: tagged values and ordered attribute sets.
//
// Every IPP attribute is a (name, tagged value) pair.  The value tag
// determines the wire syntax (RFC 8010 §3.5.2); here the tag is carried by
// the enum variant itself, so a value can never disagree with its tag.
// Attribute order matters on the wire (attributes-charset must come first in
// a request), so `AttributeSet` preserves insertion order rather than
// sorting by name.

use serde::{Deserialize, Serialize};

/// IPP value tags handled by this client.
///
/// This is a projection of [`AttrValue`] used for diagnostics and by the
/// wire codec; `BeginCollection` and `List` cover the two non-scalar shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tag {
    Charset,
    NaturalLanguage,
    Uri,
    Keyword,
    MimeMediaType,
    Integer,
    Enum,
    Boolean,
    TextWithoutLanguage,
    NameWithoutLanguage,
    Resolution,
    RangeOfInteger,
    BeginCollection,
    List,
}

/// A single IPP attribute value.
///
/// Scalar variants carry primitive values; `Collection` carries a nested
/// attribute set (e.g. `media-col`); `List` carries a 1setOf sequence as
/// returned for multi-valued printer attributes such as
/// `document-format-supported`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttrValue {
    Charset(String),
    NaturalLanguage(String),
    Uri(String),
    Keyword(String),
    Mime(String),
    Integer(i32),
    Enum(i32),
    Boolean(bool),
    Text(String),
    Name(String),
    /// Cross-feed (x) and feed (y) resolution plus a units code
    /// (3 = dots per inch, 4 = dots per centimetre).
    Resolution { x: i32, y: i32, units: i8 },
    Range { low: i32, high: i32 },
    Collection(AttributeSet),
    List(Vec<AttrValue>),
}

impl AttrValue {
    /// The protocol tag this value carries.
    pub fn tag(&self) -> Tag {
        match self {
            Self::Charset(_) => Tag::Charset,
            Self::NaturalLanguage(_) => Tag::NaturalLanguage,
            Self::Uri(_) => Tag::Uri,
            Self::Keyword(_) => Tag::Keyword,
            Self::Mime(_) => Tag::MimeMediaType,
            Self::Integer(_) => Tag::Integer,
            Self::Enum(_) => Tag::Enum,
            Self::Boolean(_) => Tag::Boolean,
            Self::Text(_) => Tag::TextWithoutLanguage,
            Self::Name(_) => Tag::NameWithoutLanguage,
            Self::Resolution { .. } => Tag::Resolution,
            Self::Range { .. } => Tag::RangeOfInteger,
            Self::Collection(_) => Tag::BeginCollection,
            Self::List(_) => Tag::List,
        }
    }

    /// Borrow the value as a string, for any string-syntax tag.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Charset(s)
            | Self::NaturalLanguage(s)
            | Self::Uri(s)
            | Self::Keyword(s)
            | Self::Mime(s)
            | Self::Text(s)
            | Self::Name(s) => Some(s),
            _ => None,
        }
    }

    /// Integer view covering both `integer` and `enum` wire syntaxes.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Integer(v) | Self::Enum(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_resolution(&self) -> Option<(i32, i32, i8)> {
        match self {
            Self::Resolution { x, y, units } => Some((*x, *y, *units)),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&AttributeSet> {
        match self {
            Self::Collection(set) => Some(set),
            _ => None,
        }
    }

    /// All string values carried by this attribute: the elements of a
    /// `List`, or the value itself for a scalar.  Non-string elements are
    /// skipped.  Printers answer single-valued and 1setOf attributes
    /// interchangeably, so callers reading e.g. `document-format-supported`
    /// should always go through this.
    pub fn string_values(&self) -> Vec<&str> {
        match self {
            Self::List(values) => values.iter().filter_map(AttrValue::as_str).collect(),
            other => other.as_str().into_iter().collect(),
        }
    }
}

/// An ordered set of named attributes with unique names.
///
/// Insertion order is preserved; inserting an existing name replaces the
/// value in place (the attribute keeps its original position).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeSet {
    entries: Vec<(String, AttrValue)>,
}

impl AttributeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an attribute.
    pub fn insert(&mut self, name: impl Into<String>, value: AttrValue) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Remove an attribute, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let idx = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FromIterator<(String, AttrValue)> for AttributeSet {
    fn from_iter<I: IntoIterator<Item = (String, AttrValue)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = (&'a str, &'a AttrValue);
    type IntoIter = Box<dyn Iterator<Item = (&'a str, &'a AttrValue)> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_preserves_order() {
        let mut set = AttributeSet::new();
        set.insert("attributes-charset", AttrValue::Charset("utf-8".into()));
        set.insert("printer-uri", AttrValue::Uri("ipp://p/".into()));
        set.insert("job-name", AttrValue::Name("doc.pdf".into()));

        let names: Vec<_> = set.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["attributes-charset", "printer-uri", "job-name"]);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut set = AttributeSet::new();
        set.insert("media", AttrValue::Keyword("iso_a4_210x297mm".into()));
        set.insert("sides", AttrValue::Keyword("one-sided".into()));
        set.insert("media", AttrValue::Keyword("na_letter_8.5x11in".into()));

        assert_eq!(set.len(), 2);
        let names: Vec<_> = set.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["media", "sides"]);
        assert_eq!(
            set.get("media").and_then(AttrValue::as_str),
            Some("na_letter_8.5x11in")
        );
    }

    #[test]
    fn remove_returns_value() {
        let mut set = AttributeSet::new();
        set.insert("sides", AttrValue::Keyword("two-sided-long-edge".into()));
        let removed = set.remove("sides");
        assert_eq!(
            removed.as_ref().and_then(AttrValue::as_str),
            Some("two-sided-long-edge")
        );
        assert!(!set.contains("sides"));
        assert!(set.remove("sides").is_none());
    }

    #[test]
    fn int_view_covers_integer_and_enum() {
        assert_eq!(AttrValue::Integer(4).as_int(), Some(4));
        assert_eq!(AttrValue::Enum(5).as_int(), Some(5));
        assert_eq!(AttrValue::Keyword("4".into()).as_int(), None);
    }

    #[test]
    fn string_values_flattens_lists_and_scalars() {
        let list = AttrValue::List(vec![
            AttrValue::Mime("application/pdf".into()),
            AttrValue::Mime("image/urf".into()),
            AttrValue::Integer(1),
        ]);
        assert_eq!(list.string_values(), ["application/pdf", "image/urf"]);

        let single = AttrValue::Mime("image/jpeg".into());
        assert_eq!(single.string_values(), ["image/jpeg"]);

        assert!(AttrValue::Integer(1).string_values().is_empty());
    }

    #[test]
    fn collection_nests_attribute_sets() {
        let mut size = AttributeSet::new();
        size.insert("x-dimension", AttrValue::Integer(21000));
        size.insert("y-dimension", AttrValue::Integer(29700));

        let mut col = AttributeSet::new();
        col.insert("media-size", AttrValue::Collection(size));

        let value = AttrValue::Collection(col);
        assert_eq!(value.tag(), Tag::BeginCollection);
        let inner = value
            .as_collection()
            .and_then(|c| c.get("media-size"))
            .and_then(AttrValue::as_collection)
            .expect("nested collection");
        assert_eq!(
            inner.get("x-dimension").and_then(AttrValue::as_int),
            Some(21000)
        );
    }
}
