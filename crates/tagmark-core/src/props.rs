//! Macro property parsing.
//!
//! Parses the free-form text trailing a macro name: `[name key=value, other="a, b"]`.

use std::collections::HashMap;
use std::collections::hash_map::Iter;

/// Key/value properties decoded from a macro tag.
///
/// Parsing never fails. Malformed input degrades to fewer entries.
///
/// # Example
///
/// ```
/// use tagmark_core::Properties;
///
/// let props = Properties::parse(r#"name="virk,nice", age=22"#);
/// assert_eq!(props.get("name"), Some("virk,nice"));
/// assert_eq!(props.get("age"), Some("22"));
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Properties {
    entries: HashMap<String, String>,
}

impl Properties {
    /// Parse raw property text into key/value pairs.
    ///
    /// Pairs are separated by commas, keys and values by `=`. Spaces outside
    /// quotes are dropped. A quote opens a quoted run only after `=` or a space,
    /// and closes only when followed by a space, a comma or the end of input,
    /// so interior quotes survive as literal data. The last write for a
    /// duplicate key wins; pairs with an empty key are discarded.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let chars: Vec<char> = raw.chars().collect();
        chars
            .iter()
            .enumerate()
            .fold(PropState::default(), |state, (idx, &ch)| {
                state.step(ch, chars.get(idx + 1).copied())
            })
            .finish()
    }

    /// Get a property value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Check whether a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of properties.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no properties were decoded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over key/value pairs in arbitrary order.
    pub fn iter(&self) -> Iter<'_, String, String> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Which accumulator slot receives literal characters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Field {
    #[default]
    Key,
    Value,
}

/// Character classes the parser treats specially.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    #[default]
    None,
    Quote,
    Comma,
    Equals,
    Space,
    Other,
}

impl CharClass {
    fn of(ch: char) -> Self {
        match ch {
            '"' => Self::Quote,
            ',' => Self::Comma,
            '=' => Self::Equals,
            ' ' => Self::Space,
            _ => Self::Other,
        }
    }
}

/// Parser state threaded through the fold, one character at a time.
#[derive(Debug, Default)]
struct PropState {
    field: Field,
    quoted: bool,
    prev: CharClass,
    key: String,
    value: String,
    entries: HashMap<String, String>,
}

impl PropState {
    fn step(mut self, ch: char, next: Option<char>) -> Self {
        let class = CharClass::of(ch);
        let closes_quote = matches!(
            next.map(CharClass::of),
            None | Some(CharClass::Space | CharClass::Comma)
        );

        match class {
            CharClass::Quote if self.quoted && closes_quote => self.quoted = false,
            _ if self.quoted => self.push(ch),
            CharClass::Quote if matches!(self.prev, CharClass::Space | CharClass::Equals) => {
                self.quoted = true;
            }
            CharClass::Space => {}
            CharClass::Equals => self.field = Field::Value,
            CharClass::Comma => {
                self.commit();
                self.field = Field::Key;
            }
            CharClass::Quote | CharClass::Other | CharClass::None => self.push(ch),
        }

        self.prev = class;
        self
    }

    fn push(&mut self, ch: char) {
        match self.field {
            Field::Key => self.key.push(ch),
            Field::Value => self.value.push(ch),
        }
    }

    fn commit(&mut self) {
        let key = std::mem::take(&mut self.key);
        let value = std::mem::take(&mut self.value);
        if !key.is_empty() {
            self.entries.insert(key, value);
        }
    }

    fn finish(mut self) -> Properties {
        self.commit();
        Properties {
            entries: self.entries,
        }
    }
}
