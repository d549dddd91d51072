//! JSON Pointer (RFC 6901) addressing.
//!
//! A [`Pointer`] is an ordered sequence of reference [`Token`]s. The root
//! pointer has no tokens and renders as the empty string. Tokens are kept in
//! their unescaped form; escaping only happens when a pointer is rendered.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::TypeError;

/// A single reference token: an object key or an array index.
///
/// Indices are stored in their decimal form so that `Token::from(2)` and a
/// token parsed from `"/2"` compare equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(String);

impl Token {
    /// Create a token from an (unescaped) object key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Create a token addressing an array element.
    pub fn index(index: usize) -> Self {
        Self(index.to_string())
    }

    /// The unescaped token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the token as an array index.
    ///
    /// Only canonical decimal forms qualify: `"0"`, `"7"`, `"12"`, but not
    /// `"07"`, `"-"` or `"+1"`.
    pub fn as_index(&self) -> Option<usize> {
        let s = self.0.as_str();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        if s.len() > 1 && s.starts_with('0') {
            return None;
        }
        s.parse().ok()
    }

    /// The token escaped for inclusion in a pointer string.
    pub fn escaped(&self) -> String {
        if !self.0.contains('/') && !self.0.contains('~') {
            return self.0.clone();
        }
        // `~` first, otherwise the `~` introduced by `~1` would be re-escaped.
        self.0.replace('~', "~0").replace('/', "~1")
    }

    fn unescape(raw: &str, pointer: &str) -> Result<Self, TypeError> {
        if !raw.contains('~') {
            return Ok(Self(raw.to_string()));
        }
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '~' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                Some(other) => {
                    return Err(TypeError::pointer(
                        pointer,
                        format!("invalid escape sequence '~{other}'"),
                    ))
                }
                None => return Err(TypeError::pointer(pointer, "dangling '~' at end of token")),
            }
        }
        Ok(Self(out))
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for Token {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&String> for Token {
    fn from(key: &String) -> Self {
        Self(key.clone())
    }
}

impl From<usize> for Token {
    fn from(index: usize) -> Self {
        Self::index(index)
    }
}

/// An RFC 6901 JSON Pointer.
///
/// Pointers are immutable: [`append`](Pointer::append) and
/// [`parent`](Pointer::parent) return new values.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pointer {
    tokens: Vec<Token>,
}

impl Pointer {
    /// The root pointer (empty token sequence).
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a pointer from a sequence of tokens.
    pub fn from_tokens<I, T>(tokens: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Token>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a strict RFC 6901 pointer string.
    ///
    /// The empty string is the root. Any other pointer must start with `/`.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() {
            return Ok(Self::root());
        }
        let Some(rest) = s.strip_prefix('/') else {
            return Err(TypeError::pointer(s, "pointer must be empty or start with '/'"));
        };
        let tokens = rest
            .split('/')
            .map(|raw| Token::unescape(raw, s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { tokens })
    }

    /// Parse a pointer that may omit the leading `/`.
    ///
    /// `"Entitlements"` and `"/Entitlements"` both address the same field.
    /// Used for hand-written configuration.
    pub fn parse_relaxed(s: &str) -> Result<Self, TypeError> {
        if s.is_empty() || s.starts_with('/') {
            return Self::parse(s);
        }
        Self::parse(&format!("/{s}"))
    }

    /// Return a new pointer with `token` appended.
    pub fn append(&self, token: impl Into<Token>) -> Self {
        let mut tokens = Vec::with_capacity(self.tokens.len() + 1);
        tokens.extend(self.tokens.iter().cloned());
        tokens.push(token.into());
        Self { tokens }
    }

    /// Return the pointer with its last token removed.
    ///
    /// The parent of the root is the root.
    pub fn parent(&self) -> Self {
        let end = self.tokens.len().saturating_sub(1);
        Self {
            tokens: self.tokens[..end].to_vec(),
        }
    }

    /// Returns `true` if this is the root pointer.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the pointer has no tokens (same as [`is_root`](Self::is_root)).
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The tokens, root first.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Locate the value this pointer addresses inside `document`.
    ///
    /// Object members are looked up by key; array elements by canonical
    /// decimal index. Returns `None` if any step fails to resolve.
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.tokens
            .iter()
            .try_fold(document, |node, token| match node {
                Value::Object(map) => map.get(token.as_str()),
                Value::Array(items) => token.as_index().and_then(|i| items.get(i)),
                _ => None,
            })
    }
}

impl fmt::Display for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "/{}", token.escaped())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Pointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pointer({:?})", self.to_string())
    }
}

impl FromStr for Pointer {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Pointer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Pointer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn root_renders_empty() {
        assert_eq!(Pointer::root().to_string(), "");
        assert!(Pointer::root().is_root());
    }

    #[test]
    fn append_and_parent() {
        let p = Pointer::root().append("Entitlements").append(2);
        assert_eq!(p.to_string(), "/Entitlements/2");
        assert_eq!(p.parent().to_string(), "/Entitlements");
        assert_eq!(p.parent().parent(), Pointer::root());
    }

    #[test]
    fn parent_of_root_is_root() {
        assert_eq!(Pointer::root().parent(), Pointer::root());
    }

    #[test]
    fn sentinel_tokens_render_verbatim() {
        let p = Pointer::root().append("a");
        assert_eq!(p.parent().append("?").to_string(), "/?");
        assert_eq!(p.parent().append("-").to_string(), "/-");
    }

    #[test]
    fn escapes_special_characters() {
        let p = Pointer::root().append("a/b").append("c~d");
        assert_eq!(p.to_string(), "/a~1b/c~0d");
        assert_eq!(Pointer::parse("/a~1b/c~0d").unwrap(), p);
    }

    #[test]
    fn tilde_one_sequence_does_not_double_unescape() {
        let p = Pointer::parse("/~01").unwrap();
        assert_eq!(p.tokens()[0].as_str(), "~1");
    }

    #[test]
    fn rejects_missing_leading_slash() {
        assert!(Pointer::parse("a/b").is_err());
    }

    #[test]
    fn rejects_bad_escape() {
        assert!(Pointer::parse("/a~2").is_err());
        assert!(Pointer::parse("/a~").is_err());
    }

    #[test]
    fn relaxed_accepts_bare_field() {
        let p = Pointer::parse_relaxed("Entitlements").unwrap();
        assert_eq!(p, Pointer::parse("/Entitlements").unwrap());
    }

    #[test]
    fn index_token_equals_parsed_index() {
        assert_eq!(Pointer::root().append(3), Pointer::parse("/3").unwrap());
    }

    #[test]
    fn canonical_index_only() {
        assert_eq!(Token::new("12").as_index(), Some(12));
        assert_eq!(Token::new("0").as_index(), Some(0));
        assert_eq!(Token::new("012").as_index(), None);
        assert_eq!(Token::new("-").as_index(), None);
        assert_eq!(Token::new("").as_index(), None);
    }

    #[test]
    fn resolve_walks_objects_and_arrays() {
        let doc = json!({"a": {"b": [10, 20, {"c": true}]}});
        let p = Pointer::parse("/a/b/2/c").unwrap();
        assert_eq!(p.resolve(&doc), Some(&json!(true)));
        assert_eq!(Pointer::root().resolve(&doc), Some(&doc));
        assert_eq!(Pointer::parse("/a/b/9").unwrap().resolve(&doc), None);
        assert_eq!(Pointer::parse("/a/x").unwrap().resolve(&doc), None);
    }

    #[test]
    fn resolve_numeric_key_in_object() {
        let doc = json!({"2": "two"});
        assert_eq!(Pointer::parse("/2").unwrap().resolve(&doc), Some(&json!("two")));
    }

    #[test]
    fn serde_as_string() {
        let p = Pointer::parse("/Role Owner Login").unwrap();
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"/Role Owner Login\"");
        let back: Pointer = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn serde_rejects_invalid_pointer() {
        let res: Result<Pointer, _> = serde_json::from_str("\"nope\"");
        assert!(res.is_err());
    }

    proptest::proptest! {
        #[test]
        fn display_then_parse_is_identity(keys in proptest::collection::vec(".*", 0..6)) {
            let p = Pointer::from_tokens(keys);
            let parsed = Pointer::parse(&p.to_string()).unwrap();
            proptest::prop_assert_eq!(parsed, p);
        }
    }
}
