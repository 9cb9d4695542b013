//! The parsed-arguments record handed from argument acquisition to the
//! flag translator.

use std::fmt;

/// A value bound to a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Bool(bool),
    Text(String),
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgValue::Bool(true) => f.write_str("True"),
            ArgValue::Bool(false) => f.write_str("False"),
            ArgValue::Text(text) => f.write_str(text),
        }
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Text(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Text(value)
    }
}

/// Parameter name to value, in insertion order. `None` marks a parameter
/// that was neither given nor defaulted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArguments {
    entries: Vec<(String, Option<ArgValue>)>,
}

impl ParsedArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: Option<ArgValue>) {
        self.entries.push((name.into(), value));
    }

    /// Looks up the first entry called `name`. The outer `Option` is the
    /// presence of the key, the inner one the value.
    pub fn get(&self, name: &str) -> Option<Option<&ArgValue>> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&ArgValue>)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for ParsedArguments
where
    K: Into<String>,
    V: Into<ArgValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.map(Into::into)))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preserves_insertion_order_and_absent_values() {
        let mut args = ParsedArguments::new();
        args.push("out", Some(ArgValue::from("/tmp/out")));
        args.push("f", None);
        args.push("verbose", Some(ArgValue::Bool(true)));

        let names: Vec<_> = args.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["out", "f", "verbose"]);
        assert_eq!(args.len(), 3);
        assert_eq!(args.get("f"), Some(None));
        assert_eq!(args.get("missing"), None);
        assert_eq!(
            args.get("out"),
            Some(Some(&ArgValue::Text("/tmp/out".to_string())))
        );
    }

    #[test]
    fn booleans_render_like_their_text_literals() {
        assert_eq!(ArgValue::Bool(true).to_string(), "True");
        assert_eq!(ArgValue::Bool(false).to_string(), "False");
        assert_eq!(ArgValue::from("0.5").to_string(), "0.5");
    }
}
