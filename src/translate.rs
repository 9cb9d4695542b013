//! Turns parsed arguments into the argument list handed to elastix.

use crate::arguments::{ArgValue, ParsedArguments};

/// Builds the child's argument list, one token per set parameter, in the
/// order of `arguments`.
///
/// - absent values and `false` are skipped;
/// - `true` becomes `-name`;
/// - anything else becomes the single token `-name value`.
///
/// The text literals `True`/`true` and `False`/`false` count as booleans;
/// other spellings such as `FALSE` are ordinary values.
/// A `-name value` pair stays one token, so elastix receives one argv entry
/// per parameter, embedded spaces included.
pub fn to_flag_tokens(arguments: &ParsedArguments) -> Vec<String> {
    arguments
        .iter()
        .filter_map(|(name, value)| {
            let value = value?;
            match as_bool(value) {
                Some(false) => None,
                Some(true) => Some(format!("-{name}")),
                None => Some(format!("-{name} {value}")),
            }
        })
        .collect()
}

fn as_bool(value: &ArgValue) -> Option<bool> {
    match value {
        ArgValue::Bool(flag) => Some(*flag),
        ArgValue::Text(text) => match text.as_str() {
            "True" | "true" => Some(true),
            "False" | "false" => Some(false),
            _ => None,
        },
    }
}
