use rutherford::core::elements::{self, Element};
use rutherford::core::models::atom::AtomKind;
use rutherford::engine::config::FailurePolicy;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown element symbol '{0}'. Run 'rutherford elements' to list the presets.")]
    UnknownElement(String),

    #[error("Unknown atom kind '{0}'. Expected 'rutherford' or 'plum-pudding'.")]
    UnknownAtomKind(String),

    #[error("Unknown failure policy '{0}'. Expected 'return-to-space' or 'discard'.")]
    UnknownFailurePolicy(String),

    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),
}

pub fn parse_element(symbol: &str) -> Result<&'static Element, ParseError> {
    elements::by_symbol(symbol).ok_or_else(|| ParseError::UnknownElement(symbol.to_string()))
}

pub fn parse_atom_kind(value: &str) -> Result<AtomKind, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::UnknownAtomKind(value.to_string()))
}

pub fn parse_failure_policy(value: &str) -> Result<FailurePolicy, ParseError> {
    value
        .parse()
        .map_err(|_| ParseError::UnknownFailurePolicy(value.to_string()))
}

/// Splits `key=value` at the first `=`. Both sides are trimmed and the key must not be empty.
pub fn parse_assignment(pair: &str) -> Result<(&str, &str), ParseError> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidAssignment(pair.to_string())),
    }
}
