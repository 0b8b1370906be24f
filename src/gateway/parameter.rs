//! # Parameters: what a poll reads.
//!
//! A [`Parameter`] is an opaque identifier for one device value. Usually a logical
//! name the gateway knows how to translate (`"Output Current"`), or, with
//! pass-through enabled, a raw device address or tag (`"@0x93/1/10"`, `"SCADA[1]"`).
//!
//! The core never inspects parameters; it only hands them to
//! [`Gateway::parameter_substitution`](crate::Gateway::parameter_substitution) and
//! pairs them back with the values read.

use std::borrow::Cow;
use std::fmt;

/// Parameters polled when none are configured.
pub const DEFAULT_PARAMS: [Parameter; 2] = [
    Parameter::from_static("Output Current"),
    Parameter::from_static("Motor Velocity"),
];

/// Identifier of one device-readable value.
///
/// Immutable and cheap to clone. Duplicates are allowed in a request and
/// simply produce duplicate results.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Parameter(Cow<'static, str>);

impl Parameter {
    /// Creates a parameter from an owned or static string.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Creates a parameter from a static string (usable in `const` context).
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Parameter {
    /// Honors width/alignment, so `{:>15}` lines results up.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl AsRef<str> for Parameter {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Parameter {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Parameter {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads() {
        let p = Parameter::from("Motor Velocity");
        assert_eq!(format!("{p:>16}"), "  Motor Velocity");
        assert_eq!(p.as_str(), "Motor Velocity");
    }

    #[test]
    fn test_owned_and_static_compare_equal() {
        assert_eq!(
            Parameter::new(String::from("Output Current")),
            DEFAULT_PARAMS[0]
        );
    }
}
