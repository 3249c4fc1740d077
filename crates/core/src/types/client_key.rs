//! Client identity used for admission control.

use core::fmt;

/// Opaque identity of a caller, derived from its network address.
///
/// The value is taken as the transport presents it (`host:port`) and is not
/// checked for spoofing. An empty key is a valid key: every caller without a
/// known address shares it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientKey(String);

impl ClientKey {
    /// Create a key from a transport-supplied address string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The shared key for callers whose address is unknown.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self(String::new())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the shared anonymous key.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ClientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ClientKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ClientKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
