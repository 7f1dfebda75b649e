//! Interned element identifiers.

use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

/// Shared by every model on the page, so ids compare across editors.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Id of a state, transition, text or annotation. Equality and hashing
/// work on the `Spur` key, never on the string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(Spur);

impl ElementId {
    pub fn intern(s: &str) -> Self {
        ElementId(INTERNER.get_or_intern(s))
    }

    pub fn as_str(&self) -> &str {
        INTERNER.resolve(&self.0)
    }

    /// Look up an already-interned id without interning a new string.
    ///
    /// An id that was never interned cannot belong to any model, so callers
    /// holding untrusted strings (the JS bridge) use this to avoid growing
    /// the interner.
    pub fn lookup(s: &str) -> Option<Self> {
        INTERNER.get(s).map(ElementId)
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.as_str())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ElementId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementId::intern(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_roundtrip() {
        let a = ElementId::intern("s_login");
        let b = ElementId::intern("s_login");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "s_login");
        assert_eq!(a.to_string(), "s_login");
    }

    #[test]
    fn lookup_does_not_intern() {
        assert!(ElementId::lookup("never_seen_before_42").is_none());
        let id = ElementId::intern("seen_once");
        assert_eq!(ElementId::lookup("seen_once"), Some(id));
    }
}
