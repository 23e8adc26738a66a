//! Core identifier types for the talent graph

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable, externally assigned identifier for a person
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PersonId(pub u64);

impl PersonId {
    pub fn new(id: u64) -> Self {
        PersonId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PersonId({})", self.0)
    }
}

impl From<u64> for PersonId {
    fn from(id: u64) -> Self {
        PersonId(id)
    }
}

/// Stable, externally assigned identifier for an employer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct EmployerId(pub u64);

impl EmployerId {
    pub fn new(id: u64) -> Self {
        EmployerId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EmployerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EmployerId({})", self.0)
    }
}

impl From<u64> for EmployerId {
    fn from(id: u64) -> Self {
        EmployerId(id)
    }
}

/// Kind of underlying relationship contributing to an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeKind {
    Collaboration,
    Coemployment,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Collaboration => "collaboration",
            EdgeKind::Coemployment => "coemployment",
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonically ordered unordered person pair (a < b, never a self-pair)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PairKey {
    a: PersonId,
    b: PersonId,
}

impl PairKey {
    /// Build a canonical pair. Returns None for self-pairs, which have no
    /// place in the graph.
    pub fn new(x: PersonId, y: PersonId) -> Option<Self> {
        match x.cmp(&y) {
            std::cmp::Ordering::Less => Some(PairKey { a: x, b: y }),
            std::cmp::Ordering::Greater => Some(PairKey { a: y, b: x }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn a(&self) -> PersonId {
        self.a
    }

    pub fn b(&self) -> PersonId {
        self.b
    }

    /// Given one endpoint, return the other (None if not an endpoint).
    pub fn other(&self, id: PersonId) -> Option<PersonId> {
        if id == self.a {
            Some(self.b)
        } else if id == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_id() {
        let id = PersonId::new(42);
        assert_eq!(id.as_u64(), 42);
        assert_eq!(format!("{}", id), "PersonId(42)");

        let id2: PersonId = 100.into();
        assert_eq!(id2.as_u64(), 100);
    }

    #[test]
    fn test_pair_key_canonical_order() {
        let p1 = PersonId::new(1);
        let p2 = PersonId::new(2);

        let k1 = PairKey::new(p1, p2).unwrap();
        let k2 = PairKey::new(p2, p1).unwrap();
        assert_eq!(k1, k2);
        assert!(k1.a() < k1.b());
    }

    #[test]
    fn test_pair_key_rejects_self_pair() {
        let p = PersonId::new(7);
        assert!(PairKey::new(p, p).is_none());
    }

    #[test]
    fn test_pair_key_other() {
        let k = PairKey::new(PersonId::new(3), PersonId::new(9)).unwrap();
        assert_eq!(k.other(PersonId::new(3)), Some(PersonId::new(9)));
        assert_eq!(k.other(PersonId::new(9)), Some(PersonId::new(3)));
        assert_eq!(k.other(PersonId::new(5)), None);
    }
}
