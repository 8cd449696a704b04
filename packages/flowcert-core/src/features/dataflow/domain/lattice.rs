//! Abstract lattice domain
//!
//! A bounded join-semilattice interface plus the zero-ness instantiation
//! used by the division rules. The ordering is
//! `Bottom < {Zero, NonZero} < MaybeZero < Top`: `Bottom` marks unreachable
//! code, `Top` a value the analysis knows nothing about.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Bounded join-semilattice
///
/// Implementations must make `join` commutative, associative and idempotent,
/// with `bottom()` as its identity.
pub trait Lattice: Clone + PartialEq {
    fn bottom() -> Self;

    fn join(&self, other: &Self) -> Self;

    fn is_bottom(&self) -> bool {
        *self == Self::bottom()
    }
}

/// Abstract zero-ness of an integer value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    /// Unreachable
    Bottom,
    Zero,
    NonZero,
    /// Either zero or non-zero
    MaybeZero,
    /// Unknown
    Top,
}

impl ValueKind {
    /// Number of levels in the longest chain; bounds fixed-point iteration.
    pub const HEIGHT: usize = 4;

    /// Least upper bound
    pub fn join(self, other: Self) -> Self {
        use ValueKind::*;
        match (self, other) {
            (Bottom, x) | (x, Bottom) => x,
            (Top, _) | (_, Top) => Top,
            (MaybeZero, _) | (_, MaybeZero) => MaybeZero,
            (Zero, Zero) => Zero,
            (NonZero, NonZero) => NonZero,
            (Zero, NonZero) | (NonZero, Zero) => MaybeZero,
        }
    }

    /// Greatest lower bound
    pub fn meet(self, other: Self) -> Self {
        use ValueKind::*;
        match (self, other) {
            (Top, x) | (x, Top) => x,
            (Bottom, _) | (_, Bottom) => Bottom,
            (MaybeZero, x) | (x, MaybeZero) => x,
            (Zero, Zero) => Zero,
            (NonZero, NonZero) => NonZero,
            (Zero, NonZero) | (NonZero, Zero) => Bottom,
        }
    }

    /// Whether the value may be zero at runtime
    pub fn may_be_zero(self) -> bool {
        matches!(
            self,
            ValueKind::Zero | ValueKind::MaybeZero | ValueKind::Top
        )
    }

    pub fn is_definitely_zero(self) -> bool {
        self == ValueKind::Zero
    }
}

impl Lattice for ValueKind {
    fn bottom() -> Self {
        ValueKind::Bottom
    }

    fn join(&self, other: &Self) -> Self {
        ValueKind::join(*self, *other)
    }
}

/// Per-block abstract state: variable name → zero-ness
///
/// `None` denotes unreachable code (the state `Bottom`); in a reachable
/// state an absent key denotes `Top`. The canonical form never stores `Top`
/// entries, so derived equality is semantic equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbstractState {
    vars: Option<FxHashMap<String, ValueKind>>,
}

impl AbstractState {
    /// The unreachable state
    pub fn unreachable() -> Self {
        Self { vars: None }
    }

    /// Reachable state with every variable unknown
    pub fn reachable() -> Self {
        Self {
            vars: Some(FxHashMap::default()),
        }
    }

    pub fn is_unreachable(&self) -> bool {
        self.vars.is_none()
    }

    pub fn get(&self, name: &str) -> ValueKind {
        match &self.vars {
            None => ValueKind::Bottom,
            Some(map) => map.get(name).copied().unwrap_or(ValueKind::Top),
        }
    }

    /// Bind a variable, keeping the canonical no-`Top`-entries form. A write
    /// into an unreachable state is ignored.
    pub fn set(&mut self, name: &str, kind: ValueKind) {
        if let Some(map) = &mut self.vars {
            if kind == ValueKind::Top {
                map.remove(name);
            } else {
                map.insert(name.to_string(), kind);
            }
        }
    }

    /// Number of tracked (non-`Top`) variables
    pub fn tracked_len(&self) -> usize {
        self.vars.as_ref().map(|m| m.len()).unwrap_or(0)
    }
}

impl Lattice for AbstractState {
    fn bottom() -> Self {
        Self::unreachable()
    }

    fn join(&self, other: &Self) -> Self {
        match (&self.vars, &other.vars) {
            (None, _) => other.clone(),
            (_, None) => self.clone(),
            (Some(a), Some(b)) => {
                // Keys absent on either side are Top there, and Top absorbs,
                // so the joined state keeps only keys tracked on both sides.
                let mut joined = FxHashMap::default();
                for (name, &kind_a) in a {
                    if let Some(&kind_b) = b.get(name) {
                        let k = kind_a.join(kind_b);
                        if k != ValueKind::Top {
                            joined.insert(name.clone(), k);
                        }
                    }
                }
                Self { vars: Some(joined) }
            }
        }
    }

    fn is_bottom(&self) -> bool {
        self.is_unreachable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ValueKind::*;

    const ALL: [ValueKind; 5] = [Bottom, Zero, NonZero, MaybeZero, Top];

    #[test]
    fn test_join_commutative() {
        for a in ALL {
            for b in ALL {
                assert_eq!(a.join(b), b.join(a));
            }
        }
    }

    #[test]
    fn test_join_associative() {
        for a in ALL {
            for b in ALL {
                for c in ALL {
                    assert_eq!(a.join(b).join(c), a.join(b.join(c)));
                }
            }
        }
    }

    #[test]
    fn test_join_idempotent_and_identity() {
        for a in ALL {
            assert_eq!(a.join(a), a);
            assert_eq!(a.join(Bottom), a);
            assert_eq!(a.join(Top), Top);
        }
    }

    #[test]
    fn test_meet_is_dual() {
        for a in ALL {
            assert_eq!(a.meet(a), a);
            assert_eq!(a.meet(Top), a);
            assert_eq!(a.meet(Bottom), Bottom);
        }
        assert_eq!(Zero.meet(NonZero), Bottom);
        assert_eq!(MaybeZero.meet(Zero), Zero);
        assert_eq!(MaybeZero.meet(NonZero), NonZero);
    }

    #[test]
    fn test_zero_join_nonzero() {
        assert_eq!(Zero.join(NonZero), MaybeZero);
    }

    #[test]
    fn test_state_absent_key_is_top() {
        let state = AbstractState::reachable();
        assert_eq!(state.get("x"), Top);
        assert_eq!(AbstractState::unreachable().get("x"), Bottom);
    }

    #[test]
    fn test_state_set_top_keeps_canonical_form() {
        let mut state = AbstractState::reachable();
        state.set("x", Zero);
        assert_eq!(state.tracked_len(), 1);
        state.set("x", Top);
        assert_eq!(state.tracked_len(), 0);

        let mut same = AbstractState::reachable();
        same.set("y", Top);
        assert_eq!(state, same);
    }

    #[test]
    fn test_state_join_unreachable_is_identity() {
        let mut state = AbstractState::reachable();
        state.set("x", Zero);
        let joined = state.join(&AbstractState::unreachable());
        assert_eq!(joined, state);
    }

    #[test]
    fn test_state_join_disagreeing_branches() {
        let mut a = AbstractState::reachable();
        a.set("x", Zero);
        a.set("y", NonZero);
        let mut b = AbstractState::reachable();
        b.set("x", NonZero);

        let joined = a.join(&b);
        assert_eq!(joined.get("x"), MaybeZero);
        // y is Top on one side, so Top after the join
        assert_eq!(joined.get("y"), Top);
    }
}
