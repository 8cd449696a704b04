//! Property-based lattice law tests

use proptest::prelude::*;

use flowcert_core::{AbstractState, Lattice, ValueKind};

fn value_kind() -> impl Strategy<Value = ValueKind> {
    prop_oneof![
        Just(ValueKind::Bottom),
        Just(ValueKind::Zero),
        Just(ValueKind::NonZero),
        Just(ValueKind::MaybeZero),
        Just(ValueKind::Top),
    ]
}

fn abstract_state() -> impl Strategy<Value = AbstractState> {
    prop_oneof![
        1 => Just(AbstractState::unreachable()),
        4 => proptest::collection::vec(("[a-d]", value_kind()), 0..6).prop_map(|pairs| {
            let mut state = AbstractState::reachable();
            for (name, kind) in pairs {
                state.set(&name, kind);
            }
            state
        }),
    ]
}

proptest! {
    #[test]
    fn join_commutative(a in value_kind(), b in value_kind()) {
        prop_assert_eq!(a.join(b), b.join(a));
    }

    #[test]
    fn join_associative(a in value_kind(), b in value_kind(), c in value_kind()) {
        prop_assert_eq!(a.join(b).join(c), a.join(b.join(c)));
    }

    #[test]
    fn join_idempotent(a in value_kind()) {
        prop_assert_eq!(a.join(a), a);
    }

    #[test]
    fn bottom_is_join_identity(a in value_kind()) {
        prop_assert_eq!(a.join(ValueKind::Bottom), a);
    }

    #[test]
    fn top_absorbs_join(a in value_kind()) {
        prop_assert_eq!(a.join(ValueKind::Top), ValueKind::Top);
    }

    #[test]
    fn meet_is_dual(a in value_kind(), b in value_kind()) {
        prop_assert_eq!(a.meet(b), b.meet(a));
        prop_assert_eq!(a.meet(ValueKind::Top), a);
        prop_assert_eq!(a.meet(ValueKind::Bottom), ValueKind::Bottom);
    }

    #[test]
    fn absorption_laws(a in value_kind(), b in value_kind()) {
        prop_assert_eq!(a.join(a.meet(b)), a);
        prop_assert_eq!(a.meet(a.join(b)), a);
    }

    #[test]
    fn state_join_commutative(a in abstract_state(), b in abstract_state()) {
        prop_assert_eq!(a.join(&b), b.join(&a));
    }

    #[test]
    fn state_join_idempotent(a in abstract_state()) {
        prop_assert_eq!(a.join(&a), a.clone());
    }

    #[test]
    fn state_bottom_is_identity(a in abstract_state()) {
        prop_assert_eq!(a.join(&AbstractState::unreachable()), a.clone());
    }

    #[test]
    fn state_join_is_upper_bound(a in abstract_state(), b in abstract_state(), name in "[a-d]") {
        let joined = a.join(&b);
        prop_assert_eq!(a.get(&name).join(joined.get(&name)), joined.get(&name));
        prop_assert_eq!(b.get(&name).join(joined.get(&name)), joined.get(&name));
    }
}
