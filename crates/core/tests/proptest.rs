//! Property-based tests for tabula-core using proptest.

use proptest::prelude::*;
use std::rc::Rc;
use tabula_core::headers::{HeaderIdentityToken, HeadersView, MutableHeaders};
use tabula_core::types::{AnyDataType, FiniteDataType, Nominal, Numeric, WithMissingValues};
use tabula_core::{DataType, Error, Headers};

fn categories() -> impl Strategy<Value = Vec<String>> {
    prop::collection::hash_set("[a-z]{1,6}", 2..12).prop_map(|set| set.into_iter().collect())
}

proptest! {
    /// Equal header tuples share one identity token.
    #[test]
    fn header_tokens_deduplicate(index in 0usize..100, name in "[a-z]{1,8}", is_target: bool) {
        let name: Rc<str> = Rc::from(name.as_str());
        let a: Rc<dyn AnyDataType> = Rc::new(Numeric::new(true));
        let b: Rc<dyn AnyDataType> = Rc::new(Numeric::new(true));

        let first = HeaderIdentityToken::get(index, &name, &a, is_target);
        let second = HeaderIdentityToken::get(index, &name, &b, is_target);
        prop_assert_eq!(first.clone(), second);

        let other = HeaderIdentityToken::get(index + 1, &name, &a, is_target);
        prop_assert_ne!(first, other);
    }

    /// Numeric selection and indexing are inverse.
    #[test]
    fn numeric_entropic_roundtrip(selection in any::<u64>()) {
        let numeric = Numeric::new(false);
        let selection = u128::from(selection);
        let value = numeric.select(selection).unwrap();
        prop_assert_eq!(numeric.index_of(&value), Some(selection));
    }

    /// Nominal selection covers every category exactly once.
    #[test]
    fn nominal_entropic_roundtrip(categories in categories()) {
        let nominal = Nominal::new(false, categories.clone()).unwrap();
        prop_assert_eq!(nominal.entropy(), categories.len() as u128);
        for n in 0..nominal.entropy() {
            let value = nominal.select(n).unwrap();
            prop_assert_eq!(nominal.index_of(&value), Some(n));
        }
        prop_assert!(nominal.select(nominal.entropy()).is_none());
    }

    /// Missing values take at most one index, right after the base range.
    #[test]
    fn missing_entropic_roundtrip(categories in categories(), missing_entropy in 0u128..2) {
        let base = Nominal::new(false, categories).unwrap();
        let data_type = WithMissingValues::optional(base.clone()).with_missing_entropy(missing_entropy);
        prop_assert_eq!(data_type.entropy(), base.entropy() + missing_entropy);

        for n in 0..data_type.entropy() {
            let value = data_type.select(n).unwrap();
            prop_assert_eq!(data_type.index_of(&value), Some(n));
        }

        let missing = data_type.convert_to_external(&data_type.convert_to_internal(None));
        prop_assert_eq!(missing, None);
    }

    /// Nominal types are equal only with the same categories in the same order.
    #[test]
    fn nominal_equality_follows_order(categories in categories()) {
        let a = Nominal::new(false, categories.clone()).unwrap();
        let b = Nominal::new(false, categories.clone()).unwrap();
        prop_assert_eq!(&a, &b);

        let mut reversed = categories;
        reversed.reverse();
        let c = Nominal::new(false, reversed).unwrap();
        prop_assert_ne!(a, c);
    }

    /// Deleting a header shifts every later header down by one.
    #[test]
    fn delete_renumbers(count in 2usize..12, deleted in 0usize..12) {
        let deleted = deleted % count;
        let mut headers = MutableHeaders::new();
        for i in 0..count {
            headers.append(&format!("h{}", i), Numeric::new(true), false).unwrap();
        }
        let representations: Vec<_> = (0..count)
            .map(|i| headers.representation(&format!("h{}", i), &Numeric::CANONICAL).unwrap())
            .collect();

        headers.delete(deleted, None).unwrap();

        for (i, representation) in representations.iter().enumerate() {
            if i < deleted {
                prop_assert_eq!(representation.column_index(), i);
            } else if i > deleted {
                prop_assert_eq!(representation.column_index(), i - 1);
                prop_assert_eq!(headers.index_of(&format!("h{}", i)).unwrap(), Some(i - 1));
            } else {
                prop_assert!(representation.ownership_token().is_none());
            }
        }
    }

    /// Views taken before an edit go stale; views taken after see the edit.
    #[test]
    fn views_follow_versions(count in 1usize..8, insert_at in 0usize..8) {
        let insert_at = insert_at % (count + 1);
        let mut headers = MutableHeaders::new();
        for i in 0..count {
            headers.append(&format!("h{}", i), Numeric::new(true), false).unwrap();
        }
        let before = HeadersView::all(&headers).unwrap();
        headers.insert(insert_at, "new", Numeric::new(false), true).unwrap();

        prop_assert_eq!(before.num_columns(), Err(Error::StaleView));
        let after = HeadersView::all(&headers).unwrap();
        prop_assert_eq!(after.num_columns(), Ok(count + 1));
        prop_assert_eq!(after.index_of("new"), Ok(Some(insert_at)));
    }
}
