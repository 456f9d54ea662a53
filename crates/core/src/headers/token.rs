//! Interned identity of a single column header.

use crate::cache::WeakCache;
use crate::types::AnyDataType;
use log::trace;
use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

#[derive(Clone, Debug)]
struct HeaderKey {
    index: usize,
    name: Rc<str>,
    data_type: Rc<dyn AnyDataType>,
    is_target: bool,
}

impl PartialEq for HeaderKey {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
            && self.is_target == other.is_target
            && self.name == other.name
            && self.data_type.dyn_eq(&*other.data_type)
    }
}

impl Eq for HeaderKey {}

impl Hash for HeaderKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.name.hash(state);
        self.is_target.hash(state);
        self.data_type.dyn_hash(state);
    }
}

struct HeaderTokenInner {
    key: HeaderKey,
}

impl Drop for HeaderTokenInner {
    fn drop(&mut self) {
        let _ = HEADER_TOKENS.try_with(|cache| {
            if let Ok(mut cache) = cache.try_borrow_mut() {
                trace!("evicting header token {}@{}", self.key.name, self.key.index);
                cache.evict(&self.key);
            }
        });
    }
}

thread_local! {
    static HEADER_TOKENS: RefCell<WeakCache<HeaderKey, HeaderTokenInner>> =
        RefCell::new(WeakCache::new());
}

/// Identity of a header: its index, name, data-type and target flag.
///
/// Equal tuples share one token while any holder keeps it alive, so
/// equality is pointer equality.
#[derive(Clone)]
pub struct HeaderIdentityToken(Rc<HeaderTokenInner>);

impl HeaderIdentityToken {
    /// Gets the token for the given header tuple.
    pub fn get(
        index: usize,
        name: &Rc<str>,
        data_type: &Rc<dyn AnyDataType>,
        is_target: bool,
    ) -> Self {
        let key = HeaderKey {
            index,
            name: name.clone(),
            data_type: data_type.clone(),
            is_target,
        };
        let inner = HEADER_TOKENS.with(|cache| {
            cache.borrow_mut().get_or_create(key, |key| {
                trace!("new header token {}@{}", key.name, key.index);
                HeaderTokenInner { key: key.clone() }
            })
        });
        Self(inner)
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.0.key.index
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.0.key.name
    }

    #[inline]
    pub fn data_type(&self) -> &dyn AnyDataType {
        &*self.0.key.data_type
    }

    #[inline]
    pub fn is_target(&self) -> bool {
        self.0.key.is_target
    }

    /// Address of the shared token, stable while it is alive.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }
}

impl PartialEq for HeaderIdentityToken {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for HeaderIdentityToken {}

impl Hash for HeaderIdentityToken {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.addr().hash(state);
    }
}

impl fmt::Display for HeaderIdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = &self.0.key;
        write!(
            f,
            "{} {}@{}: {}",
            if key.is_target { "T" } else { "F" },
            key.name,
            key.index,
            key.data_type
        )
    }
}

impl fmt::Debug for HeaderIdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeaderIdentityToken({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Nominal, Numeric};

    fn numeric() -> Rc<dyn AnyDataType> {
        Rc::new(Numeric::new(true))
    }

    #[test]
    fn test_equal_tuples_share_token() {
        let name: Rc<str> = Rc::from("age");
        let a = HeaderIdentityToken::get(0, &name, &numeric(), false);
        let b = HeaderIdentityToken::get(0, &Rc::from("age"), &numeric(), false);
        assert_eq!(a, b);
        assert_eq!(a.addr(), b.addr());
    }

    #[test]
    fn test_any_difference_gives_new_token() {
        let name: Rc<str> = Rc::from("age");
        let base = HeaderIdentityToken::get(0, &name, &numeric(), false);
        assert_ne!(base, HeaderIdentityToken::get(1, &name, &numeric(), false));
        assert_ne!(base, HeaderIdentityToken::get(0, &name, &numeric(), true));
        assert_ne!(
            base,
            HeaderIdentityToken::get(0, &Rc::from("height"), &numeric(), false)
        );
        let nominal: Rc<dyn AnyDataType> = Rc::new(Nominal::new(true, ["a", "b"]).unwrap());
        assert_ne!(base, HeaderIdentityToken::get(0, &name, &nominal, false));
    }

    #[test]
    fn test_dropped_token_is_evicted() {
        let name: Rc<str> = Rc::from("evicted-column");
        let token = HeaderIdentityToken::get(42, &name, &numeric(), false);
        let key = token.0.key.clone();
        drop(token);
        HEADER_TOKENS.with(|cache| assert!(cache.borrow().get(&key).is_none()));
    }

    #[test]
    fn test_display() {
        let token = HeaderIdentityToken::get(2, &Rc::from("label"), &numeric(), true);
        assert_eq!(token.to_string(), "T label@2: Numeric");
    }
}
