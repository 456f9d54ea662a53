//! Interned identity of a whole header collection.

use crate::cache::WeakCache;
use crate::headers::{ColumnHeader, HeaderIdentityToken};
use crate::types::RepresentationSlot;
use hashbrown::HashMap;
use log::trace;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

struct HeadersTokenInner {
    key: Vec<usize>,
    headers: Vec<HeaderIdentityToken>,
    names: HashMap<String, usize>,
}

impl Drop for HeadersTokenInner {
    fn drop(&mut self) {
        let _ = HEADERS_TOKENS.try_with(|cache| {
            if let Ok(mut cache) = cache.try_borrow_mut() {
                cache.evict(&self.key);
            }
        });
    }
}

thread_local! {
    static HEADERS_TOKENS: RefCell<WeakCache<Vec<usize>, HeadersTokenInner>> =
        RefCell::new(WeakCache::new());
}

/// Identity of an ordered list of headers.
///
/// Structurally equal collections share one token, so two collections have
/// the same structure iff their tokens are pointer-equal.
#[derive(Clone)]
pub struct HeadersIdentityToken(Rc<HeadersTokenInner>);

impl HeadersIdentityToken {
    /// Gets the token for the given list of header identities.
    pub fn of(headers: Vec<HeaderIdentityToken>) -> Self {
        let key: Vec<usize> = headers.iter().map(HeaderIdentityToken::addr).collect();
        let inner = HEADERS_TOKENS.with(|cache| {
            cache.borrow_mut().get_or_create(key, move |key| {
                trace!("new headers token over {} columns", headers.len());
                let names = headers
                    .iter()
                    .map(|header| (header.name().to_string(), header.index()))
                    .collect();
                HeadersTokenInner {
                    key: key.clone(),
                    headers,
                    names,
                }
            })
        });
        Self(inner)
    }

    /// The token of a collection with no columns.
    pub fn empty() -> Self {
        Self::of(Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.headers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.headers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&HeaderIdentityToken> {
        self.0.headers.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderIdentityToken> {
        self.0.headers.iter()
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.0.names.get(name).copied()
    }

    /// Whether `header` sits at its index in this structure.
    pub fn contains(&self, header: &dyn ColumnHeader) -> bool {
        self.get(header.index())
            .map_or(false, |token| *token == header.identity_token())
    }

    /// Whether a collection with this structure owns `slot` or an
    /// equivalent of it.
    pub fn owns_equivalent(&self, slot: &RepresentationSlot) -> bool {
        match slot.header_token() {
            Some(token) => self.get(token.index()) == Some(&token),
            None => false,
        }
    }
}

impl PartialEq for HeadersIdentityToken {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for HeadersIdentityToken {}

impl fmt::Display for HeadersIdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, header) in self.0.headers.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", header)?;
        }
        write!(f, "]")
    }
}

impl fmt::Debug for HeadersIdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeadersIdentityToken{}", self)
    }
}
