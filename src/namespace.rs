//! The named-object registry a mailslot device operates in.

use crate::name::{fold_case, SlotName};
use std::{
    any::Any,
    cell::RefCell,
    collections::HashMap,
    io,
    rc::{Rc, Weak},
};

/// A shared, case-insensitive namespace of named objects.
///
/// The registry is shared with other named-object kinds, so entries are `Rc<dyn Any>` and
/// each subsystem downcasts to its own object type. A name stays claimed for exactly as long
/// as some strong reference to its object lives.
///
/// The mailslot core consumes this as an injected collaborator so tests (and other hosting
/// servers) can substitute their own; [`SyncNamespace`] is the stock implementation.
pub trait Namespace {
    /// Returns the live object registered under `name`, or registers and returns the one
    /// produced by `make`. The flag is `true` iff this call created the object.
    ///
    /// `make` failing leaves the namespace untouched.
    fn create_named(
        &self,
        name: &SlotName,
        make: &mut dyn FnMut() -> io::Result<Rc<dyn Any>>,
    ) -> io::Result<(Rc<dyn Any>, bool)>;

    /// Case-insensitive lookup. `None` when nothing live is registered under `name`.
    fn find_named(&self, name: &str) -> Option<Rc<dyn Any>>;
}

/// The stock single-threaded registry, keyed by case-folded name.
///
/// Holds weak references only: dropping the last strong reference to a registered object
/// frees its name for reuse. Dead entries are pruned by the lookup that finds them.
#[derive(Default)]
pub struct SyncNamespace {
    objects: RefCell<HashMap<String, Weak<dyn Any>>>,
}

impl SyncNamespace {
    /// Creates an empty namespace.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Namespace for SyncNamespace {
    fn create_named(
        &self,
        name: &SlotName,
        make: &mut dyn FnMut() -> io::Result<Rc<dyn Any>>,
    ) -> io::Result<(Rc<dyn Any>, bool)> {
        let mut objects = self.objects.borrow_mut();
        if let Some(existing) = objects.get(name.key()).and_then(Weak::upgrade) {
            return Ok((existing, false));
        }
        let object = make()?;
        objects.insert(name.key().to_owned(), Rc::downgrade(&object));
        Ok((object, true))
    }

    fn find_named(&self, name: &str) -> Option<Rc<dyn Any>> {
        let key = fold_case(name);
        let mut objects = self.objects.borrow_mut();
        match objects.get(&key).map(Weak::upgrade) {
            Some(Some(object)) => Some(object),
            Some(None) => {
                objects.remove(&key);
                None
            }
            None => None,
        }
    }
}
