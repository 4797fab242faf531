/*!
Change tracking. §3: "Every settable field records the action that produced its current value
relative to the last-persisted state: `CREATE` for a field that had no prior value, `REPLACE` for
one that overwrote a prior scalar value, `DELETE` for one cleared back to absent, `MODIFY` for an
in-place mutation of a nested collection. A `ChangeSet` is a map from field name to `ChangeEntry`
… Nested values notify their owner upon mutation so that the owner's `ChangeSet` stays accurate
without the caller having to call a setter on the owner directly."
*/
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// Public Types ❱ ChangeAction
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ChangeAction {
    Create,
    Replace,
    Delete,
    Modify,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Replace => "REPLACE",
            ChangeAction::Delete => "DELETE",
            ChangeAction::Modify => "MODIFY",
        };
        write!(f, "{s}")
    }
}

impl ChangeAction {
    /// Combine a prior recorded action with a new one affecting the same field. A `CREATE`
    /// followed by any further mutation is still a `CREATE` from the perspective of the
    /// not-yet-persisted baseline; a `DELETE` followed by a further `MODIFY` degrades to
    /// `REPLACE` since the field was absent and is now present again.
    pub fn combine(previous: ChangeAction, next: ChangeAction) -> ChangeAction {
        use ChangeAction::*;
        match (previous, next) {
            (Create, Delete) => Delete,
            (Create, _) => Create,
            (Delete, Delete) => Delete,
            (Delete, _) => Replace,
            (_, Delete) => Delete,
            (_, next) => next,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ ChangeEntry
// ------------------------------------------------------------------------------------------------

/// One field's change record: the action that produced its current value, plus the field's
/// pre-mutation value serialized as its RDF term form, kept to support `undo()`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeEntry {
    pub action: ChangeAction,
    pub old_value: Option<String>,
}

impl ChangeEntry {
    pub fn new(action: ChangeAction, old_value: Option<String>) -> Self {
        Self { action, old_value }
    }
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ ChangeSet
// ------------------------------------------------------------------------------------------------

/// A map from field name to [`ChangeEntry`], accumulated between loads from, and writes to, the
/// triple store.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChangeSet(BTreeMap<String, ChangeEntry>);

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mutation of `field`. If `field` already has a pending entry, the actions are
    /// combined per [`ChangeAction::combine`] and the earliest recorded `old_value` is kept.
    pub fn record(
        &mut self,
        field: impl Into<String>,
        action: ChangeAction,
        old_value: Option<String>,
    ) {
        let field = field.into();
        match self.0.get_mut(&field) {
            Some(entry) => {
                entry.action = ChangeAction::combine(entry.action, action);
            }
            None => {
                self.0.insert(field, ChangeEntry::new(action, old_value));
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&ChangeEntry> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ChangeEntry)> {
        self.0.iter()
    }

    /// Clear the change set after a successful persist: the current state becomes the new
    /// baseline.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Drop the pending entry for `field` without applying it, used when an owning setter rolls
    /// back a nested container mutation.
    pub fn discard(&mut self, field: &str) {
        self.0.remove(field);
    }
}

// ------------------------------------------------------------------------------------------------
// Public Types ❱ Notify
// ------------------------------------------------------------------------------------------------

/// A callback a nested collection (e.g. [`crate::collections::LangString`]) invokes on mutation
/// so its owning entity can append a `ChangeSet` entry without the caller threading the
/// notification through every setter by hand. A default `Notify` is a no-op, so nested
/// collections are usable stand-alone in tests.
#[derive(Clone, Default)]
pub struct Notify(Option<Rc<RefCell<dyn FnMut(ChangeAction)>>>);

impl Notify {
    pub fn new(callback: impl FnMut(ChangeAction) + 'static) -> Self {
        Self(Some(Rc::new(RefCell::new(callback))))
    }

    pub fn notify(&self, action: ChangeAction) {
        if let Some(callback) = &self.0 {
            (callback.borrow_mut())(action);
        }
    }
}

impl fmt::Debug for Notify {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notify")
            .field("attached", &self.0.is_some())
            .finish()
    }
}

impl PartialEq for Notify {
    /// Notifiers are callback plumbing, not data; two `Notify` values always compare equal so
    /// that attaching a different owner to an otherwise-identical value does not break equality.
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Notify {}
