#![forbid(unsafe_code)]

//! The minion form and its wiring.
//!
//! Counts live in a [`PersistentStore`] under [`STORAGE_KEY`]. Each count
//! is a `FieldController<u32>` seeded from the store; the fields form one
//! group whose snapshots are written back to the store while connected.
//! Rolls go onto a [`HistoryService`] so earlier rounds can be revisited.

use std::cell::RefCell;
use std::rc::Rc;

use necro_dice::{DiceError, MinionCounts, MinionRolls, roll_minions};
use necro_runtime::form::{ControlHandle, FieldController, FieldGroupController, FormError};
use necro_runtime::persist::{PersistError, PersistentStore, StorageBackend};
use necro_runtime::{BindingError, BindingScope, HistoryService, HostLifecycle};
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Record name of the persisted counts.
pub const STORAGE_KEY: &str = "state";

/// Persisted minion counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NecRomancerState {
    pub skeletons: u32,
    pub skeleton_weapons: u32,
    pub zombies: u32,
}

impl From<NecRomancerState> for MinionCounts {
    fn from(state: NecRomancerState) -> Self {
        Self {
            skeletons: state.skeletons,
            skeleton_weapons: state.skeleton_weapons,
            zombies: state.zombies,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Binding(#[from] BindingError),

    #[error(transparent)]
    Dice(#[from] DiceError),
}

/// The application: form, store, history and the rolls on display.
pub struct NecRomancer {
    store: Rc<RefCell<PersistentStore<NecRomancerState>>>,
    fields: Vec<(String, FieldController<u32>)>,
    form: FieldGroupController<NecRomancerState>,
    history: RefCell<HistoryService<MinionRolls>>,
    rolls: Rc<RefCell<Option<MinionRolls>>>,
    scope: BindingScope,
}

impl NecRomancer {
    /// Open the store in `backend` and build the form from it.
    pub fn new(backend: impl StorageBackend + 'static) -> Result<Self, AppError> {
        let store = PersistentStore::new(STORAGE_KEY, &NecRomancerState::default(), backend)?;

        let mut fields = Vec::new();
        let mut builder = FieldGroupController::<NecRomancerState>::builder();
        for key in store.keys() {
            let initial = match store.get_as::<u32>(key) {
                Ok(value) => value.unwrap_or_default(),
                Err(err) => {
                    warn!(field = key, error = %err, "stored count is not a whole number; using 0");
                    0
                }
            };
            let field = FieldController::new(initial);
            builder = builder.field(key, &field);
            fields.push((key.to_string(), field));
        }
        let form = builder.build()?;
        debug!(state = ?form.value()?, "form seeded");

        Ok(Self {
            store: Rc::new(RefCell::new(store)),
            fields,
            form,
            history: RefCell::new(HistoryService::new()),
            rolls: Rc::new(RefCell::new(None)),
            scope: BindingScope::new(),
        })
    }

    /// Start persisting form changes and following history navigation.
    /// Connecting twice is a no-op.
    pub fn connect(&mut self) {
        if self.form.is_connected() {
            return;
        }
        self.form.host_connected();

        let store = Rc::clone(&self.store);
        self.scope
            .subscribe(self.form.change(), move |snapshot: &NecRomancerState| {
                debug!(?snapshot, "form changed");
                if let Err(err) = store.borrow_mut().assign(snapshot) {
                    warn!(error = %err, "could not persist form state");
                }
            });

        let rolls = Rc::clone(&self.rolls);
        let history = self.history.borrow();
        self.scope
            .subscribe(history.state_changes(), move |state: &Option<MinionRolls>| {
                rolls.borrow_mut().clone_from(state);
            });
        info!(fields = self.fields.len(), "necromancer connected");
    }

    /// Stop persisting and following history.
    pub fn disconnect(&mut self) {
        self.scope.clear();
        self.form.host_disconnected();
    }

    /// Binding handle for the field `name`.
    pub fn control(&self, name: &str) -> Result<ControlHandle, FormError> {
        self.form.control(name)
    }

    /// Field names in form order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.form.field_names()
    }

    /// The field `name`.
    pub fn field(&self, name: &str) -> Result<&FieldController<u32>, FormError> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, controller)| controller)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    /// Current counts, as the form sees them.
    pub fn state(&self) -> Result<NecRomancerState, FormError> {
        self.form.value()
    }

    /// The persisted blob.
    #[must_use]
    pub fn stored_json(&self) -> String {
        self.store.borrow().to_json()
    }

    /// Roll a round with the current counts, show it and record it.
    pub fn roll_minions<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<MinionRolls, AppError> {
        let counts = MinionCounts::from(self.state()?);
        let rolls = roll_minions(counts, rng)?;
        info!(
            skeletons = rolls.skeleton_roll.len(),
            zombies = rolls.zombie_roll.len(),
            "minions rolled"
        );
        *self.rolls.borrow_mut() = Some(rolls.clone());
        self.history.borrow_mut().push(rolls.clone());
        Ok(rolls)
    }

    /// Rolls on display.
    #[must_use]
    pub fn rolls(&self) -> Option<MinionRolls> {
        self.rolls.borrow().clone()
    }

    /// Show the previous round. Returns `false` if there is none.
    pub fn back(&self) -> bool {
        self.history.borrow_mut().back()
    }

    /// Show the next round. Returns `false` if there is none.
    pub fn forward(&self) -> bool {
        self.history.borrow_mut().forward()
    }
}

impl std::fmt::Debug for NecRomancer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NecRomancer")
            .field("form", &self.form)
            .field("history", &self.history)
            .field("bindings", &self.scope.binding_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use necro_runtime::persist::MemoryStorage;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn seeds_fields_from_storage() {
        let storage = MemoryStorage::new();
        storage
            .store(STORAGE_KEY, r#"{"skeletons":4,"skeletonWeapons":2,"zombies":-1}"#)
            .expect("seed");
        let app = NecRomancer::new(storage).expect("app");

        assert_eq!(
            app.state().expect("state"),
            NecRomancerState {
                skeletons: 4,
                skeleton_weapons: 2,
                zombies: 0
            }
        );
        assert_eq!(app.field_names().collect::<Vec<_>>(), ["skeletons", "skeletonWeapons", "zombies"]);
    }

    #[test]
    fn changes_persist_only_while_connected() {
        let storage = MemoryStorage::new();
        let mut app = NecRomancer::new(storage.clone()).expect("app");
        let zombies = app.field("zombies").expect("field").clone();

        zombies.set_value(2);
        assert_eq!(storage.record(STORAGE_KEY), None);

        app.connect();
        app.connect();
        zombies.set_value(3);
        assert_eq!(
            storage.record(STORAGE_KEY).as_deref(),
            Some(r#"{"skeletons":0,"skeletonWeapons":0,"zombies":3}"#)
        );

        app.disconnect();
        zombies.set_value(5);
        assert_eq!(app.stored_json(), r#"{"skeletons":0,"skeletonWeapons":0,"zombies":3}"#);
    }

    #[test]
    fn history_navigation_switches_displayed_rolls() {
        let mut app = NecRomancer::new(MemoryStorage::new()).expect("app");
        app.connect();
        app.field("zombies").expect("field").set_value(1);

        let mut rng = StdRng::seed_from_u64(11);
        let first = app.roll_minions(&mut rng).expect("roll");
        let second = app.roll_minions(&mut rng).expect("roll");
        assert_eq!(app.rolls(), Some(second.clone()));

        assert!(app.back());
        assert_eq!(app.rolls(), Some(first));
        assert!(app.back());
        assert_eq!(app.rolls(), None);
        assert!(!app.back());
        assert!(app.forward());
        assert!(app.forward());
        assert_eq!(app.rolls(), Some(second));
    }

    #[test]
    fn unknown_field_is_reported() {
        let app = NecRomancer::new(MemoryStorage::new()).expect("app");
        assert!(matches!(app.control("liches"), Err(FormError::UnknownField(_))));
        assert!(app.field("liches").is_err());
    }
}
