#![no_main]

use libfuzzer_sys::fuzz_target;
use necro_runtime::persist::{MemoryStorage, PersistentStore, StorageBackend};
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Counts {
    skeletons: u32,
    skeleton_weapons: u32,
    zombies: u32,
}

fuzz_target!(|blob: &str| {
    let storage = MemoryStorage::new();
    let _ = storage.store("state", blob);
    let defaults = Counts {
        skeletons: 0,
        skeleton_weapons: 0,
        zombies: 0,
    };
    let Ok(mut store) = PersistentStore::new("state", &defaults, storage.clone()) else {
        return;
    };
    for key in ["skeletons", "skeletonWeapons", "zombies"] {
        let _ = store.get(key);
    }
    if store.set("zombies", &1u32).is_ok() {
        let saved = storage.record("state").unwrap_or_default();
        assert!(saved.starts_with('{'));
    }
});
