#![no_main]

use libfuzzer_sys::fuzz_target;
use necro_runtime::form::Selector;

fuzz_target!(|data: &str| {
    if let Ok(selector) = Selector::parse(data) {
        // Anything that parses must print back to an equal selector.
        let printed = selector.to_string();
        assert_eq!(Selector::parse(&printed).ok(), Some(selector));
    }
});
