mod api;
mod app;
mod assistant;
mod components;
mod cycle;
mod dom;
mod models;
mod pages;
mod state;
mod storage;
mod util;

use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(app::App);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::api::ApiClient;
    use crate::cycle::{CycleLog, DayLog, PeriodMarker};
    use crate::models::UserProfile;
    use crate::storage::{
        load_cycle_log, load_json_from_storage, load_user_from_storage, local_storage,
        save_cycle_log, save_user_to_storage, CYCLE_LOG_KEY,
    };
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_api_client_storage_roundtrip_token() {
        ApiClient::clear_storage();

        let mut c = ApiClient::load_from_storage();
        assert!(!c.is_authenticated());

        c.set_token("t1".to_string());
        c.save_to_storage();

        let c2 = ApiClient::load_from_storage();
        assert!(c2.is_authenticated());

        ApiClient::clear_storage();
        let c3 = ApiClient::load_from_storage();
        assert!(!c3.is_authenticated());
    }

    #[wasm_bindgen_test]
    fn test_user_storage_roundtrip() {
        let user = UserProfile {
            local_id: "uid-1".to_string(),
            email: "u@example.com".to_string(),
            display_name: Some("U".to_string()),
        };
        save_user_to_storage(&user);
        let loaded = load_user_from_storage().expect("should load user from localStorage");
        assert_eq!(loaded.email, "u@example.com");
        ApiClient::clear_storage();
    }

    #[wasm_bindgen_test]
    fn test_cycle_log_storage_roundtrip() {
        let mut log = CycleLog::new();
        log.insert(
            chrono::NaiveDate::from_ymd_opt(2026, 8, 1).expect("valid date"),
            DayLog {
                period: Some(PeriodMarker::Start),
                ..Default::default()
            },
        );
        save_cycle_log(&log);

        let loaded = load_cycle_log();
        assert_eq!(loaded, log);

        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(CYCLE_LOG_KEY);
        }
    }

    #[wasm_bindgen_test]
    fn test_corrupted_storage_key_is_cleared_on_read() {
        let storage = local_storage().expect("localStorage available in browser tests");
        let _ = storage.set_item(CYCLE_LOG_KEY, "{not valid json");

        // A corrupted payload reads as absent and drops the key.
        assert!(load_json_from_storage::<CycleLog>(CYCLE_LOG_KEY).is_none());
        assert_eq!(storage.get_item(CYCLE_LOG_KEY).ok().flatten(), None);
    }
}
