use crate::api::{ApiClient, ContentClient};
use crate::assistant::AssistantClient;
use crate::cycle::{CycleConfig, CycleLog};
use crate::models::{ChatMessage, Recipe, UserProfile, Workout};
use crate::storage::{
    load_chat_history, load_cycle_config, load_cycle_log, load_user_from_storage, local_storage,
};
use leptos::prelude::*;

/// Browser capabilities probed once at startup. Pages branch on these flags
/// instead of feature-detecting at call sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Capabilities {
    /// localStorage is reachable (private-mode browsers may deny it).
    pub storage: bool,
    /// `navigator.share` exists.
    pub share: bool,
}

impl Capabilities {
    pub fn probe() -> Self {
        let storage = local_storage().is_some();

        let share = web_sys::window()
            .map(|w| {
                let navigator = w.navigator();
                js_sys::Reflect::has(navigator.as_ref(), &"share".into()).unwrap_or(false)
            })
            .unwrap_or(false);

        Self { storage, share }
    }
}

// Every field is an arena-allocated signal handle, so the whole state is
// Copy and event handlers can capture it freely.
#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub content: RwSignal<ContentClient>,
    pub assistant: RwSignal<AssistantClient>,
    pub current_user: RwSignal<Option<UserProfile>>,

    /// Workout catalog (static content, cached by the content client).
    pub workouts: RwSignal<Vec<Workout>>,
    pub workouts_loading: RwSignal<bool>,
    pub workouts_error: RwSignal<Option<String>>,
    pub workouts_loaded_once: RwSignal<bool>,

    /// Selected workout category. Single source of truth for the filter;
    /// the chip row is a projection of this value.
    pub workout_filter: RwSignal<Option<String>>,

    pub recipes: RwSignal<Vec<Recipe>>,
    pub recipes_loading: RwSignal<bool>,
    pub recipes_error: RwSignal<Option<String>>,
    pub recipes_loaded_once: RwSignal<bool>,

    /// Cycle data, mirrored to localStorage on every change.
    pub cycle_config: RwSignal<CycleConfig>,
    pub cycle_log: RwSignal<CycleLog>,

    /// Coach conversation, persisted across sessions.
    pub chat_messages: RwSignal<Vec<ChatMessage>>,
    pub chat_pending: RwSignal<bool>,
    pub chat_error: RwSignal<Option<String>>,

    /// Coach request guard (ignore responses from superseded requests).
    pub chat_request_id: RwSignal<u64>,

    pub capabilities: Capabilities,
}

impl AppState {
    pub fn new() -> Self {
        let stored_client = ApiClient::load_from_storage();
        let stored_user = load_user_from_storage();

        Self {
            api_client: RwSignal::new(stored_client),
            content: RwSignal::new(ContentClient::load_from_env()),
            assistant: RwSignal::new(AssistantClient::load_from_env()),
            current_user: RwSignal::new(stored_user),

            workouts: RwSignal::new(vec![]),
            workouts_loading: RwSignal::new(false),
            workouts_error: RwSignal::new(None),
            workouts_loaded_once: RwSignal::new(false),
            workout_filter: RwSignal::new(None),

            recipes: RwSignal::new(vec![]),
            recipes_loading: RwSignal::new(false),
            recipes_error: RwSignal::new(None),
            recipes_loaded_once: RwSignal::new(false),

            cycle_config: RwSignal::new(load_cycle_config()),
            cycle_log: RwSignal::new(load_cycle_log()),

            chat_messages: RwSignal::new(load_chat_history()),
            chat_pending: RwSignal::new(false),
            chat_error: RwSignal::new(None),
            chat_request_id: RwSignal::new(0),

            capabilities: Capabilities::probe(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
