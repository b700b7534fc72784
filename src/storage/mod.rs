use crate::cycle::{CycleConfig, CycleLog};
use crate::models::{ChatMessage, RecentWorkout, UserProfile};
use crate::util::now_ms;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "verve_token";
pub(crate) const USER_KEY: &str = "verve_user";
pub(crate) const CYCLE_LOG_KEY: &str = "verve_cycle_log";
pub(crate) const CYCLE_CONFIG_KEY: &str = "verve_cycle_config";
pub(crate) const CHAT_HISTORY_KEY: &str = "verve_chat_history";
pub(crate) const RECENT_WORKOUTS_KEY: &str = "verve_recent_workouts";

pub(crate) fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = local_storage()?;
    let json = storage.get_item(key).ok().flatten()?;

    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(_) => {
            // A corrupted payload reads as "no data"; drop the key so the
            // next write starts clean.
            let _ = storage.remove_item(key);
            None
        }
    }
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = local_storage() {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn remove_from_storage(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

pub(crate) fn save_user_to_storage(user: &UserProfile) {
    save_json_to_storage(USER_KEY, user);
}

pub(crate) fn load_user_from_storage() -> Option<UserProfile> {
    load_json_from_storage(USER_KEY)
}

pub(crate) fn load_cycle_log() -> CycleLog {
    load_json_from_storage::<CycleLog>(CYCLE_LOG_KEY).unwrap_or_default()
}

pub(crate) fn save_cycle_log(log: &CycleLog) {
    save_json_to_storage(CYCLE_LOG_KEY, log);
}

pub(crate) fn load_cycle_config() -> CycleConfig {
    load_json_from_storage::<CycleConfig>(CYCLE_CONFIG_KEY).unwrap_or_default()
}

pub(crate) fn save_cycle_config(config: &CycleConfig) {
    save_json_to_storage(CYCLE_CONFIG_KEY, config);
}

pub(crate) fn load_chat_history() -> Vec<ChatMessage> {
    load_json_from_storage::<Vec<ChatMessage>>(CHAT_HISTORY_KEY).unwrap_or_default()
}

pub(crate) fn save_chat_history(messages: &[ChatMessage]) {
    save_json_to_storage(CHAT_HISTORY_KEY, &messages);
}

pub(crate) fn upsert_lru_by_key<T: Clone>(
    mut items: Vec<T>,
    item: T,
    same_key: impl Fn(&T, &T) -> bool,
    max: usize,
) -> Vec<T> {
    items.retain(|x| !same_key(x, &item));
    items.insert(0, item);
    if items.len() > max {
        items.truncate(max);
    }
    items
}

pub(crate) fn load_recent_workouts() -> Vec<RecentWorkout> {
    load_json_from_storage::<Vec<RecentWorkout>>(RECENT_WORKOUTS_KEY).unwrap_or_default()
}

pub(crate) fn write_recent_workout(id: &str, title: &str) {
    if id.trim().is_empty() {
        return;
    }

    let item = RecentWorkout {
        id: id.to_string(),
        title: title.to_string(),
        last_opened_ms: now_ms(),
    };

    let next = upsert_lru_by_key(load_recent_workouts(), item, |a, b| a.id == b.id, 8);
    save_json_to_storage(RECENT_WORKOUTS_KEY, &next);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_promotes_existing_key_to_front() {
        let items = vec![
            RecentWorkout {
                id: "w1".to_string(),
                title: "Core".to_string(),
                last_opened_ms: 1,
            },
            RecentWorkout {
                id: "w2".to_string(),
                title: "Flow".to_string(),
                last_opened_ms: 2,
            },
        ];

        let next = upsert_lru_by_key(
            items,
            RecentWorkout {
                id: "w2".to_string(),
                title: "Flow".to_string(),
                last_opened_ms: 3,
            },
            |a, b| a.id == b.id,
            8,
        );

        assert_eq!(next.len(), 2);
        assert_eq!(next[0].id, "w2");
        assert_eq!(next[0].last_opened_ms, 3);
        assert_eq!(next[1].id, "w1");
    }

    #[test]
    fn test_lru_caps_length() {
        let mut items = Vec::new();
        for i in 0..8 {
            items.push(RecentWorkout {
                id: format!("w{i}"),
                title: format!("Workout {i}"),
                last_opened_ms: i,
            });
        }

        let next = upsert_lru_by_key(
            items,
            RecentWorkout {
                id: "w-new".to_string(),
                title: "Newest".to_string(),
                last_opened_ms: 99,
            },
            |a, b| a.id == b.id,
            8,
        );

        assert_eq!(next.len(), 8);
        assert_eq!(next[0].id, "w-new");
        // The oldest entry falls off the end.
        assert!(next.iter().all(|w| w.id != "w7"));
    }
}
