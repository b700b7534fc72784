use crate::models::{Recipe, UserProfile, Workout};
use crate::storage::{local_storage, TOKEN_KEY, USER_KEY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ApiError {
    pub(crate) fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    pub(crate) fn unauthorized(message: &str) -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: message.to_string(),
        }
    }

    pub(crate) fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

/// Deploy-time configuration read from `window.ENV`.
///
/// Keys are documented UPPER_SNAKE; the lowercase spelling is accepted too
/// for compatibility with older deploy scripts.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub auth_url: String,
    pub auth_key: String,
    pub content_url: String,
    pub assistant_url: String,
    pub assistant_key: String,
    pub assistant_model: String,
}

fn env_string(env: &wasm_bindgen::JsValue, name: &str) -> Option<String> {
    for key in [name.to_uppercase(), name.to_lowercase()] {
        if let Ok(value) = js_sys::Reflect::get(env, &key.as_str().into()) {
            if let Some(s) = value.as_string() {
                return Some(s);
            }
        }
    }
    None
}

impl EnvConfig {
    pub fn new() -> Self {
        let mut config = Self {
            auth_url: "https://identitytoolkit.googleapis.com".to_string(),
            auth_key: String::new(),
            content_url: String::new(),
            assistant_url: "https://generativelanguage.googleapis.com".to_string(),
            assistant_key: String::new(),
            assistant_model: "gemini-2.0-flash".to_string(),
        };

        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Some(v) = env_string(&env, "AUTH_URL") {
                        config.auth_url = v;
                    }
                    if let Some(v) = env_string(&env, "AUTH_KEY") {
                        config.auth_key = v;
                    }
                    if let Some(v) = env_string(&env, "CONTENT_URL") {
                        config.content_url = v;
                    }
                    if let Some(v) = env_string(&env, "ASSISTANT_URL") {
                        config.assistant_url = v;
                    }
                    if let Some(v) = env_string(&env, "ASSISTANT_KEY") {
                        config.assistant_key = v;
                    }
                    if let Some(v) = env_string(&env, "ASSISTANT_MODEL") {
                        config.assistant_model = v;
                    }
                }
            }
        }

        config
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

// The identity provider speaks camelCase on both directions.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CredentialsRequest {
    pub email: String,
    pub password: String,
    pub return_secure_token: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TokenResponse {
    pub id_token: String,
    pub local_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<String>,
}

impl TokenResponse {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            local_id: self.local_id.clone(),
            email: self.email.clone(),
            display_name: self
                .display_name
                .as_deref()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.to_string()),
        }
    }
}

/// Turn an identity-provider error body into a message fit for the login
/// form. Unknown codes fall back to the raw provider message.
pub(crate) fn parse_identity_error(status: reqwest::StatusCode, body: &str) -> ApiError {
    let code = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(|s| s.to_string())
        })
        .unwrap_or_default();

    match code.as_str() {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            ApiError::unauthorized("Invalid email or password")
        }
        "USER_DISABLED" => ApiError::unauthorized("This account has been disabled"),
        "EMAIL_EXISTS" => {
            ApiError::http(status, body.to_string(), "An account with this email already exists")
        }
        _ if code.starts_with("WEAK_PASSWORD") => {
            ApiError::http(status, body.to_string(), "Password is too weak")
        }
        _ if code.starts_with("TOO_MANY_ATTEMPTS") => {
            ApiError::http(status, body.to_string(), "Too many attempts; try again later")
        }
        _ => ApiError::http(status, body.to_string(), "Sign-in failed"),
    }
}

/// Client for the external identity provider. Business data never goes
/// through it; only credentials and the session token.
#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) auth_url: String,
    pub(crate) auth_key: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    #[allow(dead_code)]
    pub fn new(auth_url: String, auth_key: String) -> Self {
        Self {
            auth_url,
            auth_key,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let env = EnvConfig::new();
        let token = local_storage().and_then(|s| s.get_item(TOKEN_KEY).ok().flatten());

        Self {
            auth_url: env.auth_url,
            auth_key: env.auth_key,
            token,
        }
    }

    pub fn save_to_storage(&self) {
        if let Some(storage) = local_storage() {
            if let Some(token) = &self.token {
                let _ = storage.set_item(TOKEN_KEY, token);
            }
        }
    }

    pub fn clear_storage() {
        if let Some(storage) = local_storage() {
            let _ = storage.remove_item(TOKEN_KEY);
            let _ = storage.remove_item(USER_KEY);
        }
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    fn account_endpoint(&self, op: &str) -> String {
        format!(
            "{}/v1/accounts:{op}?key={}",
            self.auth_url,
            urlencoding::encode(&self.auth_key)
        )
    }

    async fn credentials_request(&self, op: &str, email: &str, password: &str) -> ApiResult<TokenResponse> {
        let client = reqwest::Client::new();
        let res = client
            .post(self.account_endpoint(op))
            .json(&CredentialsRequest {
                email: email.to_string(),
                password: password.to_string(),
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(parse_identity_error(status, &body))
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        self.credentials_request("signInWithPassword", email, password)
            .await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> ApiResult<TokenResponse> {
        self.credentials_request("signUp", email, password).await
    }
}

pub(crate) const WORKOUTS_PATH: &str = "/content/workouts.json";
pub(crate) const RECIPES_PATH: &str = "/content/recipes.json";

/// Fetches the static catalog documents.
///
/// Responses are memoized in-memory for the lifetime of this value; the
/// owner (the app context) decides when the cache dies. Refresh goes
/// through [`ContentClient::invalidate`].
#[derive(Clone, Default)]
pub(crate) struct ContentClient {
    pub(crate) base_url: String,
    cache: HashMap<String, serde_json::Value>,
}

impl ContentClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            cache: HashMap::new(),
        }
    }

    pub fn load_from_env() -> Self {
        Self::new(EnvConfig::new().content_url)
    }

    pub(crate) fn cached(&self, path: &str) -> Option<&serde_json::Value> {
        self.cache.get(path)
    }

    pub(crate) fn store(&mut self, path: &str, value: serde_json::Value) {
        self.cache.insert(path.to_string(), value);
    }

    pub fn invalidate(&mut self, path: &str) {
        self.cache.remove(path);
    }

    async fn get_json(&mut self, path: &str) -> ApiResult<serde_json::Value> {
        if let Some(hit) = self.cached(path) {
            return Ok(hit.clone());
        }

        let client = reqwest::Client::new();
        let url = format!("{}{path}", self.base_url);
        let res = client.get(url).send().await.map_err(ApiError::network)?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::http(status, body, "Content fetch failed"));
        }

        let data: serde_json::Value = res.json().await.map_err(ApiError::parse)?;
        self.store(path, data.clone());
        Ok(data)
    }

    pub async fn get_workouts(&mut self) -> ApiResult<Vec<Workout>> {
        let data = self.get_json(WORKOUTS_PATH).await?;
        Ok(Self::parse_workout_list_response(data))
    }

    pub async fn get_recipes(&mut self) -> ApiResult<Vec<Recipe>> {
        let data = self.get_json(RECIPES_PATH).await?;
        Ok(Self::parse_recipe_list_response(data))
    }

    pub(crate) fn parse_workout_list_response(data: serde_json::Value) -> Vec<Workout> {
        let list = data
            .get("workouts")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut out: Vec<Workout> = Vec::with_capacity(list.len());
        for item in list {
            let get_s = |k: &str| item.get(k).and_then(|v| v.as_str()).map(|s| s.to_string());
            let get_n = |k: &str| item.get(k).and_then(|v| v.as_u64());

            let id = get_s("id").unwrap_or_default();
            let title = get_s("title").unwrap_or_default();

            if !id.trim().is_empty() && !title.trim().is_empty() {
                out.push(Workout {
                    id,
                    title,
                    category: get_s("category").unwrap_or_default(),
                    minutes: get_n("minutes").unwrap_or(0) as u32,
                    level: get_s("level").unwrap_or_default(),
                    description: get_s("description").unwrap_or_default(),
                    // Catalog files have shipped both spellings.
                    video_url: get_s("video_url").or_else(|| get_s("videoUrl")),
                });
            }
        }

        out
    }

    pub(crate) fn parse_recipe_list_response(data: serde_json::Value) -> Vec<Recipe> {
        let list = data
            .get("recipes")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut out: Vec<Recipe> = Vec::with_capacity(list.len());
        for item in list {
            let get_s = |k: &str| item.get(k).and_then(|v| v.as_str()).map(|s| s.to_string());
            let get_list = |k: &str| {
                item.get(k)
                    .and_then(|v| v.as_array())
                    .map(|a| {
                        a.iter()
                            .filter_map(|v| v.as_str())
                            .map(|s| s.to_string())
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            };

            let id = get_s("id").unwrap_or_default();
            let title = get_s("title").unwrap_or_default();

            if !id.trim().is_empty() && !title.trim().is_empty() {
                out.push(Recipe {
                    id,
                    title,
                    minutes: item.get("minutes").and_then(|v| v.as_u64()).unwrap_or(0) as u32,
                    tags: get_list("tags"),
                    ingredients: get_list("ingredients"),
                    description: get_s("description").unwrap_or_default(),
                });
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_request_uses_camel_case() {
        let req = CredentialsRequest {
            email: "u@example.com".to_string(),
            password: "pass".to_string(),
            return_secure_token: true,
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["email"], "u@example.com");
        assert_eq!(v["returnSecureToken"], true);
        assert!(v.get("return_secure_token").is_none());
    }

    #[test]
    fn test_token_response_contract_deserialize() {
        let json = r#"{
            "idToken": "jwt-token",
            "localId": "uid-1",
            "email": "u@example.com",
            "displayName": "",
            "refreshToken": "r1",
            "expiresIn": "3600"
        }"#;
        let parsed: TokenResponse = serde_json::from_str(json).expect("token response should parse");
        assert_eq!(parsed.id_token, "jwt-token");
        assert_eq!(parsed.local_id, "uid-1");

        // Blank display names are dropped from the profile.
        let profile = parsed.profile();
        assert_eq!(profile.email, "u@example.com");
        assert!(profile.display_name.is_none());
    }

    #[test]
    fn test_token_response_tolerates_missing_optionals() {
        let json = r#"{"idToken": "t", "localId": "u", "email": "e@x.io"}"#;
        let parsed: TokenResponse = serde_json::from_str(json).expect("should parse");
        assert!(parsed.refresh_token.is_none());
        assert!(parsed.expires_in.is_none());
    }

    #[test]
    fn test_identity_error_maps_bad_credentials() {
        let body = r#"{"error": {"code": 400, "message": "INVALID_LOGIN_CREDENTIALS"}}"#;
        let err = parse_identity_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind, ApiErrorKind::Unauthorized);
        assert_eq!(err.message, "Invalid email or password");
    }

    #[test]
    fn test_identity_error_maps_weak_password_with_detail() {
        let body =
            r#"{"error": {"message": "WEAK_PASSWORD : Password should be at least 6 characters"}}"#;
        let err = parse_identity_error(reqwest::StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind, ApiErrorKind::Http);
        assert!(err.message.starts_with("Password is too weak"));
    }

    #[test]
    fn test_identity_error_unknown_code_falls_through() {
        let err = parse_identity_error(reqwest::StatusCode::INTERNAL_SERVER_ERROR, "oops");
        assert_eq!(err.kind, ApiErrorKind::Http);
        assert!(err.message.starts_with("Sign-in failed"));
    }

    #[test]
    fn test_api_client_token_lifecycle() {
        let mut client = ApiClient::new("https://auth.example".to_string(), "k".to_string());
        assert!(!client.is_authenticated());

        client.set_token("session-token".to_string());
        assert!(client.is_authenticated());
        assert_eq!(client.token.as_deref(), Some("session-token"));
    }

    #[test]
    fn test_account_endpoint_escapes_key() {
        let client = ApiClient::new("https://auth.example".to_string(), "k&y=1".to_string());
        assert_eq!(
            client.account_endpoint("signUp"),
            "https://auth.example/v1/accounts:signUp?key=k%26y%3D1"
        );
    }

    #[test]
    fn test_content_cache_hit_and_invalidate() {
        let mut content = ContentClient::new(String::new());
        assert!(content.cached(WORKOUTS_PATH).is_none());

        content.store(WORKOUTS_PATH, serde_json::json!({"workouts": []}));
        assert!(content.cached(WORKOUTS_PATH).is_some());
        // Paths are independent cache entries.
        assert!(content.cached(RECIPES_PATH).is_none());

        content.invalidate(WORKOUTS_PATH);
        assert!(content.cached(WORKOUTS_PATH).is_none());
    }

    #[test]
    fn test_parse_workout_list_tolerates_partial_entries() {
        let data = serde_json::json!({
            "workouts": [
                {
                    "id": "w1",
                    "title": "Morning Flow",
                    "category": "yoga",
                    "minutes": 20,
                    "level": "beginner",
                    "videoUrl": "https://cdn.example/w1.mp4"
                },
                {"id": "", "title": "No id"},
                {"title": "No id at all"},
                {"id": "w2", "title": "Intervals", "category": "cardio", "minutes": 30, "level": "advanced", "video_url": "https://cdn.example/w2.mp4"}
            ]
        });

        let workouts = ContentClient::parse_workout_list_response(data);
        assert_eq!(workouts.len(), 2);
        assert_eq!(workouts[0].id, "w1");
        assert_eq!(
            workouts[0].video_url.as_deref(),
            Some("https://cdn.example/w1.mp4")
        );
        assert_eq!(workouts[1].id, "w2");
        assert_eq!(
            workouts[1].video_url.as_deref(),
            Some("https://cdn.example/w2.mp4")
        );
    }

    #[test]
    fn test_parse_workout_list_empty_document() {
        assert!(ContentClient::parse_workout_list_response(serde_json::json!({})).is_empty());
        assert!(
            ContentClient::parse_workout_list_response(serde_json::json!({"workouts": "nope"}))
                .is_empty()
        );
    }

    #[test]
    fn test_parse_recipe_list_response() {
        let data = serde_json::json!({
            "recipes": [
                {
                    "id": "r1",
                    "title": "Overnight Oats",
                    "minutes": 10,
                    "tags": ["breakfast", "high-protein"],
                    "ingredients": ["oats", "milk", "chia"],
                    "description": "Prep the night before."
                },
                {"id": "r2", "title": "Green Bowl"}
            ]
        });

        let recipes = ContentClient::parse_recipe_list_response(data);
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[0].tags.len(), 2);
        assert_eq!(recipes[0].ingredients.len(), 3);
        assert_eq!(recipes[1].minutes, 0);
        assert!(recipes[1].tags.is_empty());
    }
}
