//! Contract of the remote user service (`/api/user/check`, `/api/user/login`).
//!
//! `UserService` is implemented over `fetch` by the web frontend and in
//! process by [`UserDirectory`], which mirrors the server's trial rules and
//! backs offline mode and the tests.

use crate::core::constants::{API_CHECK_PATH, API_LOGIN_PATH};
use crate::core::phone::PhoneNumber;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResponse {
    pub exists: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub phone_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscribe_to_texts: Option<bool>,
}

impl LoginRequest {
    pub fn new(phone: &PhoneNumber, subscribe_to_texts: Option<bool>) -> Self {
        Self {
            phone_number: phone.e164().to_string(),
            subscribe_to_texts,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub phone_number: String,
    pub subscription: bool,
    pub trial_usage_remaining: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Error body of non-2xx responses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("trial access exhausted: {0}")]
    TrialExhausted(String),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map a non-2xx status and its raw body onto an error.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();
        let message = parsed
            .as_ref()
            .map(|b| b.message.clone().unwrap_or_else(|| b.error.clone()))
            .unwrap_or_else(|| body.trim().to_string());
        if status == 403 {
            ApiError::TrialExhausted(message)
        } else {
            ApiError::Status { status, message }
        }
    }

    /// Text shown inline under the phone form.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::TrialExhausted(msg) if !msg.is_empty() => msg.clone(),
            ApiError::TrialExhausted(_) => {
                "Please subscribe to continue accessing content".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}

/// `<base>/api/user/check?phoneNumber=<E.164>` with the `+` escaped.
pub fn check_url(base_url: &str, phone: &PhoneNumber) -> String {
    format!(
        "{}{}?phoneNumber={}",
        base_url.trim_end_matches('/'),
        API_CHECK_PATH,
        phone.e164().replace('+', "%2B")
    )
}

pub fn login_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), API_LOGIN_PATH)
}

/// Remote login/check collaborator. Futures are not `Send`; everything runs
/// on the page's single thread.
#[allow(async_fn_in_trait)]
pub trait UserService {
    async fn check(&self, phone: &PhoneNumber) -> Result<CheckResponse, ApiError>;
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError>;
}

#[derive(Clone, Debug)]
struct UserRecord {
    subscription: bool,
    trial_usage_remaining: u32,
}

/// In-process user directory with the server's trial semantics: new users
/// start with `trial_allowance` logins, each unsubscribed login consumes
/// one, and an unsubscribed user with none left gets a 403.
#[derive(Debug)]
pub struct UserDirectory {
    users: RefCell<HashMap<String, UserRecord>>,
    trial_allowance: u32,
    tokens_issued: Cell<u64>,
}

impl UserDirectory {
    pub fn new(trial_allowance: u32) -> Self {
        Self {
            users: RefCell::new(HashMap::new()),
            trial_allowance,
            tokens_issued: Cell::new(0),
        }
    }

    pub fn user_count(&self) -> usize {
        self.users.borrow().len()
    }
}

impl UserService for UserDirectory {
    async fn check(&self, phone: &PhoneNumber) -> Result<CheckResponse, ApiError> {
        Ok(CheckResponse {
            exists: self.users.borrow().contains_key(phone.e164()),
        })
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let phone = PhoneNumber::parse_e164(&request.phone_number).map_err(|_| ApiError::Status {
            status: 400,
            message: "Invalid phone number format".to_string(),
        })?;
        let mut users = self.users.borrow_mut();
        let user = users
            .entry(phone.e164().to_string())
            .or_insert_with(|| UserRecord {
                subscription: false,
                trial_usage_remaining: self.trial_allowance,
            });
        if request.subscribe_to_texts == Some(true) {
            user.subscription = true;
        }
        if !user.subscription && user.trial_usage_remaining == 0 {
            return Err(ApiError::TrialExhausted(
                "Please subscribe to continue accessing content".to_string(),
            ));
        }
        if !user.subscription {
            user.trial_usage_remaining -= 1;
        }
        let n = self.tokens_issued.get() + 1;
        self.tokens_issued.set(n);
        Ok(LoginResponse {
            token: format!("local-{}", n),
            user: UserProfile {
                phone_number: phone.e164().to_string(),
                subscription: user.subscription,
                trial_usage_remaining: user.trial_usage_remaining,
            },
        })
    }
}
