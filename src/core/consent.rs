//! Phone-number consent gate.
//!
//! Playback stays blocked until a `ConsentRecord` with `granted = true` is in
//! the key-value store. `ConsentFlow` walks the user through it: validate the
//! number, check it against the user service, ask subscribe/decline, log in
//! with the chosen flag and persist the outcome.

use crate::core::api::{ApiError, CheckResponse, LoginRequest, LoginResponse, UserService};
use crate::core::constants::CONSENT_STORAGE_KEY;
use crate::core::phone::{PhoneError, PhoneNumber};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsentError {
    #[error(transparent)]
    Phone(#[from] PhoneError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("no phone number submitted yet")]
    NoPendingPhone,
}

impl ConsentError {
    /// Text shown inline under the phone form.
    pub fn user_message(&self) -> String {
        match self {
            ConsentError::Phone(e) => e.to_string(),
            ConsentError::Api(e) => e.user_message(),
            ConsentError::Storage(_) | ConsentError::NoPendingPhone => {
                "Something went wrong. Please try again.".to_string()
            }
        }
    }
}

/// Opaque persistent key-value store (`localStorage` in the browser).
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
}

/// Volatile store for tests and for pages without storage access.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub granted: bool,
    pub phone: Option<String>,
    #[serde(default)]
    pub subscribed: bool,
    pub timestamp: DateTime<Utc>,
}

impl ConsentRecord {
    /// Stored record, if any. A corrupt entry is treated as absent.
    pub fn load<K: KeyValueStore + ?Sized>(store: &K) -> Option<Self> {
        let raw = store.get(CONSENT_STORAGE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(r) => Some(r),
            Err(e) => {
                log::warn!("[consent] ignoring corrupt record: {}", e);
                None
            }
        }
    }

    pub fn save<K: KeyValueStore + ?Sized>(&self, store: &K) -> Result<(), ConsentError> {
        let json = serde_json::to_string(self).map_err(|e| ConsentError::Storage(e.to_string()))?;
        store
            .set(CONSENT_STORAGE_KEY, &json)
            .map_err(ConsentError::Storage)
    }

    /// Whether the stored consent (if any) allows playback.
    pub fn is_granted(record: Option<&Self>) -> bool {
        record.map(|r| r.granted).unwrap_or(false)
    }
}

/// Drives the phone form and subscribe dialog against a user service.
///
/// Methods take `&self` so the flow can sit in an `Rc` and be awaited from
/// event handlers without holding a `RefCell` borrow across an await.
pub struct ConsentFlow<S, K> {
    service: S,
    store: K,
    pending: RefCell<Option<PhoneNumber>>,
    session: RefCell<Option<LoginResponse>>,
    /// Outcome decided in this page, which wins over the store.
    decided: Cell<Option<bool>>,
}

impl<S: UserService, K: KeyValueStore> ConsentFlow<S, K> {
    pub fn new(service: S, store: K) -> Self {
        Self {
            service,
            store,
            pending: RefCell::new(None),
            session: RefCell::new(None),
            decided: Cell::new(None),
        }
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    pub fn stored_record(&self) -> Option<ConsentRecord> {
        ConsentRecord::load(&self.store)
    }

    pub fn is_granted(&self) -> bool {
        self.decided
            .get()
            .unwrap_or_else(|| ConsentRecord::is_granted(self.stored_record().as_ref()))
    }

    /// Logged-in profile from the last successful login in this page.
    pub fn session(&self) -> Option<LoginResponse> {
        self.session.borrow().clone()
    }

    /// Validate `input` and look the number up. On success the caller shows
    /// the subscribe dialog.
    pub async fn submit_phone(&self, input: &str) -> Result<CheckResponse, ConsentError> {
        let phone = PhoneNumber::parse(input)?;
        log::info!("[consent] checking {}", phone);
        let check = self.service.check(&phone).await?;
        *self.pending.borrow_mut() = Some(phone);
        Ok(check)
    }

    /// User answered the subscribe dialog. Logs in with the chosen flag and
    /// persists the record. A store that cannot be written only logs; the
    /// grant then holds for this page. A trial-exhausted login persists a
    /// refused record and returns the error.
    pub async fn answer(
        &self,
        subscribe: bool,
        now: DateTime<Utc>,
    ) -> Result<ConsentRecord, ConsentError> {
        let phone = self
            .pending
            .borrow()
            .clone()
            .ok_or(ConsentError::NoPendingPhone)?;
        let request = LoginRequest::new(&phone, Some(subscribe));
        match self.service.login(&request).await {
            Ok(resp) => {
                let record = ConsentRecord {
                    granted: true,
                    phone: Some(phone.e164().to_string()),
                    subscribed: resp.user.subscription,
                    timestamp: now,
                };
                // Login already counted; an unsaved record lasts for this page.
                if let Err(e) = record.save(&self.store) {
                    log::warn!("[consent] granted for this page only: {}", e);
                }
                log::info!(
                    "[consent] granted for {} (subscribed={}, trial left={})",
                    phone,
                    resp.user.subscription,
                    resp.user.trial_usage_remaining
                );
                *self.session.borrow_mut() = Some(resp);
                *self.pending.borrow_mut() = None;
                self.decided.set(Some(true));
                Ok(record)
            }
            Err(ApiError::TrialExhausted(msg)) => {
                let refused = ConsentRecord {
                    granted: false,
                    phone: Some(phone.e164().to_string()),
                    subscribed: false,
                    timestamp: now,
                };
                if let Err(e) = refused.save(&self.store) {
                    log::warn!("[consent] refusal not persisted: {}", e);
                }
                log::warn!("[consent] trial exhausted for {}", phone);
                self.decided.set(Some(false));
                Err(ApiError::TrialExhausted(msg).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}
