use crate::core::consent::KeyValueStore;
use web_sys as web;

/// `window.localStorage`. Reads fail soft; writes report the browser error.
#[derive(Clone)]
pub struct LocalStore {
    storage: Option<web::Storage>,
}

impl LocalStore {
    pub fn open() -> Self {
        let storage = web::window().and_then(|w| w.local_storage().ok().flatten());
        if storage.is_none() {
            log::warn!("[storage] localStorage unavailable, consent will not persist");
        }
        Self { storage }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        match &self.storage {
            Some(s) => s.set_item(key, value).map_err(|e| format!("{:?}", e)),
            None => Err("localStorage unavailable".to_string()),
        }
    }
}
