use crate::core::api::{
    check_url, login_url, ApiError, CheckResponse, LoginRequest, LoginResponse, UserDirectory,
    UserService,
};
use crate::core::config::ApiConfig;
use crate::core::phone::PhoneNumber;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;

/// `UserService` over `fetch`.
pub struct HttpUserService {
    base_url: String,
}

impl HttpUserService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
    let status = resp.status();
    let body = resp
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;
    if !resp.ok() {
        return Err(ApiError::from_response(status, &body));
    }
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

impl UserService for HttpUserService {
    async fn check(&self, phone: &PhoneNumber) -> Result<CheckResponse, ApiError> {
        let resp = Request::get(&check_url(&self.base_url, phone))
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(resp).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let resp = Request::post(&login_url(&self.base_url))
            .json(request)
            .map_err(|e| ApiError::Decode(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        decode(resp).await
    }
}

/// Remote service, or the in-process directory when running offline.
pub enum Backend {
    Remote(HttpUserService),
    Local(UserDirectory),
}

impl Backend {
    pub fn from_config(api: &ApiConfig) -> Self {
        if api.offline {
            log::info!(
                "[api] offline, local directory with {} trial logins",
                api.trial_allowance
            );
            Backend::Local(UserDirectory::new(api.trial_allowance))
        } else {
            log::info!("[api] remote at '{}'", api.base_url);
            Backend::Remote(HttpUserService::new(api.base_url.clone()))
        }
    }
}

impl UserService for Backend {
    async fn check(&self, phone: &PhoneNumber) -> Result<CheckResponse, ApiError> {
        match self {
            Backend::Remote(s) => s.check(phone).await,
            Backend::Local(s) => s.check(phone).await,
        }
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        match self {
            Backend::Remote(s) => s.login(request).await,
            Backend::Local(s) => s.login(request).await,
        }
    }
}
