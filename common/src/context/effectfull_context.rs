use reqwest::multipart::Form;

use crate::error::{self, ServiceError};
use crate::services::{API_BASE, REQUEST_TIMEOUT};

pub struct ServiceState {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl ServiceState {
    pub fn new() -> error::Result<Self> {
        Self::with_base_url(API_BASE.as_str())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> error::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = *REQUEST_TIMEOUT {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

pub struct ServiceRequest<'a> {
    state: &'a ServiceState,
    method: reqwest::Method,
    path: Option<String>,
    form: Option<Form>,
}

impl<'a> ServiceRequest<'a> {
    pub fn new(state: &'a ServiceState) -> Self {
        Self {
            state,
            method: reqwest::Method::GET,
            path: None,
            form: None,
        }
    }

    pub fn get(mut self, path: String) -> Self {
        self.path = Some(path);
        self
    }

    pub fn post(mut self, path: String) -> Self {
        self.path = Some(path);
        self.method = reqwest::Method::POST;
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.form = Some(form);
        self
    }

    /// Only failures to complete the round trip are errors here; the status
    /// is left for the caller to judge.
    pub async fn send(self) -> error::Result<reqwest::Response> {
        let Some(path) = self.path else {
            return Err(ServiceError::local(anyhow::anyhow!(
                "Request sent without a path"
            )));
        };
        let url = self.state.url(&path);

        log::debug!("{} {}", self.method, url);

        let mut request = self.state.client.request(self.method.clone(), &url);
        if let Some(form) = self.form {
            request = request.multipart(form);
        }

        let response = request.send().await.map_err(|err| {
            log::error!("{} {} failed: {}", self.method, url, err);
            ServiceError::from(err)
        })?;

        log::debug!("{} {} -> {}", self.method, url, response.status());

        Ok(response)
    }
}
