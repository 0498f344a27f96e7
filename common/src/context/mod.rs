use std::sync::Arc;

use crate::error;

pub use self::effectfull_context::{ServiceRequest, ServiceState};
pub mod effectfull_context;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_context;

/// Handle passed to every façade call. Cloning shares the underlying client.
#[derive(Clone)]
pub struct Context(Arc<ServiceState>);

impl Context {
    pub fn new(state: ServiceState) -> Self {
        Self(Arc::new(state))
    }

    /// Context for the base URL configured in the environment.
    pub fn from_env() -> error::Result<Self> {
        Ok(Self::new(ServiceState::new()?))
    }

    pub fn with_base_url(base_url: impl Into<String>) -> error::Result<Self> {
        Ok(Self::new(ServiceState::with_base_url(base_url)?))
    }

    pub fn base_url(&self) -> &str {
        &self.0.base_url
    }

    pub fn make_request(&self) -> ServiceRequest<'_> {
        ServiceRequest::new(&self.0)
    }
}
