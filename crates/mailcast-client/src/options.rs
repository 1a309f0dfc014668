use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::cache::OptionsCache;
use crate::data::{SelectOption, TenantEmail};
use crate::endpoint::Endpoint;
use crate::error::{Result, SubmissionError};
use crate::transport::{Request, Transport, snippet};

/// Cache key and collection path of the sender address list.
pub const TENANT_EMAILS: &str = "tenant_emails";

/// Reference lists used to fill in a broadcast's metadata.
pub struct OptionsClient<T> {
    transport: T,
    endpoint:  Endpoint,
    cache:     Arc<OptionsCache>,
}

impl<T: Transport> OptionsClient<T> {
    pub fn new(transport: T, endpoint: Endpoint, cache: Arc<OptionsCache>) -> Self {
        Self {
            transport,
            endpoint,
            cache,
        }
    }

    pub fn cache(&self) -> &OptionsCache { &self.cache }

    /// Sender addresses as `{value: id, label: display_name}`, cached.
    pub async fn tenant_emails(&self) -> Result<Vec<SelectOption>> {
        self.cache
            .fetch(TENANT_EMAILS, || self.load_tenant_emails())
            .await
    }

    /// Same as [`tenant_emails`](Self::tenant_emails) but always hits the
    /// network. Used right before presenting a picker.
    pub async fn refresh_tenant_emails(&self) -> Result<Vec<SelectOption>> {
        self.cache.invalidate(TENANT_EMAILS);
        self.tenant_emails().await
    }

    async fn load_tenant_emails(&self) -> Result<Vec<SelectOption>> {
        let request = Request::read(self.endpoint.url(TENANT_EMAILS), self.endpoint.token());
        let response = self.transport.send(request).await?;
        debug!(status = response.status, "GET {TENANT_EMAILS}");

        let items: Vec<TenantEmail> = match response.body {
            Some(body @ Value::Array(_)) => serde_json::from_value(body)
                .map_err(|e| SubmissionError::MalformedResponseShape(e.to_string()))?,
            Some(other) => {
                return Err(SubmissionError::MalformedResponseShape(snippet(&other.to_string())));
            },
            None => return Err(SubmissionError::MalformedResponseShape("empty body".into())),
        };

        Ok(items.into_iter().map(SelectOption::from).collect())
    }
}
