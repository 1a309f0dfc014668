use bytes::Bytes;
use mailcast_multipart::{FileAttachment, Form};
use tracing::info;

use crate::classify::classify;
use crate::data::SubmissionResult;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::transport::{Method, Request, Transport};

/// Collection path of the broadcast resource.
pub const BROADCAST_MAILS: &str = "broadcast_mails";

/// Field name of every image part.
pub const IMAGE_FIELD: &str = "images[]";

/// Field name of every tag entry.
pub const TAG_FIELD: &str = "tag_ids[]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Update(u64),
}

impl Operation {
    /// `Update` when the document already carries a server id.
    pub fn for_existing(id: Option<u64>) -> Self { id.map_or(Operation::Create, Operation::Update) }
}

/// The metadata and body of one broadcast as sent to the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastDraft {
    pub subject:         String,
    pub content:         String,
    pub tenant_email_id: Option<u64>,
    pub scheduled_at:    Option<String>,
    pub tag_ids:         Vec<u64>,
}

impl BroadcastDraft {
    pub fn new(subject: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn tenant_email_id(mut self, id: u64) -> Self {
        self.tenant_email_id = Some(id);
        self
    }

    pub fn scheduled_at(mut self, at: impl Into<String>) -> Self {
        self.scheduled_at = Some(at.into());
        self
    }

    pub fn tag_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.tag_ids.extend(ids);
        self
    }

    pub fn to_form(&self, images: &[FileAttachment]) -> Form {
        let mut form = Form::new()
            .text("subject", &self.subject)
            .text("content", &self.content);

        if let Some(id) = self.tenant_email_id {
            form = form.text("tenant_email_id", id.to_string());
        }
        if let Some(at) = self.scheduled_at.as_deref().filter(|at| !at.is_empty()) {
            form = form.text("scheduled_at", at);
        }
        for id in &self.tag_ids {
            form = form.repeated(TAG_FIELD, id.to_string());
        }
        for image in images {
            form = form.attach(image.clone());
        }
        form
    }
}

/// An `images[]` part for one resolved image.
pub fn image_attachment(filename: impl Into<String>, data: impl Into<Bytes>) -> FileAttachment {
    FileAttachment::new(IMAGE_FIELD, filename, data)
}

/// Encode, send and classify one create or update call.
///
/// Holds no state between calls. Two concurrent updates of the same id are
/// not ordered; whichever response the server processes last wins.
pub struct SubmissionService<T> {
    transport: T,
    endpoint:  Endpoint,
}

impl<T: Transport> SubmissionService<T> {
    pub fn new(transport: T, endpoint: Endpoint) -> Self { Self { transport, endpoint } }

    pub fn endpoint(&self) -> &Endpoint { &self.endpoint }

    pub async fn submit(
        &self,
        operation: Operation,
        draft: &BroadcastDraft,
        images: &[FileAttachment],
    ) -> Result<SubmissionResult> {
        let body = draft.to_form(images).encode();

        let (method, url) = match operation {
            Operation::Create => (Method::Post, self.endpoint.url(BROADCAST_MAILS)),
            Operation::Update(id) => (Method::Patch, self.endpoint.url(&format!("{BROADCAST_MAILS}/{id}"))),
        };
        info!(%method, %url, bytes = body.len(), images = images.len(), "submitting broadcast mail");

        let response = self
            .transport
            .send(Request::write(method, url, self.endpoint.token(), body))
            .await?;

        classify(response.status, response.body)
    }

    pub async fn create(&self, draft: &BroadcastDraft, images: &[FileAttachment]) -> Result<SubmissionResult> {
        self.submit(Operation::Create, draft, images).await
    }

    pub async fn update(
        &self,
        id: u64,
        draft: &BroadcastDraft,
        images: &[FileAttachment],
    ) -> Result<SubmissionResult> {
        self.submit(Operation::Update(id), draft, images).await
    }
}
