use serde_json::Value;
use tracing::warn;

use crate::data::SubmissionResult;
use crate::error::{Result, SubmissionError};

/// Maps a create/update response to its outcome.
///
/// - `200`/`201`: the body is taken as a [`SubmissionResult`] without
///   further checks; a missing or mistyped body yields an empty result
/// - `401`: [`SubmissionError::Unauthorized`]
/// - `422` with a non-empty `errors` list: [`SubmissionError::ValidationFailed`]
/// - anything else: [`SubmissionError::UnexpectedStatus`]
pub fn classify(status: u16, body: Option<Value>) -> Result<SubmissionResult> {
    match status {
        200 | 201 => Ok(success(body.unwrap_or(Value::Null))),
        401 => Err(SubmissionError::Unauthorized),
        422 => match validation_messages(body.as_ref()) {
            Some(messages) => Err(SubmissionError::ValidationFailed(messages)),
            None => Err(SubmissionError::UnexpectedStatus(status)),
        },
        _ => Err(SubmissionError::UnexpectedStatus(status)),
    }
}

/// The server has stored the broadcast by now, so a body that does not fit
/// is logged and passed through rather than turned into a failure.
fn success(body: Value) -> SubmissionResult {
    if !body.is_object() {
        warn!(body = %body, "success response without a JSON object");
        return SubmissionResult::default();
    }
    serde_json::from_value(body).unwrap_or_else(|e| {
        warn!(error = %e, "success response with unexpected field types");
        SubmissionResult::default()
    })
}

fn validation_messages(body: Option<&Value>) -> Option<Vec<String>> {
    let errors = body?.get("errors")?.as_array()?;
    let messages: Vec<String> = errors
        .iter()
        .map(|e| match e {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect();

    (!messages.is_empty()).then_some(messages)
}
