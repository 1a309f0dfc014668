use serde::{Deserialize, Serialize};

/// Success payload of a create or update call.
///
/// Taken as the server sends it. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionResult {
    pub id:         Option<u64>,
    pub status:     String,
    pub url:        Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// One entry of a picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TenantEmail {
    pub id:           u64,
    #[serde(default)]
    pub email:        String,
    #[serde(default)]
    pub sender_name:  String,
    #[serde(default)]
    pub default:      bool,
    pub display_name: String,
}

impl From<TenantEmail> for SelectOption {
    fn from(email: TenantEmail) -> Self {
        Self {
            value: email.id.to_string(),
            label: email.display_name,
        }
    }
}
