use serde::{Deserialize, Serialize};

use super::schema::{Constraint, Field};
use super::Entity;

/// An email address receiving status notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscriber {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_code: Option<String>,
    /// On create, mark the subscriber verified without sending a
    /// confirmation email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Subscriber {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            verify_code: None,
            verify: None,
            verified_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn is_verified(&self) -> bool {
        self.verified_at.is_some() || self.verify == Some(true)
    }
}

impl Entity for Subscriber {
    const NAME: &'static str = "subscriber";
    const FIELDS: &'static [Field] = &[
        Field::optional("id", Constraint::Id),
        Field::required("email", Constraint::NonEmptyText),
        Field::optional("verify_code", Constraint::Text),
        Field::optional("verify", Constraint::Flag),
        Field::optional("verified_at", Constraint::Text),
        Field::optional("created_at", Constraint::Text),
        Field::optional("updated_at", Constraint::Text),
    ];

    fn id(&self) -> Option<u64> {
        self.id
    }
}
