use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::schema::{Constraint, Field};
use super::{int_enum, Entity};

int_enum! {
    /// Health of a component as shown on the status page.
    ComponentStatus for "status" {
        Operational = 1,
        PerformanceIssues = 2,
        PartialOutage = 3,
        MajorOutage = 4,
    }
}

/// A service or system shown on the status page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ComponentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// Owning group; `0` means ungrouped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            description: None,
            link: None,
            status: None,
            order: None,
            group_id: None,
            enabled: None,
            tags: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_status(mut self, status: ComponentStatus) -> Self {
        self.status = Some(status);
        self
    }
}

impl Entity for Component {
    const NAME: &'static str = "component";
    const FIELDS: &'static [Field] = &[
        Field::optional("id", Constraint::Id),
        Field::required("name", Constraint::NonEmptyText),
        Field::optional("description", Constraint::Text),
        Field::optional("link", Constraint::Text),
        Field::optional("status", Constraint::OneOf(ComponentStatus::CODES)),
        Field::optional("order", Constraint::Integer),
        Field::optional("group_id", Constraint::NonNegative),
        Field::optional("enabled", Constraint::Flag),
        Field::optional("tags", Constraint::Any),
        Field::optional("created_at", Constraint::Text),
        Field::optional("updated_at", Constraint::Text),
    ];

    fn id(&self) -> Option<u64> {
        self.id
    }
}
