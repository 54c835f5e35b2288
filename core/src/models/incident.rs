use serde::{Deserialize, Serialize};

use super::component::ComponentStatus;
use super::schema::{Constraint, Field};
use super::{int_enum, Entity};

int_enum! {
    /// Lifecycle stage of an incident.
    IncidentStatus for "status" {
        Scheduled = 0,
        Investigating = 1,
        Identified = 2,
        Watching = 3,
        Fixed = 4,
    }
}

/// A reported disruption, optionally tied to one component.
///
/// `created_at` is server-assigned and never sent on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<IncidentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_id: Option<u64>,
    /// Status to put `component_id` into; the server ignores `component_id`
    /// without it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component_status: Option<ComponentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stickied: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Incident {
    pub fn new(name: impl Into<String>, status: IncidentStatus) -> Self {
        Self {
            id: None,
            name: name.into(),
            status: Some(status),
            message: None,
            visible: None,
            component_id: None,
            component_status: None,
            notify: None,
            stickied: None,
            occurred_at: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Attach the incident to a component and set that component's status.
    pub fn affecting(mut self, component_id: u64, status: ComponentStatus) -> Self {
        self.component_id = Some(component_id);
        self.component_status = Some(status);
        self
    }
}

impl Entity for Incident {
    const NAME: &'static str = "incident";
    const FIELDS: &'static [Field] = &[
        Field::optional("id", Constraint::Id),
        Field::required("name", Constraint::NonEmptyText),
        Field::optional("status", Constraint::OneOf(IncidentStatus::CODES)),
        Field::optional("message", Constraint::Text),
        Field::optional("visible", Constraint::Flag),
        Field::optional("component_id", Constraint::NonNegative),
        Field::optional("component_status", Constraint::OneOf(ComponentStatus::CODES)),
        Field::optional("notify", Constraint::Flag),
        Field::optional("stickied", Constraint::Flag),
        Field::optional("occurred_at", Constraint::Text),
        Field::optional("created_at", Constraint::Text),
        Field::optional("updated_at", Constraint::Text),
    ];

    fn id(&self) -> Option<u64> {
        self.id
    }
}
