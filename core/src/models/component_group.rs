use serde::{Deserialize, Serialize};

use super::schema::{Constraint, Field};
use super::{int_enum, Entity};

int_enum! {
    /// How the status page folds a group's components.
    GroupCollapse for "collapsed" {
        Expanded = 0,
        Collapsed = 1,
        CollapsedUnlessIncident = 2,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<GroupCollapse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl ComponentGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            order: None,
            collapsed: None,
            visible: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for ComponentGroup {
    const NAME: &'static str = "component group";
    const FIELDS: &'static [Field] = &[
        Field::optional("id", Constraint::Id),
        Field::required("name", Constraint::NonEmptyText),
        Field::optional("order", Constraint::Integer),
        Field::optional("collapsed", Constraint::OneOf(GroupCollapse::CODES)),
        Field::optional("visible", Constraint::Flag),
        Field::optional("created_at", Constraint::Text),
        Field::optional("updated_at", Constraint::Text),
    ];

    fn id(&self) -> Option<u64> {
        self.id
    }
}
