use serde::{Deserialize, Serialize};

use super::schema::{Constraint, Field};
use super::{int_enum, Entity};

int_enum! {
    /// How points falling into the same bucket are combined.
    MetricCalcType for "calc_type" {
        Sum = 0,
        Average = 1,
    }
}

/// A time series graphed on the status page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calc_type: Option<MetricCalcType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_chart: Option<bool>,
    /// Decimal places shown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub places: Option<i64>,
    /// 0 last hour, 1 last 12 hours, 2 last week, 3 last month.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_view: Option<i64>,
    /// Bucket width in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    /// 0 hidden, 1 public, 2 logged-in users only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Metric {
    pub fn new(name: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            suffix: Some(suffix.into()),
            description: None,
            default_value: None,
            calc_type: None,
            display_chart: None,
            places: None,
            default_view: None,
            threshold: None,
            order: None,
            visible: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl Entity for Metric {
    const NAME: &'static str = "metric";
    const FIELDS: &'static [Field] = &[
        Field::optional("id", Constraint::Id),
        Field::required("name", Constraint::NonEmptyText),
        Field::optional("suffix", Constraint::Text),
        Field::optional("description", Constraint::Text),
        Field::optional("default_value", Constraint::Number),
        Field::optional("calc_type", Constraint::OneOf(MetricCalcType::CODES)),
        Field::optional("display_chart", Constraint::Flag),
        Field::optional("places", Constraint::NonNegative),
        Field::optional("default_view", Constraint::OneOf(&[0, 1, 2, 3])),
        Field::optional("threshold", Constraint::NonNegative),
        Field::optional("order", Constraint::Integer),
        Field::optional("visible", Constraint::OneOf(&[0, 1, 2])),
        Field::optional("created_at", Constraint::Text),
        Field::optional("updated_at", Constraint::Text),
    ];

    fn id(&self) -> Option<u64> {
        self.id
    }
}
