use serde::{Deserialize, Serialize};

use super::schema::{Constraint, Field};
use super::Entity;

/// One sample of a metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricPoint {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_id: Option<u64>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counter: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calculated_value: Option<f64>,
    /// Unix seconds; the server uses the current time when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl MetricPoint {
    pub fn new(value: f64) -> Self {
        Self {
            id: None,
            metric_id: None,
            value,
            counter: None,
            calculated_value: None,
            timestamp: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn for_metric(mut self, metric_id: u64) -> Self {
        self.metric_id = Some(metric_id);
        self
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

impl Entity for MetricPoint {
    const NAME: &'static str = "metric point";
    const FIELDS: &'static [Field] = &[
        Field::optional("id", Constraint::Id),
        Field::optional("metric_id", Constraint::Id),
        Field::required("value", Constraint::Number),
        Field::optional("counter", Constraint::Integer),
        Field::optional("calculated_value", Constraint::Number),
        Field::optional("timestamp", Constraint::Integer),
        Field::optional("created_at", Constraint::Text),
        Field::optional("updated_at", Constraint::Text),
    ];

    fn id(&self) -> Option<u64> {
        self.id
    }
}
