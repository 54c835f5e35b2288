use serde_json::Value;

use super::{resolve_update, CachetClient};
use crate::error::{ApiError, ValidationError};
use crate::models::schema::{self, Constraint, Field};
use crate::models::{IdOrEntity, Metric, MetricPoint};
use crate::payload::Payload;

const METRIC_ID: Field = Field::required("metric_id", Constraint::Id);

impl CachetClient {
    pub fn list_metrics(&self, filter: &[(&str, &str)]) -> Result<Vec<Metric>, ApiError> {
        self.fetch_list("/metrics", filter)
    }

    pub fn get_metric(&self, id: u64) -> Result<Metric, ApiError> {
        self.fetch_one(&format!("/metrics/{id}"))
    }

    pub fn add_metric(&self, metric: impl Into<Payload>) -> Result<Metric, ApiError> {
        self.create("/metrics", metric.into())
    }

    pub fn update_metric<'a>(
        &self,
        target: impl Into<IdOrEntity<'a, Metric>>,
        payload: Option<Payload>,
    ) -> Result<Metric, ApiError> {
        let (id, body) = resolve_update(target.into(), payload)?;
        self.replace(&format!("/metrics/{id}"), body)
    }

    pub fn delete_metric<'a>(&self, target: impl Into<IdOrEntity<'a, Metric>>) -> Result<(), ApiError> {
        let id = target.into().id()?;
        self.remove(&format!("/metrics/{id}"))
    }

    pub fn list_metric_points<'a>(
        &self,
        metric: impl Into<IdOrEntity<'a, Metric>>,
        filter: &[(&str, &str)],
    ) -> Result<Vec<MetricPoint>, ApiError> {
        let metric_id = metric.into().id()?;
        self.fetch_list(&format!("/metrics/{metric_id}/points"), filter)
    }

    /// Record a point. With `metric` set to `None` the point must carry its
    /// own `metric_id`.
    pub fn add_metric_point(
        &self,
        metric: Option<IdOrEntity<'_, Metric>>,
        point: impl Into<Payload>,
    ) -> Result<MetricPoint, ApiError> {
        let body = point.into();
        let metric_id = match metric {
            Some(metric) => metric.id()?,
            None => metric_id_of(&body)?,
        };
        self.create(&format!("/metrics/{metric_id}/points"), body)
    }

    /// Delete a point. With `metric` set to `None` the point must be an entity
    /// carrying its own `metric_id`.
    pub fn delete_metric_point<'a>(
        &self,
        metric: Option<IdOrEntity<'_, Metric>>,
        point: impl Into<IdOrEntity<'a, MetricPoint>>,
    ) -> Result<(), ApiError> {
        let point = point.into();
        let point_id = point.id()?;
        let metric_id = match metric {
            Some(metric) => metric.id()?,
            None => point
                .entity()
                .and_then(|p| p.metric_id)
                .ok_or(ValidationError::Missing { field: "metric_id" })?,
        };
        self.remove(&format!("/metrics/{metric_id}/points/{point_id}"))
    }
}

fn metric_id_of(body: &Payload) -> Result<u64, ValidationError> {
    match body.get("metric_id") {
        None | Some(Value::Null) => Err(ValidationError::Missing { field: "metric_id" }),
        Some(value) => schema::check(&METRIC_ID, value.clone())?
            .as_u64()
            .ok_or(ValidationError::Missing { field: "metric_id" }),
    }
}
