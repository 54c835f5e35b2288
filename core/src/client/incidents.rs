use super::{resolve_update, CachetClient};
use crate::error::ApiError;
use crate::models::{IdOrEntity, Incident};
use crate::payload::{incident_create_body, incident_update_body, Payload};

impl CachetClient {
    pub fn list_incidents(&self, filter: &[(&str, &str)]) -> Result<Vec<Incident>, ApiError> {
        self.fetch_list("/incidents", filter)
    }

    pub fn get_incident(&self, id: u64) -> Result<Incident, ApiError> {
        self.fetch_one(&format!("/incidents/{id}"))
    }

    /// Create an incident. `component_id` is only sent when
    /// `component_status` is present too.
    pub fn add_incident(&self, incident: impl Into<Payload>) -> Result<Incident, ApiError> {
        self.create("/incidents", incident_create_body(incident.into()))
    }

    /// Update an incident. `created_at` is never sent, and `component_id`
    /// only together with `component_status`.
    pub fn update_incident<'a>(
        &self,
        target: impl Into<IdOrEntity<'a, Incident>>,
        payload: Option<Payload>,
    ) -> Result<Incident, ApiError> {
        let (id, body) = resolve_update(target.into(), payload)?;
        self.replace(&format!("/incidents/{id}"), incident_update_body(body))
    }

    pub fn delete_incident<'a>(
        &self,
        target: impl Into<IdOrEntity<'a, Incident>>,
    ) -> Result<(), ApiError> {
        let id = target.into().id()?;
        self.remove(&format!("/incidents/{id}"))
    }
}
