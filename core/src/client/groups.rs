use super::{resolve_update, CachetClient};
use crate::error::ApiError;
use crate::models::{ComponentGroup, IdOrEntity};
use crate::payload::Payload;

impl CachetClient {
    pub fn list_component_groups(
        &self,
        filter: &[(&str, &str)],
    ) -> Result<Vec<ComponentGroup>, ApiError> {
        self.fetch_list("/components/groups", filter)
    }

    pub fn get_component_group(&self, id: u64) -> Result<ComponentGroup, ApiError> {
        self.fetch_one(&format!("/components/groups/{id}"))
    }

    pub fn add_component_group(
        &self,
        group: impl Into<Payload>,
    ) -> Result<ComponentGroup, ApiError> {
        self.create("/components/groups", group.into())
    }

    pub fn update_component_group<'a>(
        &self,
        target: impl Into<IdOrEntity<'a, ComponentGroup>>,
        payload: Option<Payload>,
    ) -> Result<ComponentGroup, ApiError> {
        let (id, body) = resolve_update(target.into(), payload)?;
        self.replace(&format!("/components/groups/{id}"), body)
    }

    pub fn delete_component_group<'a>(
        &self,
        target: impl Into<IdOrEntity<'a, ComponentGroup>>,
    ) -> Result<(), ApiError> {
        let id = target.into().id()?;
        self.remove(&format!("/components/groups/{id}"))
    }
}
