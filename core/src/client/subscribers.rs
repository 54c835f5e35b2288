use super::CachetClient;
use crate::error::ApiError;
use crate::models::{IdOrEntity, Subscriber};
use crate::payload::Payload;

impl CachetClient {
    pub fn list_subscribers(&self, filter: &[(&str, &str)]) -> Result<Vec<Subscriber>, ApiError> {
        self.fetch_list("/subscribers", filter)
    }

    pub fn add_subscriber(&self, subscriber: impl Into<Payload>) -> Result<Subscriber, ApiError> {
        self.create("/subscribers", subscriber.into())
    }

    pub fn delete_subscriber<'a>(
        &self,
        target: impl Into<IdOrEntity<'a, Subscriber>>,
    ) -> Result<(), ApiError> {
        let id = target.into().id()?;
        self.remove(&format!("/subscribers/{id}"))
    }
}
