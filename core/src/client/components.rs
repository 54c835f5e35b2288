use super::{resolve_update, CachetClient};
use crate::error::ApiError;
use crate::models::{Component, IdOrEntity};
use crate::payload::{component_body, Payload};

impl CachetClient {
    pub fn list_components(&self, filter: &[(&str, &str)]) -> Result<Vec<Component>, ApiError> {
        self.fetch_list("/components", filter)
    }

    pub fn get_component(&self, id: u64) -> Result<Component, ApiError> {
        self.fetch_one(&format!("/components/{id}"))
    }

    /// Create a component. `tags` is never sent.
    pub fn add_component(&self, component: impl Into<Payload>) -> Result<Component, ApiError> {
        self.create("/components", component_body(component.into()))
    }

    /// Update a component, either `(id, Some(payload))` or `(&entity, None)`.
    pub fn update_component<'a>(
        &self,
        target: impl Into<IdOrEntity<'a, Component>>,
        payload: Option<Payload>,
    ) -> Result<Component, ApiError> {
        let (id, body) = resolve_update(target.into(), payload)?;
        self.replace(&format!("/components/{id}"), component_body(body))
    }

    pub fn delete_component<'a>(
        &self,
        target: impl Into<IdOrEntity<'a, Component>>,
    ) -> Result<(), ApiError> {
        let id = target.into().id()?;
        self.remove(&format!("/components/{id}"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use crate::error::ApiError;
    use crate::models::{Component, ComponentStatus, Entity};
    use crate::payload::Payload;
    use crate::testing::mock_client;

    fn payload(value: Value) -> Payload {
        Payload::try_from(value).unwrap()
    }

    #[test]
    fn get_component_maps_payload() {
        let (client, transport) = mock_client();
        transport.respond(200, r#"{"data":{"id":1,"name":"Foo","status":1}}"#);

        let component = client.get_component(1).unwrap();
        assert_eq!(transport.last_call(), "GET /components/1");
        assert_eq!(component.name, "Foo");
        assert_eq!(component.status, Some(ComponentStatus::Operational));
    }

    #[test]
    fn get_missing_component_is_not_found() {
        let (client, transport) = mock_client();
        transport.respond(404, "");

        let err = client.get_component(42).unwrap_err();
        assert_eq!(err, ApiError::NotFound);
        assert_eq!(err.to_string(), "Requested resource not found");
    }

    #[test]
    fn list_preserves_server_order_and_passes_filter() {
        let (client, transport) = mock_client();
        transport.respond(
            200,
            r#"{"data":[{"id":3,"name":"C"},{"id":1,"name":"A"},{"id":2,"name":"B"}]}"#,
        );

        let components = client.list_components(&[("group_id", "4")]).unwrap();
        assert_eq!(transport.last_call(), "GET /components?group_id=4");
        let names: Vec<_> = components.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["C", "A", "B"]);
    }

    #[test]
    fn add_component_never_sends_tags() {
        let (client, transport) = mock_client();
        transport.respond(200, r#"{"data":{"id":8,"name":"X","status":1}}"#);

        let created = client
            .add_component(payload(json!({"name": "X", "status": 1, "tags": ["a"]})))
            .unwrap();
        assert_eq!(created.id, Some(8));
        assert_eq!(transport.last_call(), "POST /components");
        assert_eq!(transport.last_body(), json!({"name": "X", "status": 1}));
    }

    #[test]
    fn add_component_from_entity() {
        let (client, transport) = mock_client();
        transport.respond(200, r#"{"data":{"id":8,"name":"X","status":4}}"#);

        let mut component = Component::new("X").with_status(ComponentStatus::MajorOutage);
        component.tags = Some(json!({"core": "Core"}));
        client.add_component(&component).unwrap();
        assert_eq!(transport.last_body(), json!({"name": "X", "status": 4}));
    }

    #[test]
    fn application_errors_are_joined() {
        let (client, transport) = mock_client();
        transport.respond(400, r#"{"errors":[{"title":"Bad","detail":"x required"}]}"#);

        let err = client.add_component(payload(json!({"name": "X"}))).unwrap_err();
        assert_eq!(err.to_string(), "Bad: x required");
        assert_eq!(client.last_error().as_deref(), Some("Bad: x required"));
    }

    #[test]
    fn update_with_entity_matches_update_with_id_and_map() {
        let (client, transport) = mock_client();
        let response = r#"{"data":{"id":7,"name":"API","status":2}}"#;
        transport.respond(200, response);
        transport.respond(200, response);

        let mut component = Component::from_value(json!({"id": 7, "name": "API", "tags": {"a": "A"}})).unwrap();
        component.status = Some(ComponentStatus::PerformanceIssues);

        let updated = client.update_component(&component, None).unwrap();
        assert_eq!(updated.status, Some(ComponentStatus::PerformanceIssues));
        client
            .update_component(7_u64, Some(Payload::from(component.to_plain_map())))
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url, "http://status.local/api/v1/components/7");
        assert_eq!(requests[0], requests[1]);
        let body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body, json!({"id": 7, "name": "API", "status": 2}));
    }

    #[test]
    fn explicit_payload_overrides_entity_fields() {
        let (client, transport) = mock_client();
        transport.respond(200, r#"{"data":{"id":7,"name":"API","status":4}}"#);

        let component = Component::from_value(json!({"id": 7, "name": "API"})).unwrap();
        client
            .update_component(&component, Some(payload(json!({"status": 4}))))
            .unwrap();
        assert_eq!(transport.last_call(), "PUT /components/7");
        assert_eq!(transport.last_body(), json!({"status": 4}));
    }

    #[test]
    fn delete_accepts_id_or_entity() {
        let (client, transport) = mock_client();
        transport.respond(204, "");
        transport.respond(204, "");

        client.delete_component(3_u64).unwrap();
        assert_eq!(transport.last_call(), "DELETE /components/3");

        let component = Component::from_value(json!({"id": 5, "name": "API"})).unwrap();
        client.delete_component(&component).unwrap();
        assert_eq!(transport.last_call(), "DELETE /components/5");
        assert!(transport.last_request().body.is_none());
    }

    #[test]
    fn failed_delete_reports_error() {
        let (client, transport) = mock_client();
        transport.respond(404, "");

        assert_eq!(client.delete_component(3_u64), Err(ApiError::NotFound));
    }
}
