use crate::core::routes::RouteTable;
use crate::domain::model::{DomainObject, HealthCheck, SubmitMode};
use crate::domain::ports::BackendProfile;
use crate::utils::error::Result;
use serde_json::{json, Value};

/// A [`BackendProfile`] assembled from static route tables and healthcheck
/// lists, for backends following the create/edit REST convention.
///
/// Create mode serializes the object's fields verbatim. Edit mode drops
/// unset (`null`) fields and, when the object carries `uuid` and `type`
/// fields, wraps the payload in the `{"uuid", "type", "data"}` envelope the
/// edit endpoints expect.
#[derive(Debug, Clone, Default)]
pub struct StaticProfile {
    healthchecks: Vec<HealthCheck>,
    create_routes: RouteTable,
    edit_routes: RouteTable,
}

impl StaticProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_healthcheck(mut self, path: impl Into<String>, marker: impl Into<String>) -> Self {
        self.healthchecks.push(HealthCheck::new(path, marker));
        self
    }

    pub fn with_create_route(
        mut self,
        type_tag: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.create_routes.insert(type_tag, template);
        self
    }

    pub fn with_edit_route(
        mut self,
        type_tag: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.edit_routes.insert(type_tag, template);
        self
    }
}

impl BackendProfile for StaticProfile {
    fn healthchecks(&self) -> Vec<HealthCheck> {
        self.healthchecks.clone()
    }

    fn routes(&self, mode: SubmitMode) -> &RouteTable {
        match mode {
            SubmitMode::Create => &self.create_routes,
            SubmitMode::Edit => &self.edit_routes,
        }
    }

    fn serialize(&self, obj: &DomainObject, mode: SubmitMode) -> Result<Value> {
        match mode {
            SubmitMode::Create => Ok(Value::Object(obj.fields.clone())),
            SubmitMode::Edit => {
                let mut data = obj.fields.clone();
                data.retain(|_, value| !value.is_null());

                match (obj.field("uuid"), obj.field("type")) {
                    (Some(uuid), Some(kind)) => Ok(json!({
                        "uuid": uuid,
                        "type": kind,
                        "data": Value::Object(data),
                    })),
                    _ => Ok(Value::Object(data)),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee() -> DomainObject {
        DomainObject::new("employee")
            .with_field("uuid", "abc-123")
            .with_field("type", "employee")
            .with_field("name", "Ada")
            .with_field("nickname", Value::Null)
    }

    #[test]
    fn create_mode_keeps_unset_fields() {
        let profile = StaticProfile::new();
        let body = profile.serialize(&employee(), SubmitMode::Create).unwrap();

        assert_eq!(body["name"], "Ada");
        assert!(body["nickname"].is_null());
    }

    #[test]
    fn edit_mode_drops_unset_fields_and_wraps() {
        let profile = StaticProfile::new();
        let body = profile.serialize(&employee(), SubmitMode::Edit).unwrap();

        assert_eq!(body["uuid"], "abc-123");
        assert_eq!(body["type"], "employee");
        assert_eq!(body["data"]["name"], "Ada");
        assert!(body["data"].get("nickname").is_none());
    }

    #[test]
    fn edit_mode_without_identity_stays_flat() {
        let profile = StaticProfile::new();
        let obj = DomainObject::new("tag").with_field("name", "x");
        let body = profile.serialize(&obj, SubmitMode::Edit).unwrap();

        assert_eq!(body["name"], "x");
        assert!(body.get("data").is_none());
    }
}
