use crate::domain::model::DomainObject;
use crate::utils::error::{Result, UploadError};
use serde_json::Value;
use std::collections::HashMap;

/// Routing table from object type tag to a URL path template.
///
/// Templates may embed `{field}` placeholders resolved against the object's
/// own fields, supporting per-instance endpoints such as
/// `/service/f/{facet_uuid}/`. Lookups are fail-closed: a missing tag is an
/// [`UploadError::UnknownType`], never a default route.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: HashMap<String, String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, type_tag: impl Into<String>, template: impl Into<String>) {
        self.routes.insert(type_tag.into(), template.into());
    }

    pub fn contains(&self, type_tag: &str) -> bool {
        self.routes.contains_key(type_tag)
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolve the path for `obj`, substituting `{field}` placeholders from
    /// its field values.
    pub fn resolve(&self, obj: &DomainObject) -> Result<String> {
        let template = self
            .routes
            .get(&obj.type_tag)
            .ok_or_else(|| UploadError::UnknownType {
                type_tag: obj.type_tag.clone(),
            })?;
        fill_placeholders(template, obj)
    }
}

fn fill_placeholders(template: &str, obj: &DomainObject) -> Result<String> {
    let mut resolved = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find('{') {
        resolved.push_str(&rest[..start]);
        let tail = &rest[start + 1..];
        let Some(end) = tail.find('}') else {
            // Unterminated brace: keep it literal.
            resolved.push_str(&rest[start..]);
            return Ok(resolved);
        };
        let name = &tail[..end];
        let value = obj.field(name).ok_or_else(|| UploadError::MissingField {
            name: name.to_string(),
            template: template.to_string(),
        })?;
        resolved.push_str(&placeholder_value(value));
        rest = &tail[end + 1..];
    }

    resolved.push_str(rest);
    Ok(resolved)
}

fn placeholder_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        let mut routes = RouteTable::new();
        routes.insert("employee", "/service/e/create");
        routes.insert("facet_class", "/service/f/{facet_uuid}/");
        routes.insert("seat", "/rooms/{room}/seats/{number}");
        routes
    }

    #[test]
    fn resolves_plain_route() {
        let obj = DomainObject::new("employee");
        assert_eq!(table().resolve(&obj).unwrap(), "/service/e/create");
    }

    #[test]
    fn substitutes_placeholders_from_fields() {
        let obj = DomainObject::new("seat")
            .with_field("room", "b-12")
            .with_field("number", 7);
        assert_eq!(table().resolve(&obj).unwrap(), "/rooms/b-12/seats/7");
    }

    #[test]
    fn unknown_type_is_fail_closed() {
        let obj = DomainObject::new("widget");
        let err = table().resolve(&obj).unwrap_err();
        assert!(matches!(err, UploadError::UnknownType { type_tag } if type_tag == "widget"));
    }

    #[test]
    fn missing_placeholder_field_fails() {
        let obj = DomainObject::new("facet_class");
        let err = table().resolve(&obj).unwrap_err();
        assert!(matches!(err, UploadError::MissingField { name, .. } if name == "facet_uuid"));
    }
}
