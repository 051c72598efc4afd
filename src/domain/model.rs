use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An opaque domain object: a runtime type tag plus named fields.
///
/// Objects are caller-owned and never mutated by the uploader; they are only
/// read for routing (URL placeholders) and serialized into request bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainObject {
    pub type_tag: String,
    pub fields: Map<String, Value>,
}

impl DomainObject {
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            fields: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Whether a submission creates new resources or edits existing ones.
/// Routing and serialization both branch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitMode {
    Create,
    Edit,
}

/// A readiness endpoint and the marker its JSON body must contain.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub path: String,
    pub marker: String,
}

impl HealthCheck {
    pub fn new(path: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            marker: marker.into(),
        }
    }
}

/// Snapshot delivered to the progress reporter after each completed chunk.
/// `label` names the type whose chunk just finished.
#[derive(Debug, Clone)]
pub struct Progress {
    pub total: usize,
    pub completed: usize,
    pub label: String,
}
