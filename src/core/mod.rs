pub mod batch;
pub mod probe;
pub mod routes;
pub mod session;
pub mod submit;

pub use crate::domain::model::{DomainObject, Progress, SubmitMode};
pub use crate::domain::ports::{BackendProfile, ObjectSubmitter, SessionFactory};
pub use crate::utils::error::Result;
