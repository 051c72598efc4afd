pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use crate::config::{ClientConfig, ProbePolicy, RetryPolicy};
pub use crate::core::routes::RouteTable;
pub use crate::core::session::{Session, SessionGuard, SessionManager, TokenSessionFactory};
pub use crate::core::submit::Uploader;
pub use crate::domain::model::{DomainObject, HealthCheck, Progress, SubmitMode};
pub use crate::domain::ports::{BackendProfile, ObjectSubmitter, SessionFactory};
pub use crate::domain::profile::StaticProfile;
pub use crate::utils::error::{Result, UploadError};
pub use crate::utils::logger::init_logger;
