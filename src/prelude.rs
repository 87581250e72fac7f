// Common imports that are used throughout the project
pub use crate::errors::{ScorehubError, StoreError};

pub use serde::{ Deserialize, Serialize };
pub use chrono::{ DateTime, Utc };
pub use std::collections::HashMap;
pub use std::sync::Arc;
pub use async_trait::async_trait;
