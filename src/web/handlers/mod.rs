// src/web/handlers/mod.rs
pub mod job_handlers;
pub mod leave_handlers;
pub mod matching_handlers;
pub mod organization_handlers;
pub mod person_handlers;
pub mod recruitment_handlers;
pub mod staff_handlers;
pub mod system_handlers;

pub use job_handlers::*;
pub use leave_handlers::*;
pub use matching_handlers::*;
pub use organization_handlers::*;
pub use person_handlers::*;
pub use recruitment_handlers::*;
pub use staff_handlers::*;
pub use system_handlers::*;

use crate::error::HrResult;
use crate::web::types::ApiError;

/// Attach the request's conversation id to a domain failure.
pub(crate) trait OrApiError<T> {
    fn or_api(self, conversation_id: &Option<String>) -> Result<T, ApiError>;
}

impl<T> OrApiError<T> for HrResult<T> {
    fn or_api(self, conversation_id: &Option<String>) -> Result<T, ApiError> {
        self.map_err(|err| ApiError::from_hr(err, conversation_id.clone()))
    }
}
