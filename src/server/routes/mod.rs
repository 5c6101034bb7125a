mod backend;
mod quiz;

use crate::error::QuizError;

pub use backend::backend_router;
pub use quiz::quiz_router;

pub type ApiResponse<T> = Result<T, QuizError>;
