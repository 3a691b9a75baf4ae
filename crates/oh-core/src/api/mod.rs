//! Backend error taxonomy shared by every port that talks HTTP.

mod error;

pub use error::{ApiError, FieldError};
