pub mod claims;
pub mod error;
pub mod jwt_validator;
pub mod token_extraction;

pub use claims::Claims;
pub use error::{AuthError, Result};
pub use jwt_validator::JwtValidator;
pub use token_extraction::extract_access_token;
