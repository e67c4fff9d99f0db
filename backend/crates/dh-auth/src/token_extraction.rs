use crate::{AuthError, Result as AuthErrorResult};

use std::panic::Location;

use error_location::ErrorLocation;

/// Find the access token in headers forwarded by the gateway.
///
/// A `Bearer` authorization header wins over the named cookie. Header names
/// match case-insensitively.
#[track_caller]
pub fn extract_access_token<'a, I>(headers: I, cookie_name: &str) -> AuthErrorResult<String>
where
    I: IntoIterator<Item = (&'a str, &'a str)> + Clone,
{
    for (name, value) in headers.clone() {
        if !name.eq_ignore_ascii_case("authorization") {
            continue;
        }
        if let Some((scheme, token)) = value.split_once(' ')
            && scheme.eq_ignore_ascii_case("bearer")
            && !token.trim().is_empty()
        {
            return Ok(token.trim().to_string());
        }
    }

    for (name, value) in headers {
        if !name.eq_ignore_ascii_case("cookie") {
            continue;
        }
        for part in value.split(';') {
            if let Some((key, val)) = part.trim().split_once('=')
                && key.trim() == cookie_name
                && !val.trim().is_empty()
            {
                return Ok(val.trim().to_string());
            }
        }
    }

    Err(AuthError::MissingToken {
        location: ErrorLocation::from(Location::caller()),
    })
}
