//! Status-code policy applied to every response before its body is used.

use ureq::http::Response;
use ureq::Body;

use crate::error::{Error, Result, StatusError};

/// Whether `status` counts as success when the caller expects no specific code.
pub fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

/// Fail unless the response has the expected status (when one is given) and
/// is a 2xx.
///
/// On a non-2xx response the body is read as the error message; an empty or
/// unreadable body leaves the message unset.
pub(crate) fn check_status(response: &mut Response<Body>, expected: Option<u16>) -> Result<()> {
    let actual = response.status().as_u16();
    if let Some(expected) = expected {
        if expected != actual {
            return Err(Error::UnexpectedStatus { expected, actual });
        }
    }

    if is_success(actual) {
        return Ok(());
    }

    let message = read_text(response.body_mut())
        .ok()
        .filter(|text| !text.is_empty());
    Err(StatusError::new(actual, message).into())
}

/// Read the whole body as text, however large. Bytes that are not UTF-8 are
/// replaced rather than rejected.
pub(crate) fn read_text(body: &mut Body) -> std::result::Result<String, ureq::Error> {
    let bytes = body.with_config().limit(u64::MAX).read_to_vec()?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
