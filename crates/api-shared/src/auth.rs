use otboard_core::{Role, SessionGate};

/// Header carrying the session token issued at login.
pub const SESSION_HEADER: &str = "x-session-token";

/// Why a request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("Missing x-session-token header")]
    MissingToken,
    #[error("Session is not active")]
    UnknownSession,
    #[error("Role {0} may not use this view")]
    Forbidden(Role),
}

/// Resolves the session behind `token` and checks its role against `allowed`.
///
/// Returns the session's role on success.
pub fn authorise(
    gate: &SessionGate,
    token: Option<&str>,
    allowed: &[Role],
) -> Result<Role, AccessError> {
    let token = token
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AccessError::MissingToken)?;

    let role = gate.role(token).ok_or(AccessError::UnknownSession)?;

    if allowed.contains(&role) {
        Ok(role)
    } else {
        Err(AccessError::Forbidden(role))
    }
}
