//! Identity claims decoded from the access token.
//!
//! The backend issues standard JWTs; the payload segment carries the user's
//! display name, email, username, and raw role list. Decoding here reads the
//! claims only - signature verification is the server's job, the client just
//! needs the attributes for display and role-based screen gating.

use base64::{engine::general_purpose, Engine};
use serde::Deserialize;

/// Roles relevant to the school-management screens. Raw token roles outside
/// this set (platform plumbing like `offline_access`) are filtered out.
pub const EDUCATIONAL_ROLES: [&str; 5] =
    ["admin", "director", "teacher", "auxiliary", "secretary"];

/// Sentinel primary role when the token carries no educational role
pub const DEFAULT_ROLE: &str = "guest";

/// User attributes and roles decoded from the access token's claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub display_name: String,
    pub email: String,
    pub username: String,
    /// Every role present in the token
    pub roles_all: Vec<String>,
    /// `roles_all` restricted to [`EDUCATIONAL_ROLES`], token order preserved
    pub roles_educational: Vec<String>,
    /// First educational role, or [`DEFAULT_ROLE`] if none
    pub primary_role: String,
}

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default, alias = "preferred_username")]
    username: String,
    #[serde(default, alias = "authorities")]
    roles: Vec<String>,
}

/// Decode the payload segment of `token` into an [`Identity`].
///
/// Returns `None` for anything that is not a well-formed JWT with a JSON
/// payload; callers treat that the same as having no token at all.
pub fn decode_identity(token: &str) -> Option<Identity> {
    let payload = token.split('.').nth(1)?;
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(payload).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;

    let roles_educational: Vec<String> = claims
        .roles
        .iter()
        .filter(|r| EDUCATIONAL_ROLES.contains(&r.as_str()))
        .cloned()
        .collect();
    let primary_role = roles_educational
        .first()
        .cloned()
        .unwrap_or_else(|| DEFAULT_ROLE.to_string());

    Some(Identity {
        display_name: claims.name,
        email: claims.email,
        username: claims.username,
        roles_all: claims.roles,
        roles_educational,
        primary_role,
    })
}

/// Build an unsigned JWT with the given payload JSON. Test helper shared
/// with the session manager tests.
#[cfg(test)]
pub(crate) fn make_token(payload: &serde_json::Value) -> String {
    let header = general_purpose::URL_SAFE_NO_PAD
        .encode(serde_json::json!({"alg": "HS256", "typ": "JWT"}).to_string());
    let body = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.sig", header, body)
}

// ============================================================================
// Tests
// ============================================================================
