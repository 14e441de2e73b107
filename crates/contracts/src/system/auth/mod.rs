use serde::{Deserialize, Serialize};

/// Claims carried by a bearer token.
///
/// Tokens are issued by the identity service; the storefront only verifies them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String, // user_id
    pub email: String,
    pub is_admin: bool,
    pub exp: usize, // expiration timestamp
    pub iat: usize, // issued at
}
