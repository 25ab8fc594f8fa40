use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Body returned by login and signup. The token is optional on signup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// The signed-in user as reported by `/auth/me`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserProfile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn display_email(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_response_without_token() {
        let resp: AuthResponse =
            serde_json::from_str(r#"{"message": "User created"}"#).expect("valid JSON");
        assert_eq!(resp.token, None);
        assert_eq!(resp.message.as_deref(), Some("User created"));
    }

    #[test]
    fn test_parse_profile_with_extra_fields() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"_id": "66f0", "name": "Asha", "email": "asha@example.com", "role": "junior"}"#,
        )
        .expect("valid JSON");
        assert_eq!(profile.display_name(), "Asha");
        assert_eq!(profile.display_email(), "asha@example.com");

        let empty: UserProfile = serde_json::from_str("{}").expect("valid JSON");
        assert_eq!(empty.display_name(), "");
    }
}
