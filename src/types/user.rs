use serde::{Deserialize, Serialize};

/// Kind of account chosen at signup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Virtual portfolio funded with demo cash.
    Demo,
    /// Placeholder for a linked brokerage account (never connected).
    Brokerage,
}

/// A signed-up user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub account_type: AccountType,
    pub created_at: i64,
}

/// Signup form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub account_type: AccountType,
}

/// Demo setup step: pick a trader to follow.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoSetupRequest {
    pub trader_id: String,
}

/// Generated avatar for users without one.
pub fn default_avatar(name: &str) -> String {
    let encoded: String = name
        .chars()
        .map(|c| match c {
            'A'..='Z' | 'a'..='z' | '0'..='9' | '-' | '_' | '.' | '~' => c.to_string(),
            ' ' => "%20".to_string(),
            other => {
                let mut buf = [0u8; 4];
                other
                    .encode_utf8(&mut buf)
                    .bytes()
                    .map(|b| format!("%{:02X}", b))
                    .collect()
            }
        })
        .collect();
    format!("https://ui-avatars.com/api/?name={}&background=random", encoded)
}
