use serde::{Deserialize, Serialize};

/// A discussion thread ("publicación" on the backend).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thread {
    pub id: i64,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub author_name: String,
    pub category: String,
    pub title: String,
    #[serde(default, alias = "content")]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub like_count: i64,
    /// Count as stored by the backend. May lag behind the real comment list.
    #[serde(default)]
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewThread {
    pub author_id: i64,
    pub author_name: String,
    pub category: String,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: i64,
    pub thread_id: i64,
    #[serde(default)]
    pub author_id: Option<i64>,
    #[serde(default)]
    pub author_name: String,
    pub content: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub thread_id: i64,
    pub user_id: i64,
    pub content: String,
    pub author_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role_id: Option<i64>,
}

/// The only fields the account form sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    #[serde(default)]
    pub role_id: Option<i64>,
}

/// Role assigned to accounts created through registration.
pub const DEFAULT_ROLE_ID: i64 = 2;

/// Account status the backend expects for new users.
pub const ACTIVE_STATUS: &str = "ACTIVO";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRef {
    pub role_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub phone: String,
    pub email: String,
    pub status: String,
    pub role: RoleRef,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDonation {
    pub donor_id: i64,
    pub amount: u64,
    pub payment_method: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    #[serde(default)]
    pub id: i64,
    pub donor_id: i64,
    pub amount: u64,
    #[serde(default)]
    pub payment_method: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub created_at: String,
}
