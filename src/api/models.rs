//! Synthetic user payloads

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// User identifier as it appears in responses.
///
/// Ids read from the path are echoed back as the original string; generated
/// ids are numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Generated(i64),
    Path(String),
}

/// Account status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// A post attached to a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: u32,
    pub title: String,
}

/// User record, built fresh for every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub status: UserStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub posts: Option<Vec<Post>>,
}

impl User {
    /// Placeholder user for a path id
    pub fn placeholder(id: &str) -> Self {
        Self {
            id: UserId::Path(id.to_string()),
            name: format!("User {}", id),
            email: None,
            status: UserStatus::Active,
            posts: None,
        }
    }

    /// Newly created user
    pub fn created(id: i64, name: String, email: String) -> Self {
        Self {
            id: UserId::Generated(id),
            name,
            email: Some(email),
            status: UserStatus::Active,
            posts: None,
        }
    }

    /// Attach the fixed sample posts
    pub fn with_posts(mut self) -> Self {
        self.posts = Some(sample_posts());
        self
    }
}

/// The two posts every user is shown with
pub fn sample_posts() -> Vec<Post> {
    vec![
        Post {
            id: 1,
            title: "Hello World".to_string(),
        },
        Post {
            id: 2,
            title: "Express.js is great!".to_string(),
        },
    ]
}

/// Confirmation returned by update
#[derive(Debug, Clone, Serialize)]
pub struct UpdateUserResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Value>,
}

/// Generic success response
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub message: String,
}
