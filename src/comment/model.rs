use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub doc_id: String,
    pub user_id: String,
    pub user_name: String,
    pub content: String,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
}

impl Comment {
    /// Both author fields must carry text before a comment is written
    pub fn has_author(&self) -> bool {
        !self.user_id.trim().is_empty() && !self.user_name.trim().is_empty()
    }
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub doc_id: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct UpdateCommentRequest {
    pub content: String,
}

fn default_rows() -> u64 {
    10
}

fn default_page() -> u64 {
    1
}

/// Zero-based page of the comments attached to one document
#[derive(Debug, Deserialize, Clone)]
pub struct CommentListDto {
    pub doc_id: Option<String>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_rows")]
    pub rows: u64,
}

/// One-based page over every comment
#[derive(Debug, Deserialize, Clone)]
pub struct BasePageDto {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_rows")]
    pub rows: u64,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub keyword: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommentPage {
    #[serde(rename = "totalNum")]
    pub total_num: u64,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct AllComments {
    pub data: Vec<Comment>,
    pub total: u64,
}
