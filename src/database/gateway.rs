use crate::comment::model::Comment;
use crate::utils::error::CustomError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;

/// Stored comment fields a query can filter or sort on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentField {
    DocId,
    UserId,
    Content,
    CreateDate,
}

impl CommentField {
    /// Field name in the stored document
    pub fn as_str(self) -> &'static str {
        match self {
            CommentField::DocId => "doc_id",
            CommentField::UserId => "user_id",
            CommentField::Content => "content",
            CommentField::CreateDate => "create_date",
        }
    }

    pub fn text_of(self, comment: &Comment) -> Option<&str> {
        match self {
            CommentField::DocId => Some(comment.doc_id.as_str()),
            CommentField::UserId => Some(comment.user_id.as_str()),
            CommentField::Content => Some(comment.content.as_str()),
            CommentField::CreateDate => None,
        }
    }

    pub fn date_of(self, comment: &Comment) -> Option<DateTime<Utc>> {
        match self {
            CommentField::CreateDate => Some(comment.create_date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    IdIs(ObjectId),
    Is(CommentField, String),
    Regex {
        field: CommentField,
        pattern: String,
        case_insensitive: bool,
    },
}

/// Filter, sort and window over the comment collection.
/// Counting honours only the criteria.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub criteria: Vec<Criterion>,
    pub sort: Option<(CommentField, Direction)>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn by_id(id: ObjectId) -> Self {
        Self::new().id_is(id)
    }

    pub fn id_is(mut self, id: ObjectId) -> Self {
        self.criteria.push(Criterion::IdIs(id));
        self
    }

    pub fn is(mut self, field: CommentField, value: impl Into<String>) -> Self {
        self.criteria.push(Criterion::Is(field, value.into()));
        self
    }

    pub fn regex(mut self, field: CommentField, pattern: impl Into<String>, case_insensitive: bool) -> Self {
        self.criteria.push(Criterion::Regex {
            field,
            pattern: pattern.into(),
            case_insensitive,
        });
        self
    }

    pub fn sort(mut self, field: CommentField, direction: Direction) -> Self {
        self.sort = Some((field, direction));
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Replacement values for a content edit
#[derive(Debug, Clone, PartialEq)]
pub struct CommentUpdate {
    pub content: String,
    pub update_date: DateTime<Utc>,
}

/// Storage operations the comment service relies on
#[async_trait]
pub trait CommentGateway: Send + Sync {
    /// Persist a new comment, returning the identifier storage assigned
    async fn insert(&self, comment: Comment) -> Result<ObjectId, CustomError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError>;

    async fn find(&self, query: &Query) -> Result<Vec<Comment>, CustomError>;

    async fn count(&self, query: &Query) -> Result<u64, CustomError>;

    /// Apply `update` to the first match, returning how many documents matched
    async fn update_first(&self, query: &Query, update: CommentUpdate) -> Result<u64, CustomError>;

    /// Delete every match, returning how many documents were removed
    async fn remove(&self, query: &Query) -> Result<u64, CustomError>;

    /// Fast total taken from collection metadata
    async fn estimated_count(&self) -> Result<u64, CustomError>;
}
