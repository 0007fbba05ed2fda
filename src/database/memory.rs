use crate::comment::model::Comment;
use crate::database::gateway::{
    CommentField, CommentGateway, CommentUpdate, Criterion, Direction, Query,
};
use crate::utils::error::CustomError;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use regex::{Regex, RegexBuilder};
use std::cmp::Ordering;
use tokio::sync::RwLock;

enum Matcher<'a> {
    Id(&'a ObjectId),
    Is(CommentField, &'a str),
    Regex(CommentField, Regex),
}

impl Matcher<'_> {
    fn accepts(&self, comment: &Comment) -> bool {
        match self {
            Matcher::Id(id) => comment.id.as_ref() == Some(*id),
            Matcher::Is(field, value) => field.text_of(comment) == Some(*value),
            Matcher::Regex(field, re) => field.text_of(comment).is_some_and(|t| re.is_match(t)),
        }
    }
}

fn compile(query: &Query) -> Result<Vec<Matcher<'_>>, CustomError> {
    query
        .criteria
        .iter()
        .map(|criterion| match criterion {
            Criterion::IdIs(id) => Ok(Matcher::Id(id)),
            Criterion::Is(field, value) => Ok(Matcher::Is(*field, value.as_str())),
            Criterion::Regex {
                field,
                pattern,
                case_insensitive,
            } => RegexBuilder::new(pattern)
                .case_insensitive(*case_insensitive)
                .build()
                .map(|re| Matcher::Regex(*field, re))
                .map_err(|e| CustomError::StorageError(format!("Invalid regex: {}", e))),
        })
        .collect()
}

fn compare(a: &Comment, b: &Comment, field: CommentField) -> Ordering {
    let by_field = match (field.date_of(a), field.date_of(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => field.text_of(a).cmp(&field.text_of(b)),
    };
    by_field.then_with(|| a.id.cmp(&b.id))
}

/// In-process comment collection, used for local runs and tests
#[derive(Default)]
pub struct MemoryCommentGateway {
    comments: RwLock<Vec<Comment>>,
}

impl MemoryCommentGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommentGateway for MemoryCommentGateway {
    async fn insert(&self, mut comment: Comment) -> Result<ObjectId, CustomError> {
        let mut comments = self.comments.write().await;
        let id = comment.id.unwrap_or_else(ObjectId::new);
        if comments.iter().any(|c| c.id == Some(id)) {
            return Err(CustomError::StorageError(format!(
                "Duplicate key: _id {}",
                id.to_hex()
            )));
        }
        comment.id = Some(id);
        comments.push(comment);
        Ok(id)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        let comments = self.comments.read().await;
        Ok(comments.iter().find(|c| c.id.as_ref() == Some(id)).cloned())
    }

    async fn find(&self, query: &Query) -> Result<Vec<Comment>, CustomError> {
        let matchers = compile(query)?;
        let comments = self.comments.read().await;

        let mut found: Vec<Comment> = comments
            .iter()
            .filter(|c| matchers.iter().all(|m| m.accepts(c)))
            .cloned()
            .collect();

        if let Some((field, direction)) = query.sort {
            found.sort_by(|a, b| match direction {
                Direction::Asc => compare(a, b, field),
                Direction::Desc => compare(b, a, field),
            });
        }

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let take = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));

        Ok(found.into_iter().skip(skip).take(take).collect())
    }

    async fn count(&self, query: &Query) -> Result<u64, CustomError> {
        let matchers = compile(query)?;
        let comments = self.comments.read().await;
        let n = comments
            .iter()
            .filter(|c| matchers.iter().all(|m| m.accepts(c)))
            .count();
        Ok(n as u64)
    }

    async fn update_first(&self, query: &Query, update: CommentUpdate) -> Result<u64, CustomError> {
        let matchers = compile(query)?;
        let mut comments = self.comments.write().await;
        match comments
            .iter_mut()
            .find(|c| matchers.iter().all(|m| m.accepts(c)))
        {
            Some(comment) => {
                comment.content = update.content;
                comment.update_date = update.update_date;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn remove(&self, query: &Query) -> Result<u64, CustomError> {
        let matchers = compile(query)?;
        let mut comments = self.comments.write().await;
        let before = comments.len();
        comments.retain(|c| !matchers.iter().all(|m| m.accepts(c)));
        Ok((before - comments.len()) as u64)
    }

    async fn estimated_count(&self) -> Result<u64, CustomError> {
        Ok(self.comments.read().await.len() as u64)
    }
}
