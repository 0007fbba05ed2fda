use crate::comment::model::Comment;
use crate::database::gateway::{CommentGateway, CommentUpdate, Criterion, Direction, Query};
use crate::utils::error::CustomError;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures_util::TryStreamExt;
use log::debug;
use mongodb::bson::{self, Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};

/// Stored shape of a comment. Timestamps are BSON dates so that sorting on
/// `create_date` is chronological.
#[derive(Debug, Serialize, Deserialize)]
struct CommentDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    doc_id: String,
    user_id: String,
    user_name: String,
    content: String,
    create_date: bson::DateTime,
    update_date: bson::DateTime,
}

fn to_bson_date(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn from_bson_date(at: bson::DateTime) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(at.timestamp_millis())
        .single()
        .unwrap_or_default()
}

impl From<Comment> for CommentDocument {
    fn from(c: Comment) -> Self {
        CommentDocument {
            id: c.id,
            doc_id: c.doc_id,
            user_id: c.user_id,
            user_name: c.user_name,
            content: c.content,
            create_date: to_bson_date(c.create_date),
            update_date: to_bson_date(c.update_date),
        }
    }
}

impl From<CommentDocument> for Comment {
    fn from(d: CommentDocument) -> Self {
        Comment {
            id: d.id,
            doc_id: d.doc_id,
            user_id: d.user_id,
            user_name: d.user_name,
            content: d.content,
            create_date: from_bson_date(d.create_date),
            update_date: from_bson_date(d.update_date),
        }
    }
}

fn filter_of(query: &Query) -> Document {
    let mut filter = Document::new();
    for criterion in &query.criteria {
        match criterion {
            Criterion::IdIs(id) => {
                filter.insert("_id", *id);
            }
            Criterion::Is(field, value) => {
                filter.insert(field.as_str(), value.clone());
            }
            Criterion::Regex {
                field,
                pattern,
                case_insensitive,
            } => {
                let options = if *case_insensitive { "i" } else { "" };
                filter.insert(
                    field.as_str(),
                    doc! { "$regex": pattern.clone(), "$options": options },
                );
            }
        }
    }
    filter
}

fn sort_of(query: &Query) -> Option<Document> {
    query.sort.map(|(field, direction)| {
        let mut sort = Document::new();
        let order: i32 = match direction {
            Direction::Asc => 1,
            Direction::Desc => -1,
        };
        sort.insert(field.as_str(), order);
        sort
    })
}

/// Skip and limit as the server accepts them: both travel as signed 64-bit
/// integers, so larger values are clamped rather than rejected.
fn window_of(query: &Query) -> (u64, Option<i64>) {
    let max = i64::MAX.unsigned_abs();
    let skip = query.skip.min(max);
    let limit = query.limit.map(|l| i64::try_from(l).unwrap_or(i64::MAX));
    (skip, limit)
}

pub struct MongoCommentGateway {
    collection: Collection<CommentDocument>,
}

impl MongoCommentGateway {
    pub fn new(client: &Client, database: &str, collection: &str) -> Self {
        let collection = client
            .database(database)
            .collection::<CommentDocument>(collection);
        MongoCommentGateway { collection }
    }
}

#[async_trait]
impl CommentGateway for MongoCommentGateway {
    async fn insert(&self, comment: Comment) -> Result<ObjectId, CustomError> {
        let result = self
            .collection
            .insert_one(CommentDocument::from(comment))
            .await
            .map_err(|e| CustomError::StorageError(format!("Failed to add comment: {}", e)))?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            CustomError::StorageError("Failed to get inserted comment ID".to_string())
        })
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        let found = self
            .collection
            .find_one(doc! { "_id": *id })
            .await
            .map_err(|e| CustomError::StorageError(format!("Failed to fetch comment: {}", e)))?;

        Ok(found.map(Comment::from))
    }

    async fn find(&self, query: &Query) -> Result<Vec<Comment>, CustomError> {
        let filter = filter_of(query);
        debug!("find comments filter={} sort={:?}", filter, query.sort);

        let (skip, limit) = window_of(query);
        let mut action = self.collection.find(filter).skip(skip);
        if let Some(sort) = sort_of(query) {
            action = action.sort(sort);
        }
        if let Some(limit) = limit {
            action = action.limit(limit);
        }

        let cursor = action
            .await
            .map_err(|e| CustomError::StorageError(format!("Failed to fetch comments: {}", e)))?;

        let documents: Vec<CommentDocument> = cursor.try_collect().await.map_err(|e| {
            CustomError::StorageError(format!("Failed to collect comments: {}", e))
        })?;

        Ok(documents.into_iter().map(Comment::from).collect())
    }

    async fn count(&self, query: &Query) -> Result<u64, CustomError> {
        self.collection
            .count_documents(filter_of(query))
            .await
            .map_err(|e| CustomError::StorageError(format!("Failed to count comments: {}", e)))
    }

    async fn update_first(&self, query: &Query, update: CommentUpdate) -> Result<u64, CustomError> {
        let result = self
            .collection
            .update_one(
                filter_of(query),
                doc! {
                    "$set": {
                        "content": update.content,
                        "update_date": to_bson_date(update.update_date),
                    }
                },
            )
            .await
            .map_err(|e| CustomError::StorageError(format!("Failed to update comment: {}", e)))?;

        Ok(result.matched_count)
    }

    async fn remove(&self, query: &Query) -> Result<u64, CustomError> {
        let result = self
            .collection
            .delete_many(filter_of(query))
            .await
            .map_err(|e| CustomError::StorageError(format!("Failed to delete comment: {}", e)))?;

        Ok(result.deleted_count)
    }

    async fn estimated_count(&self) -> Result<u64, CustomError> {
        self.collection
            .estimated_document_count()
            .await
            .map_err(|e| CustomError::StorageError(format!("Failed to count comments: {}", e)))
    }
}
