use crate::comment::model::{AllComments, BasePageDto, Comment, CommentListDto, CommentPage};
use crate::database::gateway::{CommentField, CommentGateway, CommentUpdate, Direction, Query};
use crate::utils::error::CustomError;
use crate::utils::helpers::MASK_CHAR;
use crate::utils::sensitive_filter::{ContentFilter, MatchType};
use chrono::Utc;
use log::{debug, error, info};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

const PARAMS_IS_NOT_NULL: &str = "required fields missing";
const OPERATE_FAILED: &str = "operation failed";
const PARAMS_FORMAT_ERROR: &str = "format error";

/// Comment lifecycle and queries. Holds no state of its own: every call reads
/// the current record from the gateway before acting on it.
pub struct CommentService {
    gateway: Arc<dyn CommentGateway>,
    filter: Arc<dyn ContentFilter>,
}

impl CommentService {
    pub fn new(gateway: Arc<dyn CommentGateway>, filter: Arc<dyn ContentFilter>) -> Self {
        CommentService { gateway, filter }
    }

    fn check_author(comment: &Comment) -> Result<(), CustomError> {
        if !comment.has_author() {
            return Err(CustomError::ValidationError(PARAMS_IS_NOT_NULL.to_string()));
        }
        Ok(())
    }

    fn clean(&self, content: &str) -> Result<String, CustomError> {
        self.filter
            .replace_sensitive_word(content, MatchType::Min, MASK_CHAR)
    }

    /// Identifier of the stored record when `author` owns it.
    ///
    /// A missing record compares like an ownerless placeholder, so it fails
    /// the same way a foreign record does.
    async fn owned_record(
        &self,
        id: Option<ObjectId>,
        author: &str,
    ) -> Result<ObjectId, CustomError> {
        let stored = match id {
            Some(id) => self.gateway.find_by_id(&id).await?,
            None => None,
        };

        match stored {
            Some(record) if record.user_id == author => record
                .id
                .ok_or_else(|| CustomError::AuthorizationError(OPERATE_FAILED.to_string())),
            _ => Err(CustomError::AuthorizationError(OPERATE_FAILED.to_string())),
        }
    }

    /// Add a comment to a document
    pub async fn insert(&self, mut comment: Comment) -> Result<ObjectId, CustomError> {
        Self::check_author(&comment)?;

        comment.content = self.clean(&comment.content)?;
        comment.id = None;
        let now = Utc::now();
        comment.create_date = now;
        comment.update_date = now;

        let id = self.gateway.insert(comment).await?;
        info!("Comment {} created", id.to_hex());
        Ok(id)
    }

    /// Edit the content of a comment (only its author can)
    pub async fn update(&self, comment: Comment) -> Result<(), CustomError> {
        Self::check_author(&comment)?;

        let id = self.owned_record(comment.id, &comment.user_id).await?;
        let content = self.clean(&comment.content)?;

        // owner is part of the match: a record that no longer passes the check is left alone
        let matched = self
            .gateway
            .update_first(
                &Query::by_id(id).is(CommentField::UserId, comment.user_id.as_str()),
                CommentUpdate {
                    content,
                    update_date: Utc::now(),
                },
            )
            .await
            .map_err(|e| {
                error!("Failed to update comment {}: {}", id.to_hex(), e);
                CustomError::StorageError(OPERATE_FAILED.to_string())
            })?;

        if matched == 0 {
            return Err(CustomError::AuthorizationError(OPERATE_FAILED.to_string()));
        }
        Ok(())
    }

    /// Delete a comment (only its author can).
    ///
    /// Ownership is decided by the author field of `comment`; `user_id` is
    /// only recorded in the log.
    pub async fn remove(&self, comment: &Comment, user_id: &str) -> Result<(), CustomError> {
        let id = self.owned_record(comment.id, &comment.user_id).await?;
        debug!("Comment {} removed at the request of {}", id.to_hex(), user_id);

        self.gateway.remove(&Query::by_id(id)).await?;
        Ok(())
    }

    /// Newest-first page of the comments on one document, with its total
    pub async fn query_by_id(&self, dto: &CommentListDto) -> Result<CommentPage, CustomError> {
        let doc_id = match dto.doc_id.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => return Err(CustomError::ValidationError(PARAMS_FORMAT_ERROR.to_string())),
        };
        if dto.rows == 0 {
            return Err(CustomError::ValidationError(PARAMS_FORMAT_ERROR.to_string()));
        }

        let query = Query::new()
            .is(CommentField::DocId, doc_id)
            .sort(CommentField::CreateDate, Direction::Desc);
        let total_num = self.gateway.count(&query).await?;

        let query = query
            .skip(dto.page.saturating_mul(dto.rows))
            .limit(dto.rows);
        let comments = self.gateway.find(&query).await?;

        Ok(CommentPage {
            total_num,
            comments,
        })
    }

    /// Newest-first page over every comment. `user_id` does not narrow the result.
    pub async fn query_all_comments(
        &self,
        page: &BasePageDto,
        user_id: &str,
    ) -> Result<AllComments, CustomError> {
        if page.rows == 0 {
            return Err(CustomError::ValidationError(PARAMS_FORMAT_ERROR.to_string()));
        }
        debug!("All comments page {} requested by {}", page.page, user_id);

        let query = Query::new().sort(CommentField::CreateDate, Direction::Desc);
        let total = self.gateway.count(&query).await?;

        let query = query
            .skip(page.page.saturating_sub(1).saturating_mul(page.rows))
            .limit(page.rows);
        let data = self.gateway.find(&query).await?;

        Ok(AllComments { data, total })
    }

    /// Number of comments on a document
    pub async fn comment_num(&self, doc_id: &str) -> Result<u64, CustomError> {
        self.gateway
            .count(&Query::new().is(CommentField::DocId, doc_id))
            .await
    }

    /// Document ids of every comment containing `keyword`, ignoring case.
    /// One entry per matching comment, so a document can repeat.
    pub async fn fuzzy_search_doc(&self, keyword: Option<&str>) -> Result<Vec<String>, CustomError> {
        let keyword = match keyword {
            Some(k) if !k.trim().is_empty() => k,
            _ => return Ok(Vec::new()),
        };

        let query = Query::new().regex(CommentField::Content, regex::escape(keyword), true);
        let comments = self.gateway.find(&query).await?;

        Ok(comments.into_iter().map(|c| c.doc_id).collect())
    }

    /// Delete every comment on a document, one record at a time.
    /// A failure part way leaves the earlier deletions in place.
    pub async fn remove_by_doc_id(&self, doc_id: &str) -> Result<u64, CustomError> {
        let comments = self
            .gateway
            .find(&Query::new().is(CommentField::DocId, doc_id))
            .await?;

        let mut removed = 0;
        for id in comments.iter().filter_map(|c| c.id) {
            let deleted = self
                .gateway
                .remove(&Query::by_id(id))
                .await
                .inspect_err(|e| {
                    error!(
                        "Removing comments of {} stopped after {} deletions: {}",
                        doc_id, removed, e
                    )
                })?;
            removed += deleted;
        }

        info!("Removed {} comments of document {}", removed, doc_id);
        Ok(removed)
    }

    /// Estimated size of the whole comment collection
    pub async fn count_all_file(&self) -> Result<u64, CustomError> {
        self.gateway.estimated_count().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryCommentGateway;
    use crate::utils::sensitive_filter::{SensitiveFilter, WordListFilter};
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    /// Gateway whose every operation fails, to prove a path never reaches storage
    struct UnreachableGateway;

    #[async_trait]
    impl CommentGateway for UnreachableGateway {
        async fn insert(&self, _: Comment) -> Result<ObjectId, CustomError> {
            Err(CustomError::StorageError("down".into()))
        }
        async fn find_by_id(&self, _: &ObjectId) -> Result<Option<Comment>, CustomError> {
            Err(CustomError::StorageError("down".into()))
        }
        async fn find(&self, _: &Query) -> Result<Vec<Comment>, CustomError> {
            Err(CustomError::StorageError("down".into()))
        }
        async fn count(&self, _: &Query) -> Result<u64, CustomError> {
            Err(CustomError::StorageError("down".into()))
        }
        async fn update_first(&self, _: &Query, _: CommentUpdate) -> Result<u64, CustomError> {
            Err(CustomError::StorageError("down".into()))
        }
        async fn remove(&self, _: &Query) -> Result<u64, CustomError> {
            Err(CustomError::StorageError("down".into()))
        }
        async fn estimated_count(&self) -> Result<u64, CustomError> {
            Err(CustomError::StorageError("down".into()))
        }
    }

    /// In-memory gateway that fails the nth `remove` call and can drop
    /// every `update_first` as if the record vanished after it was read
    #[derive(Default)]
    struct FaultyGateway {
        inner: MemoryCommentGateway,
        fail_remove_at: Option<usize>,
        removes: AtomicUsize,
        lose_updates: bool,
    }

    #[async_trait]
    impl CommentGateway for FaultyGateway {
        async fn insert(&self, comment: Comment) -> Result<ObjectId, CustomError> {
            self.inner.insert(comment).await
        }
        async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
            self.inner.find_by_id(id).await
        }
        async fn find(&self, query: &Query) -> Result<Vec<Comment>, CustomError> {
            self.inner.find(query).await
        }
        async fn count(&self, query: &Query) -> Result<u64, CustomError> {
            self.inner.count(query).await
        }
        async fn update_first(&self, query: &Query, update: CommentUpdate) -> Result<u64, CustomError> {
            if self.lose_updates {
                return Ok(0);
            }
            self.inner.update_first(query, update).await
        }
        async fn remove(&self, query: &Query) -> Result<u64, CustomError> {
            let call = self.removes.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            if self.fail_remove_at == Some(call) {
                return Err(CustomError::StorageError("down".into()));
            }
            self.inner.remove(query).await
        }
        async fn estimated_count(&self) -> Result<u64, CustomError> {
            self.inner.estimated_count().await
        }
    }

    fn faulty_service(gateway: FaultyGateway) -> (CommentService, Arc<FaultyGateway>) {
        let gateway = Arc::new(gateway);
        let filter = Arc::new(SensitiveFilter::new(["Spam"]));
        (CommentService::new(gateway.clone(), filter), gateway)
    }

    fn service() -> (CommentService, Arc<MemoryCommentGateway>) {
        let gateway = Arc::new(MemoryCommentGateway::new());
        let filter = Arc::new(SensitiveFilter::new(["badword", "Spam"]));
        (CommentService::new(gateway.clone(), filter), gateway)
    }

    fn comment(doc_id: &str, user_id: &str, content: &str) -> Comment {
        Comment {
            doc_id: doc_id.to_string(),
            user_id: user_id.to_string(),
            user_name: format!("{}-name", user_id),
            content: content.to_string(),
            ..Comment::default()
        }
    }

    async fn stored(gateway: &MemoryCommentGateway, id: ObjectId) -> Comment {
        gateway.find_by_id(&id).await.unwrap().unwrap()
    }

    fn list(doc_id: &str, page: u64, rows: u64) -> CommentListDto {
        CommentListDto {
            doc_id: Some(doc_id.to_string()),
            page,
            rows,
        }
    }

    #[actix_web::test]
    async fn insert_requires_author_fields() {
        let (svc, gateway) = service();

        let mut no_id = comment("d1", "", "hello");
        no_id.user_name = "alice".into();
        let mut no_name = comment("d1", "u1", "hello");
        no_name.user_name = "  ".into();

        for candidate in [no_id, no_name] {
            let err = svc.insert(candidate).await.unwrap_err();
            assert!(matches!(err, CustomError::ValidationError(_)));
        }
        assert_eq!(gateway.estimated_count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn insert_masks_sensitive_words() {
        let (svc, gateway) = service();
        let id = svc
            .insert(comment("d1", "u1", "this BADWORD is spam"))
            .await
            .unwrap();

        let saved = stored(&gateway, id).await;
        assert_eq!(saved.content, "this ******* is ****");
        assert_eq!(saved.create_date, saved.update_date);
    }

    #[actix_web::test]
    async fn insert_fails_when_word_list_is_unavailable() {
        let gateway = Arc::new(MemoryCommentGateway::new());
        let filter = Arc::new(WordListFilter::new("/nonexistent/words.txt"));
        let svc = CommentService::new(gateway.clone(), filter);

        let err = svc.insert(comment("d1", "u1", "hello")).await.unwrap_err();
        assert!(matches!(err, CustomError::FilterError(_)));
        assert_eq!(gateway.estimated_count().await.unwrap(), 0);
    }

    #[actix_web::test]
    async fn insert_then_list_round_trips() {
        let (svc, _) = service();
        svc.insert(comment("d1", "u1", "nice spam post")).await.unwrap();

        let page = svc.query_by_id(&list("d1", 0, 10)).await.unwrap();
        assert_eq!(page.total_num, 1);
        let got = &page.comments[0];
        assert_eq!(got.user_id, "u1");
        assert_eq!(got.user_name, "u1-name");
        assert_eq!(got.content, "nice **** post");
    }

    #[actix_web::test]
    async fn update_by_owner_changes_content_and_timestamp() {
        let (svc, gateway) = service();
        let id = svc.insert(comment("d1", "u1", "before")).await.unwrap();
        let original = stored(&gateway, id).await;

        let mut edit = comment("d1", "u1", "after with spam");
        edit.id = Some(id);
        svc.update(edit).await.unwrap();

        let saved = stored(&gateway, id).await;
        assert_eq!(saved.content, "after with ****");
        assert_eq!(saved.create_date, original.create_date);
        assert!(saved.update_date >= original.update_date);
    }

    #[actix_web::test]
    async fn update_requires_author_fields() {
        let (svc, gateway) = service();
        let id = svc.insert(comment("d1", "u1", "before")).await.unwrap();

        let mut edit = comment("d1", "u1", "after");
        edit.id = Some(id);
        edit.user_name = String::new();
        let err = svc.update(edit).await.unwrap_err();

        assert!(matches!(err, CustomError::ValidationError(_)));
        assert_eq!(stored(&gateway, id).await.content, "before");
    }

    #[actix_web::test]
    async fn update_by_someone_else_changes_nothing() {
        let (svc, gateway) = service();
        let id = svc.insert(comment("d1", "u1", "before")).await.unwrap();
        let original = stored(&gateway, id).await;

        let mut edit = comment("d1", "u2", "hijacked");
        edit.id = Some(id);
        let err = svc.update(edit).await.unwrap_err();

        assert!(matches!(err, CustomError::AuthorizationError(_)));
        assert_eq!(stored(&gateway, id).await, original);
    }

    #[actix_web::test]
    async fn update_of_missing_comment_is_an_ownership_failure() {
        let (svc, _) = service();

        let mut edit = comment("d1", "u1", "anything");
        edit.id = Some(ObjectId::new());
        let err = svc.update(edit).await.unwrap_err();
        assert!(matches!(err, CustomError::AuthorizationError(_)));

        let err = svc.update(comment("d1", "u1", "no id")).await.unwrap_err();
        assert!(matches!(err, CustomError::AuthorizationError(_)));
    }

    #[actix_web::test]
    async fn update_that_matches_nothing_at_write_time_is_refused() {
        let (svc, gateway) = faulty_service(FaultyGateway {
            lose_updates: true,
            ..FaultyGateway::default()
        });
        let id = svc.insert(comment("d1", "u1", "before")).await.unwrap();

        let mut edit = comment("d1", "u1", "after");
        edit.id = Some(id);
        let err = svc.update(edit).await.unwrap_err();

        assert!(matches!(err, CustomError::AuthorizationError(_)));
        assert_eq!(gateway.find_by_id(&id).await.unwrap().unwrap().content, "before");
    }

    #[actix_web::test]
    async fn remove_by_someone_else_keeps_the_record() {
        let (svc, gateway) = service();
        let id = svc.insert(comment("d1", "u1", "keep me")).await.unwrap();

        let mut target = comment("d1", "u2", "");
        target.id = Some(id);
        let err = svc.remove(&target, "u2").await.unwrap_err();

        assert!(matches!(err, CustomError::AuthorizationError(_)));
        assert!(gateway.find_by_id(&id).await.unwrap().is_some());
    }

    #[actix_web::test]
    async fn remove_checks_the_comment_author_not_the_requester_argument() {
        let (svc, gateway) = service();
        let id = svc.insert(comment("d1", "u1", "bye")).await.unwrap();

        let mut target = comment("d1", "u1", "");
        target.id = Some(id);
        svc.remove(&target, "somebody-else").await.unwrap();

        assert!(gateway.find_by_id(&id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn remove_of_missing_comment_is_an_ownership_failure() {
        let (svc, _) = service();
        let mut target = comment("d1", "u1", "");
        target.id = Some(ObjectId::new());
        let err = svc.remove(&target, "u1").await.unwrap_err();
        assert!(matches!(err, CustomError::AuthorizationError(_)));
    }

    async fn seed_five(gateway: &MemoryCommentGateway) {
        let base = Utc::now() - Duration::hours(1);
        for i in 0..5 {
            let at = base + Duration::minutes(i);
            let mut c = comment("d1", "u1", &format!("comment {}", i));
            c.create_date = at;
            c.update_date = at;
            gateway.insert(c).await.unwrap();
        }
        let mut newest = comment("other", "u1", "elsewhere");
        newest.create_date = Utc::now();
        newest.update_date = newest.create_date;
        gateway.insert(newest).await.unwrap();
    }

    #[actix_web::test]
    async fn query_by_id_pages_newest_first() {
        let (svc, gateway) = service();
        seed_five(&gateway).await;

        let first = svc.query_by_id(&list("d1", 0, 2)).await.unwrap();
        assert_eq!(first.total_num, 5);
        let contents: Vec<&str> = first.comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(contents, ["comment 4", "comment 3"]);

        let last = svc.query_by_id(&list("d1", 2, 2)).await.unwrap();
        assert_eq!(last.comments.len(), 1);
        assert_eq!(last.comments[0].content, "comment 0");

        let beyond = svc.query_by_id(&list("d1", 3, 2)).await.unwrap();
        assert!(beyond.comments.is_empty());
        assert_eq!(beyond.total_num, 5);
    }

    #[actix_web::test]
    async fn query_by_id_rejects_missing_document_or_rows() {
        let (svc, _) = service();

        for dto in [
            CommentListDto {
                doc_id: None,
                page: 0,
                rows: 10,
            },
            list(" ", 0, 10),
            list("d1", 0, 0),
        ] {
            let err = svc.query_by_id(&dto).await.unwrap_err();
            assert!(matches!(err, CustomError::ValidationError(_)));
        }
    }

    #[actix_web::test]
    async fn query_all_comments_is_one_based_and_ignores_user() {
        let (svc, gateway) = service();
        seed_five(&gateway).await;

        let page = BasePageDto { page: 1, rows: 4 };
        let first = svc.query_all_comments(&page, "nobody").await.unwrap();
        assert_eq!(first.total, 6);
        assert_eq!(first.data.len(), 4);
        assert_eq!(first.data[0].content, "elsewhere");

        let second = svc
            .query_all_comments(&BasePageDto { page: 2, rows: 4 }, "u1")
            .await
            .unwrap();
        assert_eq!(second.data.len(), 2);
        assert_eq!(second.data[1].content, "comment 0");

        // page 0 reads like page 1
        let zero = svc
            .query_all_comments(&BasePageDto { page: 0, rows: 4 }, "u1")
            .await
            .unwrap();
        assert_eq!(zero.data, first.data);
    }

    #[actix_web::test]
    async fn fuzzy_search_skips_storage_for_blank_keywords() {
        let svc = CommentService::new(
            Arc::new(UnreachableGateway),
            Arc::new(SensitiveFilter::new(["x"])),
        );
        assert!(svc.fuzzy_search_doc(None).await.unwrap().is_empty());
        assert!(svc.fuzzy_search_doc(Some("")).await.unwrap().is_empty());
        assert!(svc.fuzzy_search_doc(Some("   ")).await.unwrap().is_empty());

        let err = svc.fuzzy_search_doc(Some("hi")).await.unwrap_err();
        assert!(matches!(err, CustomError::StorageError(_)));
    }

    #[actix_web::test]
    async fn fuzzy_search_matches_substrings_ignoring_case() {
        let (svc, _) = service();
        svc.insert(comment("d1", "u1", "Hello there")).await.unwrap();
        svc.insert(comment("d1", "u2", "well, HELLO again")).await.unwrap();
        svc.insert(comment("d2", "u1", "say hello")).await.unwrap();
        svc.insert(comment("d3", "u1", "goodbye")).await.unwrap();

        let mut docs = svc.fuzzy_search_doc(Some("hello")).await.unwrap();
        docs.sort();
        assert_eq!(docs, ["d1", "d1", "d2"]);
    }

    #[actix_web::test]
    async fn fuzzy_search_treats_keyword_literally() {
        let (svc, _) = service();
        svc.insert(comment("d1", "u1", "costs $5 (approx)")).await.unwrap();
        svc.insert(comment("d2", "u1", "costs 55")).await.unwrap();

        let docs = svc.fuzzy_search_doc(Some("$5 (")).await.unwrap();
        assert_eq!(docs, ["d1"]);
    }

    #[actix_web::test]
    async fn remove_by_doc_id_clears_the_document() {
        let (svc, gateway) = service();
        seed_five(&gateway).await;

        assert_eq!(svc.remove_by_doc_id("d1").await.unwrap(), 5);
        assert_eq!(svc.comment_num("d1").await.unwrap(), 0);
        assert_eq!(svc.comment_num("other").await.unwrap(), 1);
        assert_eq!(svc.count_all_file().await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn remove_by_doc_id_stops_at_the_first_failure_without_rollback() {
        let (svc, gateway) = faulty_service(FaultyGateway {
            fail_remove_at: Some(3),
            ..FaultyGateway::default()
        });
        seed_five(&gateway.inner).await;

        let err = svc.remove_by_doc_id("d1").await.unwrap_err();
        assert!(matches!(err, CustomError::StorageError(_)));

        // two deletions landed before the third failed, and they stay deleted
        assert_eq!(svc.comment_num("d1").await.unwrap(), 3);
        assert_eq!(gateway.removes.load(AtomicOrdering::SeqCst), 3);
        assert_eq!(svc.comment_num("other").await.unwrap(), 1);
    }

    #[actix_web::test]
    async fn page_far_past_the_data_is_empty_not_an_error() {
        let (svc, gateway) = service();
        seed_five(&gateway).await;

        let page = svc.query_by_id(&list("d1", u64::MAX, 10)).await.unwrap();
        assert!(page.comments.is_empty());
        assert_eq!(page.total_num, 5);

        let all = svc
            .query_all_comments(&BasePageDto { page: u64::MAX, rows: 10 }, "u1")
            .await
            .unwrap();
        assert!(all.data.is_empty());
        assert_eq!(all.total, 6);
    }

    #[actix_web::test]
    async fn storage_failures_surface_as_storage_errors() {
        let svc = CommentService::new(
            Arc::new(UnreachableGateway),
            Arc::new(SensitiveFilter::new(["x"])),
        );
        let err = svc.insert(comment("d1", "u1", "hi")).await.unwrap_err();
        assert!(matches!(err, CustomError::StorageError(_)));
        let err = svc.count_all_file().await.unwrap_err();
        assert!(matches!(err, CustomError::StorageError(_)));
    }
}
