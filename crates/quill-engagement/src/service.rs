//! Article page service - optimistic engagement synchronisation
//!
//! Every handler applies its change to the local article immediately and
//! returns. Backend calls run as background tasks and, when they succeed,
//! patch the state again (temporary id → server id). Failures are logged and
//! never rolled back.
//!
//! ```text
//! handler ──write lock──→ PageState (optimistic)
//!    │
//!    └── spawn ──→ BlogBackend ──ack──→ Weak<PageState> ──→ reconcile
//!                                   (dropped page: no-op)
//! ```

use std::future::Future;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};
use reqwest::Url;
use tokio::task::JoinSet;

use crate::config::EngagementConfig;
use crate::domain::{
    sample_article, sample_related, Article, ArticleSummary, Author, Comment, EntityId, Reaction,
    ReactionKind, TempIdGenerator, TempIdKind,
};
use crate::ports::{
    ActionOutcome, ArticleBundle, BlogBackend, CreatedComment, EngagementApi, NewComment,
    RejectReason, SessionProvider, Viewer,
};

/// Where the loaded article came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleSource {
    Backend,
    /// Bundled sample (fetch failed or returned nothing)
    Sample,
}

/// Open reply form under one comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyForm {
    pub parent: EntityId,
    pub draft: String,
}

/// Mutable state of one page view.
#[derive(Debug, Default)]
struct PageState {
    article: Option<Article>,
    related: Vec<ArticleSummary>,
    source: Option<ArticleSource>,
    reaction: Reaction,
    login_prompt: bool,
    comment_draft: String,
    reply_form: Option<ReplyForm>,
    view_counted: bool,
}

impl PageState {
    fn loaded(bundle: ArticleBundle, source: ArticleSource) -> Self {
        Self {
            article: Some(bundle.article),
            related: bundle.related,
            source: Some(source),
            ..Self::default()
        }
    }

    /// Apply a create acknowledgment to the entry still holding `temp_id`.
    ///
    /// An ack without a server id leaves the entry untouched, author included.
    /// Returns false when the entry is gone or the ack has no id.
    fn reconcile(&mut self, temp_id: &EntityId, created: CreatedComment) -> bool {
        let Some(server_id) = created.id else {
            return false;
        };
        let Some(article) = self.article.as_mut() else {
            return false;
        };
        let Some(entry) = article.find_any_mut(temp_id) else {
            return false;
        };

        if let Some(patch) = &created.author {
            entry.author.merge(patch);
        }
        entry.id = server_id.clone();

        if let Some(form) = self.reply_form.as_mut() {
            if &form.parent == temp_id {
                form.parent = server_id;
            }
        }
        true
    }
}

fn author_of(viewer: &Viewer) -> Author {
    Author {
        id: viewer.id.clone(),
        name: viewer.display_name.clone(),
        avatar: viewer.avatar.clone(),
    }
}

/// One article page view.
///
/// The page owns its state exclusively. Background tasks only hold a weak
/// handle, so acknowledgments that arrive after the page is dropped do
/// nothing. In-flight requests are never aborted.
pub struct ArticlePage<B, S>
where
    B: BlogBackend + 'static,
    S: SessionProvider,
{
    state: Arc<RwLock<PageState>>,
    backend: Arc<B>,
    session: Arc<S>,
    temp_ids: TempIdGenerator,
    tasks: Mutex<JoinSet<()>>,
    site_url: String,
}

impl<B, S> ArticlePage<B, S>
where
    B: BlogBackend + 'static,
    S: SessionProvider,
{
    pub fn new(config: &EngagementConfig, backend: Arc<B>, session: Arc<S>) -> Self {
        Self {
            state: Arc::new(RwLock::new(PageState::default())),
            backend,
            session,
            temp_ids: TempIdGenerator::new(),
            tasks: Mutex::new(JoinSet::new()),
            site_url: config.site_url.clone(),
        }
    }

    /// Load the article for `slug` and count the view.
    ///
    /// Never fails: a fetch error or missing article loads the bundled
    /// sample instead.
    pub async fn load(&self, slug: &str) -> ArticleSource {
        let (mut bundle, source) = match self.backend.fetch_article(slug).await {
            Ok(Some(bundle)) => (bundle, ArticleSource::Backend),
            Ok(None) => {
                tracing::info!(slug, "Article not found, showing sample content");
                (Self::sample_bundle(slug), ArticleSource::Sample)
            }
            Err(e) => {
                tracing::warn!(slug, error = %e, "Article fetch failed, showing sample content");
                (Self::sample_bundle(slug), ArticleSource::Sample)
            }
        };

        if source == ArticleSource::Backend && bundle.article.is_persisted() {
            match self.backend.fetch_comments(&bundle.article.id).await {
                Ok(comments) => bundle.article.comments = comments,
                Err(e) => tracing::warn!(
                    article_id = %bundle.article.id,
                    error = %e,
                    "Comment fetch failed, keeping embedded comments"
                ),
            }
        }

        tracing::debug!(
            article_id = %bundle.article.id,
            ?source,
            comments = bundle.article.comment_count(),
            "Article loaded"
        );
        *self.state.write() = PageState::loaded(bundle, source);

        self.increment_view_count();
        source
    }

    fn sample_bundle(slug: &str) -> ArticleBundle {
        ArticleBundle {
            article: sample_article(slug),
            related: sample_related(),
        }
    }

    /// Related articles returned with the loaded article.
    pub fn related(&self) -> Vec<ArticleSummary> {
        self.state.read().related.clone()
    }

    pub fn source(&self) -> Option<ArticleSource> {
        self.state.read().source
    }

    pub fn set_comment_draft(&self, text: &str) {
        self.state.write().comment_draft = text.to_string();
    }

    pub fn comment_draft(&self) -> String {
        self.state.read().comment_draft.clone()
    }

    /// Submit whatever is in the comment field.
    pub fn submit_comment_draft(&self) -> ActionOutcome {
        let draft = self.comment_draft();
        self.submit_comment(&draft)
    }

    /// Open the reply form under a top-level comment.
    pub fn open_reply(&self, comment_id: &EntityId) -> bool {
        let mut state = self.state.write();
        let exists = state
            .article
            .as_ref()
            .is_some_and(|a| a.find_comment(comment_id).is_some());
        if exists {
            state.reply_form = Some(ReplyForm {
                parent: comment_id.clone(),
                draft: String::new(),
            });
        }
        exists
    }

    pub fn set_reply_draft(&self, text: &str) {
        if let Some(form) = self.state.write().reply_form.as_mut() {
            form.draft = text.to_string();
        }
    }

    pub fn reply_form(&self) -> Option<ReplyForm> {
        self.state.read().reply_form.clone()
    }

    pub fn close_reply(&self) {
        self.state.write().reply_form = None;
    }

    /// Canonical URL for the share/copy-link action.
    pub fn share_link(&self) -> Option<String> {
        let slug = self.state.read().article.as_ref()?.slug.clone();
        let mut url = Url::parse(&self.site_url).ok()?;
        url.path_segments_mut()
            .ok()?
            .pop_if_empty()
            .extend(["blog", slug.as_str()]);
        Some(url.to_string())
    }

    /// Number of background syncs not yet awaited by [`settle`](Self::settle).
    pub fn in_flight(&self) -> usize {
        self.tasks.lock().len()
    }

    /// Wait for every background sync started so far.
    pub async fn settle(&self) {
        loop {
            let mut tasks = std::mem::take(&mut *self.tasks.lock());
            if tasks.is_empty() {
                return;
            }
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "Background sync task failed");
                }
            }
        }
    }

    fn gate(&self) -> ActionOutcome {
        self.state.write().login_prompt = true;
        tracing::debug!("Login required");
        ActionOutcome::LoginRequired
    }

    /// Run `operation` in the background if a runtime is available.
    fn spawn_sync<F>(&self, operation: &'static str, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::warn!(operation, "No async runtime, backend sync skipped");
            return;
        };

        let mut tasks = self.tasks.lock();
        while tasks.try_join_next().is_some() {}
        tasks.spawn_on(future, &handle);
    }

    fn react(&self, pressed: ReactionKind) -> ActionOutcome {
        if !self.session.is_authenticated() {
            return self.gate();
        }

        let mut guard = self.state.write();
        let state = &mut *guard;
        let Some(article) = state.article.as_mut() else {
            return ActionOutcome::Rejected(RejectReason::NotLoaded);
        };

        let previous = state.reaction;
        state.reaction = previous.toggle(pressed, &mut article.engagement);
        let article_id = article.id.clone();
        tracing::debug!(
            article_id = %article_id,
            ?previous,
            current = ?state.reaction,
            likes = article.engagement.likes,
            dislikes = article.engagement.dislikes,
            "Reaction toggled"
        );
        drop(guard);

        // The backend only tracks likes: sync when the like state changed.
        let like_changed = pressed == ReactionKind::Like || previous.is_liked();
        if like_changed && article_id.is_persisted() {
            let backend = Arc::clone(&self.backend);
            self.spawn_sync("toggle_article_like", async move {
                if let Err(e) = backend.toggle_article_like(&article_id).await {
                    tracing::warn!(article_id = %article_id, error = %e, "Like sync failed");
                }
            });
        }

        ActionOutcome::applied()
    }

    /// Send a create request and reconcile the temporary id on success.
    fn spawn_create(&self, request: NewComment, temp_id: EntityId) {
        let backend = Arc::clone(&self.backend);
        let state: Weak<RwLock<PageState>> = Arc::downgrade(&self.state);

        self.spawn_sync("create_comment", async move {
            let created = match backend.create_comment(&request).await {
                Ok(created) => created,
                Err(e) => {
                    tracing::warn!(
                        temp_id = %temp_id,
                        error = %e,
                        "Comment create failed, keeping local entry"
                    );
                    return;
                }
            };

            let Some(state) = state.upgrade() else {
                tracing::debug!(temp_id = %temp_id, "Page closed before create acknowledged");
                return;
            };

            let server_id = created.id.clone();
            if state.write().reconcile(&temp_id, created) {
                tracing::debug!(temp_id = %temp_id, server_id = ?server_id, "Comment reconciled");
            } else {
                tracing::debug!(temp_id = %temp_id, "Create acknowledged without usable id");
            }
        });
    }
}

impl<B, S> EngagementApi for ArticlePage<B, S>
where
    B: BlogBackend + 'static,
    S: SessionProvider,
{
    fn toggle_like(&self) -> ActionOutcome {
        self.react(ReactionKind::Like)
    }

    fn toggle_dislike(&self) -> ActionOutcome {
        self.react(ReactionKind::Dislike)
    }

    fn submit_comment(&self, text: &str) -> ActionOutcome {
        let content = text.trim();
        if content.is_empty() {
            return ActionOutcome::Rejected(RejectReason::EmptyContent);
        }
        let Some(viewer) = self.session.current_viewer() else {
            return self.gate();
        };

        let mut guard = self.state.write();
        let state = &mut *guard;
        let Some(article) = state.article.as_mut() else {
            return ActionOutcome::Rejected(RejectReason::NotLoaded);
        };

        let temp_id = self.temp_ids.next(TempIdKind::Comment);
        article.comments.push(Comment::draft(
            temp_id.clone(),
            author_of(&viewer),
            content,
            chrono::Utc::now(),
        ));
        state.comment_draft.clear();

        let sync = article.is_persisted().then(|| NewComment {
            article: article.id.clone(),
            content: content.to_string(),
            parent: None,
        });
        drop(guard);

        tracing::debug!(temp_id = %temp_id, synced = sync.is_some(), "Comment added");
        if let Some(request) = sync {
            self.spawn_create(request, temp_id.clone());
        }

        ActionOutcome::created(temp_id)
    }

    fn submit_reply(&self, comment_id: &EntityId, text: &str) -> ActionOutcome {
        let content = text.trim();
        if content.is_empty() {
            return ActionOutcome::Rejected(RejectReason::EmptyContent);
        }
        let Some(viewer) = self.session.current_viewer() else {
            return self.gate();
        };

        let mut guard = self.state.write();
        let state = &mut *guard;
        let Some(article) = state.article.as_mut() else {
            return ActionOutcome::Rejected(RejectReason::NotLoaded);
        };
        let article_id = article.id.clone();
        let Some(parent) = article.find_comment_mut(comment_id) else {
            return ActionOutcome::Rejected(RejectReason::UnknownComment);
        };

        let temp_id = self.temp_ids.next(TempIdKind::Reply);
        parent.replies.push(Comment::draft(
            temp_id.clone(),
            author_of(&viewer),
            content,
            chrono::Utc::now(),
        ));

        if state
            .reply_form
            .as_ref()
            .is_some_and(|form| &form.parent == comment_id)
        {
            state.reply_form = None;
        }

        // A reply under a local-only comment has no server-side parent.
        let sync = (article_id.is_persisted() && comment_id.is_persisted()).then(|| NewComment {
            article: article_id,
            content: content.to_string(),
            parent: Some(comment_id.clone()),
        });
        drop(guard);

        tracing::debug!(
            temp_id = %temp_id,
            parent = %comment_id,
            synced = sync.is_some(),
            "Reply added"
        );
        if let Some(request) = sync {
            self.spawn_create(request, temp_id.clone());
        }

        ActionOutcome::created(temp_id)
    }

    fn like_comment(&self, comment_id: &EntityId) -> ActionOutcome {
        if !self.session.is_authenticated() {
            return self.gate();
        }

        {
            let mut state = self.state.write();
            let Some(article) = state.article.as_mut() else {
                return ActionOutcome::Rejected(RejectReason::NotLoaded);
            };
            let Some(comment) = article.find_any_mut(comment_id) else {
                return ActionOutcome::Rejected(RejectReason::UnknownComment);
            };
            comment.likes += 1;
            tracing::debug!(comment_id = %comment_id, likes = comment.likes, "Comment liked");
        }

        if comment_id.is_persisted() {
            let backend = Arc::clone(&self.backend);
            let comment_id = comment_id.clone();
            self.spawn_sync("like_comment", async move {
                if let Err(e) = backend.like_comment(&comment_id).await {
                    tracing::warn!(
                        comment_id = %comment_id,
                        error = %e,
                        "Comment like sync failed"
                    );
                }
            });
        }

        ActionOutcome::applied()
    }

    fn increment_view_count(&self) -> ActionOutcome {
        let article_id = {
            let mut guard = self.state.write();
            let state = &mut *guard;
            let Some(article) = state.article.as_mut() else {
                return ActionOutcome::Rejected(RejectReason::NotLoaded);
            };
            if state.view_counted {
                return ActionOutcome::Rejected(RejectReason::AlreadyCounted);
            }
            state.view_counted = true;
            article.engagement.views += 1;
            article.id.clone()
        };

        if article_id.is_persisted() {
            let backend = Arc::clone(&self.backend);
            self.spawn_sync("record_view", async move {
                if let Err(e) = backend.record_view(&article_id).await {
                    tracing::warn!(article_id = %article_id, error = %e, "View sync failed");
                }
            });
        }

        ActionOutcome::applied()
    }

    fn snapshot(&self) -> Option<Article> {
        self.state.read().article.clone()
    }

    fn reaction(&self) -> Reaction {
        self.state.read().reaction
    }

    fn login_prompt_visible(&self) -> bool {
        self.state.read().login_prompt
    }

    fn dismiss_login_prompt(&self) {
        self.state.write().login_prompt = false;
    }
}

impl<B, S> Drop for ArticlePage<B, S>
where
    B: BlogBackend + 'static,
    S: SessionProvider,
{
    fn drop(&mut self) {
        // Dropping a JoinSet aborts its tasks; let them run to completion.
        self.tasks.get_mut().detach_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AuthorPatch, Engagement, SAMPLE_SLUG};
    use crate::error::{EngagementError, EngagementResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const ARTICLE_ID: &str = "65a1f0c2e4b0a1b2c3d4e5f6";

    struct NullBackend {
        calls: AtomicUsize,
    }

    impl NullBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BlogBackend for NullBackend {
        async fn fetch_article(&self, _slug: &str) -> EngagementResult<Option<ArticleBundle>> {
            Err(EngagementError::Connection("offline".to_string()))
        }

        async fn record_view(&self, _id: &EntityId) -> EngagementResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn toggle_article_like(&self, _id: &EntityId) -> EngagementResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn fetch_comments(&self, _id: &EntityId) -> EngagementResult<Vec<Comment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }

        async fn create_comment(&self, _request: &NewComment) -> EngagementResult<CreatedComment> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CreatedComment::default())
        }

        async fn like_comment(&self, _id: &EntityId) -> EngagementResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct FixedSession {
        signed_in: AtomicBool,
    }

    impl SessionProvider for FixedSession {
        fn current_viewer(&self) -> Option<Viewer> {
            self.signed_in.load(Ordering::SeqCst).then(|| Viewer {
                id: "u1".to_string(),
                display_name: "Ada".to_string(),
                avatar: None,
                access_token: "tok".to_string(),
            })
        }
    }

    fn page(signed_in: bool) -> ArticlePage<NullBackend, FixedSession> {
        ArticlePage::new(
            &EngagementConfig::default(),
            Arc::new(NullBackend::new()),
            Arc::new(FixedSession {
                signed_in: AtomicBool::new(signed_in),
            }),
        )
    }

    fn with_article(page: &ArticlePage<NullBackend, FixedSession>, article: Article) {
        *page.state.write() = PageState::loaded(
            ArticleBundle {
                article,
                related: Vec::new(),
            },
            ArticleSource::Backend,
        );
    }

    #[test]
    fn test_handlers_reject_before_load() {
        let page = page(true);
        assert_eq!(
            page.toggle_like(),
            ActionOutcome::Rejected(RejectReason::NotLoaded)
        );
        assert_eq!(
            page.submit_comment("hello"),
            ActionOutcome::Rejected(RejectReason::NotLoaded)
        );
        assert_eq!(
            page.increment_view_count(),
            ActionOutcome::Rejected(RejectReason::NotLoaded)
        );
    }

    #[test]
    fn test_local_only_mutation_without_runtime() {
        // No tokio runtime here: local article never needs one.
        let page = page(true);
        with_article(&page, sample_article(SAMPLE_SLUG));

        assert!(page.toggle_like().is_applied());
        assert!(page.submit_comment("Great article!").is_applied());
        assert_eq!(page.in_flight(), 0);
        assert_eq!(page.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_persisted_sync_without_runtime_is_skipped() {
        let page = page(true);
        let mut article = sample_article(SAMPLE_SLUG);
        article.id = EntityId::from(ARTICLE_ID);
        with_article(&page, article);

        assert!(page.toggle_like().is_applied());
        assert_eq!(page.in_flight(), 0);
        assert_eq!(page.snapshot().unwrap().engagement.likes, 97);
    }

    #[test]
    fn test_reconcile_rewrites_open_reply_form() {
        let page = page(true);
        with_article(&page, sample_article(SAMPLE_SLUG));

        let temp = page.submit_comment("first").created_id().cloned().unwrap();
        assert!(page.open_reply(&temp));

        let server = EntityId::from(ARTICLE_ID);
        let applied = page.state.write().reconcile(
            &temp,
            CreatedComment {
                id: Some(server.clone()),
                author: None,
            },
        );

        assert!(applied);
        assert_eq!(page.reply_form().unwrap().parent, server);
        let article = page.snapshot().unwrap();
        assert!(article.find_comment(&server).is_some());
        assert!(article.find_comment(&temp).is_none());
    }

    #[test]
    fn test_reconcile_without_id_keeps_temp() {
        let page = page(true);
        with_article(&page, sample_article(SAMPLE_SLUG));
        let temp = page.submit_comment("first").created_id().cloned().unwrap();

        let applied = page
            .state
            .write()
            .reconcile(&temp, CreatedComment::default());

        assert!(!applied);
        assert!(page.snapshot().unwrap().find_comment(&temp).is_some());
    }

    #[test]
    fn test_ack_without_id_does_not_merge_author() {
        let page = page(true);
        with_article(&page, sample_article(SAMPLE_SLUG));
        let temp = page.submit_comment("first").created_id().cloned().unwrap();

        let applied = page.state.write().reconcile(
            &temp,
            CreatedComment {
                id: None,
                author: Some(AuthorPatch {
                    id: None,
                    name: Some("Server Name".to_string()),
                    avatar: None,
                }),
            },
        );

        assert!(!applied);
        let article = page.snapshot().unwrap();
        assert_eq!(article.find_comment(&temp).unwrap().author.name, "Ada");
    }

    #[test]
    fn test_share_link() {
        let page = page(false);
        assert!(page.share_link().is_none());

        with_article(&page, sample_article(SAMPLE_SLUG));
        assert_eq!(
            page.share_link().as_deref(),
            Some("http://localhost:3000/blog/building-ai-applications-openai-gpt4-langchain")
        );
    }

    #[test]
    fn test_view_counted_once() {
        let page = page(false);
        let mut article = sample_article(SAMPLE_SLUG);
        article.engagement = Engagement::default();
        with_article(&page, article);

        assert!(page.increment_view_count().is_applied());
        assert_eq!(
            page.increment_view_count(),
            ActionOutcome::Rejected(RejectReason::AlreadyCounted)
        );
        assert_eq!(page.snapshot().unwrap().engagement.views, 1);
    }

    #[test]
    fn test_reply_to_reply_is_rejected() {
        let page = page(true);
        with_article(&page, sample_article(SAMPLE_SLUG));

        assert_eq!(
            page.submit_reply(&EntityId::from("sample-reply-1"), "nested"),
            ActionOutcome::Rejected(RejectReason::UnknownComment)
        );
    }
}
