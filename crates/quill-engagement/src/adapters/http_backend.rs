//! REST adapter for [`BlogBackend`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::wire::{ArticleDetailBody, CommentsBody, CreatedBody, Envelope, NewCommentBody};
use crate::config::EngagementConfig;
use crate::domain::{Comment, EntityId};
use crate::error::{EngagementError, EngagementResult};
use crate::ports::{ArticleBundle, BlogBackend, CreatedComment, NewComment, SessionProvider};

/// Blog backend over HTTP/JSON.
pub struct HttpBlogBackend {
    client: Client,
    base_url: Url,
    session: Option<Arc<dyn SessionProvider>>,
}

impl HttpBlogBackend {
    /// Create a new backend client.
    pub fn new(config: &EngagementConfig) -> EngagementResult<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(EngagementError::Http)?;

        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| EngagementError::Config(format!("api_base_url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(EngagementError::Config(format!(
                "api_base_url cannot be a base: {base_url}"
            )));
        }

        Ok(Self {
            client,
            base_url,
            session: None,
        })
    }

    /// Attach the session whose token authorizes requests.
    pub fn with_session(mut self, session: Arc<dyn SessionProvider>) -> Self {
        self.session = Some(session);
        self
    }

    /// Base URL plus percent-encoded path segments.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.as_ref().and_then(|s| s.current_viewer()) {
            Some(viewer) => request.bearer_auth(viewer.access_token),
            None => request,
        }
    }

    /// Send a request, mapping transport failures and non-success statuses.
    async fn send(&self, request: RequestBuilder, url: &Url) -> EngagementResult<Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            if e.is_connect() {
                EngagementError::Connection(format!("Cannot connect to {}", self.base_url))
            } else {
                EngagementError::Http(e)
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(EngagementError::NotFound(url.path().to_string()));
        }
        if !status.is_success() {
            return Err(EngagementError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    /// Decode a JSON body; `Ok(None)` for an empty or `null` body.
    async fn decode<T: DeserializeOwned>(response: Response) -> EngagementResult<Option<T>> {
        let bytes = response.bytes().await.map_err(EngagementError::Http)?;
        let trimmed = bytes.trim_ascii();
        if trimmed.is_empty() || trimmed == b"null" {
            return Ok(None);
        }
        serde_json::from_slice(trimmed)
            .map(Some)
            .map_err(|e| EngagementError::Decode(e.to_string()))
    }

    async fn post_empty(&self, segments: &[&str]) -> EngagementResult<()> {
        let url = self.endpoint(segments);
        self.send(self.client.post(url.clone()), &url).await?;
        Ok(())
    }
}

#[async_trait]
impl BlogBackend for HttpBlogBackend {
    async fn fetch_article(&self, slug: &str) -> EngagementResult<Option<ArticleBundle>> {
        let url = self.endpoint(&["blog", "articles", slug]);
        let response = match self.send(self.client.get(url.clone()), &url).await {
            Ok(response) => response,
            Err(EngagementError::NotFound(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        let Some(body) = Self::decode::<Envelope<ArticleDetailBody>>(response).await? else {
            return Ok(None);
        };

        let (article, related) = body.into_inner().into_parts();
        if !article.is_present() {
            tracing::debug!(slug, "Article response carried no article");
            return Ok(None);
        }

        let now = chrono::Utc::now();
        Ok(Some(ArticleBundle {
            article: article.into_domain(slug, now),
            related: related.into_iter().map(|r| r.into_domain()).collect(),
        }))
    }

    async fn record_view(&self, article_id: &EntityId) -> EngagementResult<()> {
        self.post_empty(&["blog", "articles", article_id.as_str(), "view"]).await
    }

    async fn toggle_article_like(&self, article_id: &EntityId) -> EngagementResult<()> {
        self.post_empty(&["blog", "articles", article_id.as_str(), "like"]).await
    }

    async fn fetch_comments(&self, article_id: &EntityId) -> EngagementResult<Vec<Comment>> {
        let url = self.endpoint(&["blog", "articles", article_id.as_str(), "comments"]);
        let response = self.send(self.client.get(url.clone()), &url).await?;

        let now = chrono::Utc::now();
        let comments = Self::decode::<Envelope<CommentsBody>>(response)
            .await?
            .map(|body| body.into_inner().into_comments())
            .unwrap_or_default();

        Ok(comments.into_iter().map(|c| c.into_domain(now)).collect())
    }

    async fn create_comment(&self, request: &NewComment) -> EngagementResult<CreatedComment> {
        let url = self.endpoint(&["blog", "comments"]);
        let body = NewCommentBody::from(request);
        let response = self.send(self.client.post(url.clone()).json(&body), &url).await?;

        Ok(Self::decode::<Envelope<CreatedBody>>(response)
            .await?
            .map(|body| body.into_inner().into_created())
            .unwrap_or_default())
    }

    async fn like_comment(&self, comment_id: &EntityId) -> EngagementResult<()> {
        self.post_empty(&["blog", "comments", comment_id.as_str(), "like"]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(base: &str) -> HttpBlogBackend {
        HttpBlogBackend::new(&EngagementConfig::default().with_api_base_url(base)).unwrap()
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = backend("https://api.example.com/api/");
        let url = backend.endpoint(&["blog", "articles", "rust-async"]);
        assert_eq!(url.as_str(), "https://api.example.com/api/blog/articles/rust-async");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let backend = backend("https://api.example.com");
        let url = backend.endpoint(&["blog", "articles", "a b/c"]);
        assert_eq!(url.as_str(), "https://api.example.com/blog/articles/a%20b%2Fc");
    }

    #[test]
    fn test_rejects_invalid_base() {
        let config = EngagementConfig::default().with_api_base_url("not a url");
        assert!(matches!(
            HttpBlogBackend::new(&config),
            Err(EngagementError::Config(_))
        ));
    }
}
