//! Bundled sample content shown when the backend has nothing for a slug.
//!
//! None of these identifiers are persisted, so every interaction with the
//! sample stays local.

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::entities::{Article, ArticleSummary, Author, Comment, Engagement};
use super::identifier::EntityId;

/// Slug of the bundled sample article.
pub const SAMPLE_SLUG: &str = "building-ai-applications-openai-gpt4-langchain";

fn published() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 12, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn author(id: &str, name: &str) -> Author {
    Author {
        id: id.to_string(),
        name: name.to_string(),
        avatar: None,
    }
}

fn comment(id: &str, who: Author, content: &str, likes: u64, offset_hours: i64) -> Comment {
    Comment {
        id: EntityId::from(id),
        author: who,
        content: content.to_string(),
        likes,
        created_at: published() + Duration::hours(offset_hours),
        edited: false,
        replies: Vec::new(),
    }
}

/// Sample article served for `slug`.
///
/// The requested slug is kept so share links still point where the viewer
/// navigated; an empty slug uses [`SAMPLE_SLUG`]. The id is always the
/// sample slug, never the request, so a hex-looking slug cannot make the
/// sample look persisted.
pub fn sample_article(slug: &str) -> Article {
    let slug = if slug.trim().is_empty() { SAMPLE_SLUG } else { slug };

    let mut first = comment(
        "sample-comment-1",
        author("sample-user-1", "Priya Raman"),
        "The section on retrieval chains finally made LangChain click for me.",
        12,
        5,
    );
    first.replies.push(comment(
        "sample-reply-1",
        author("sample-user-2", "Marco Bellini"),
        "Same here. The memory example is worth rereading too.",
        3,
        7,
    ));

    let second = comment(
        "sample-comment-2",
        author("sample-user-3", "Dana Okafor"),
        "Would love a follow-up on evaluating GPT-4 outputs in production.",
        8,
        26,
    );

    Article {
        id: EntityId::from(SAMPLE_SLUG),
        slug: slug.to_string(),
        title: "Building AI Applications with OpenAI GPT-4 and LangChain".to_string(),
        excerpt: "A practical walkthrough of prompts, chains, retrieval and memory.".to_string(),
        content: "Large language models become useful once they are wired into \
                  the rest of an application. This guide builds a small \
                  question-answering service step by step: prompt templates, \
                  chains, retrieval over your own documents and conversation \
                  memory."
            .to_string(),
        author: author("sample-author", "Quill Editorial"),
        tags: vec!["ai".to_string(), "langchain".to_string(), "gpt-4".to_string()],
        published_at: published(),
        engagement: Engagement {
            views: 1_284,
            likes: 96,
            dislikes: 4,
        },
        comments: vec![first, second],
    }
}

/// Related list shown with the sample article.
pub fn sample_related() -> Vec<ArticleSummary> {
    vec![
        ArticleSummary {
            id: EntityId::from("prompt-engineering-patterns"),
            slug: "prompt-engineering-patterns".to_string(),
            title: "Prompt Engineering Patterns That Scale".to_string(),
            excerpt: "Templates, few-shot examples and guard rails.".to_string(),
        },
        ArticleSummary {
            id: EntityId::from("vector-databases-explained"),
            slug: "vector-databases-explained".to_string(),
            title: "Vector Databases Explained".to_string(),
            excerpt: "Embeddings, indexes and similarity search.".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_local_only() {
        let article = sample_article(SAMPLE_SLUG);
        assert!(!article.is_persisted());
        assert!(article
            .comments
            .iter()
            .flat_map(|c| std::iter::once(c).chain(c.replies.iter()))
            .all(|c| !c.id.is_persisted()));
    }

    #[test]
    fn test_sample_keeps_requested_slug() {
        assert_eq!(sample_article("some-other-post").slug, "some-other-post");
        assert_eq!(sample_article("  ").slug, SAMPLE_SLUG);
    }

    #[test]
    fn test_hex_slug_does_not_make_sample_persisted() {
        assert!(!sample_article("507f1f77bcf86cd799439011").is_persisted());
    }
}
