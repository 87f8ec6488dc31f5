//! Console command parsing and article rendering.

use std::fmt::Write as _;

use anyhow::{bail, Result};
use quill_engagement::{Article, ArticleSource, ArticleSummary, Comment, Reaction};

pub const HELP: &str = "\
commands:
  show                      print the article and its comments
  like | dislike            toggle a reaction
  comment <text>            post a top-level comment
  reply <comment-id> <text> reply under a top-level comment
  like-comment <id>         like a comment or reply
  login <name> <token>      store a session
  logout                    clear the stored session
  share                     print the share link
  related                   list related articles
  settle                    wait for pending syncs
  help | quit";

/// One console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Like,
    Dislike,
    Comment(String),
    Reply { parent: String, text: String },
    LikeComment(String),
    Login { name: String, token: String },
    Logout,
    Share,
    Related,
    Settle,
    Help,
    Quit,
}

/// Parse a line; `Ok(None)` for a blank line.
pub fn parse(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    let command = match verb {
        "show" => Command::Show,
        "like" => Command::Like,
        "dislike" => Command::Dislike,
        "comment" => Command::Comment(rest.to_string()),
        "reply" => {
            let Some((parent, text)) = rest.split_once(char::is_whitespace) else {
                bail!("usage: reply <comment-id> <text>");
            };
            Command::Reply {
                parent: parent.to_string(),
                text: text.trim().to_string(),
            }
        }
        "like-comment" if !rest.is_empty() => Command::LikeComment(rest.to_string()),
        "like-comment" => bail!("usage: like-comment <id>"),
        "login" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next()) {
                (Some(name), Some(token)) => Command::Login {
                    name: name.to_string(),
                    token: token.to_string(),
                },
                _ => bail!("usage: login <name> <token>"),
            }
        }
        "logout" => Command::Logout,
        "share" => Command::Share,
        "related" => Command::Related,
        "settle" => Command::Settle,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => bail!("unknown command: {other} (try `help`)"),
    };
    Ok(Some(command))
}

/// Entries still waiting for a server id are marked pending.
fn comment_line(comment: &Comment) -> String {
    let pending = if comment.id.is_temporary() { ", pending" } else { "" };
    format!(
        "[{}] {}: {} ({} likes{})",
        comment.id, comment.author.name, comment.content, comment.likes, pending
    )
}

/// Plain-text article view.
pub fn render(article: &Article, reaction: Reaction, source: Option<ArticleSource>) -> String {
    let mut out = String::new();
    let e = &article.engagement;

    if source == Some(ArticleSource::Sample) {
        let _ = writeln!(out, "(backend unavailable, showing sample content)");
    }
    let _ = writeln!(out, "{}", article.title);
    let _ = writeln!(
        out,
        "by {} · {} · {} views",
        article.author.name,
        article.published_at.format("%Y-%m-%d"),
        e.views
    );
    let marker = match reaction {
        Reaction::Liked => " (you liked this)",
        Reaction::Disliked => " (you disliked this)",
        Reaction::Neither => "",
    };
    let _ = writeln!(out, "👍 {}  👎 {}{}", e.likes, e.dislikes, marker);
    if !article.excerpt.is_empty() {
        let _ = writeln!(out, "\n{}", article.excerpt);
    }

    let _ = writeln!(out, "\nComments ({})", article.comment_count());
    for comment in &article.comments {
        let _ = writeln!(out, "  {}", comment_line(comment));
        for reply in &comment.replies {
            let _ = writeln!(out, "      ↳ {}", comment_line(reply));
        }
    }
    out
}

pub fn render_related(related: &[ArticleSummary]) -> String {
    if related.is_empty() {
        return "no related articles\n".to_string();
    }
    related
        .iter()
        .map(|r| format!("  {} ({})\n", r.title, r.slug))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_engagement::domain::{
        sample_article, Author, TempIdGenerator, TempIdKind, SAMPLE_SLUG,
    };

    #[test]
    fn test_parse_basic_commands() {
        assert_eq!(parse("  ").unwrap(), None);
        assert_eq!(parse("like").unwrap(), Some(Command::Like));
        assert_eq!(parse("q").unwrap(), Some(Command::Quit));
        assert_eq!(
            parse("comment  Great article! ").unwrap(),
            Some(Command::Comment("Great article!".to_string()))
        );
    }

    #[test]
    fn test_parse_reply_and_login() {
        assert_eq!(
            parse("reply abc123 thanks for this").unwrap(),
            Some(Command::Reply {
                parent: "abc123".to_string(),
                text: "thanks for this".to_string(),
            })
        );
        assert_eq!(
            parse("login ada tok").unwrap(),
            Some(Command::Login {
                name: "ada".to_string(),
                token: "tok".to_string(),
            })
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("reply onlyid").is_err());
        assert!(parse("login ada").is_err());
        assert!(parse("like-comment").is_err());
        assert!(parse("frobnicate").is_err());
    }

    #[test]
    fn test_render_lists_replies_under_parent() {
        let text = render(&sample_article(SAMPLE_SLUG), Reaction::Liked, None);
        assert!(text.contains("you liked this"));
        assert!(text.contains("Comments (3)"));
        assert!(text.contains("↳ [sample-reply-1]"));
        assert!(!text.contains("pending"));
    }

    #[test]
    fn test_render_marks_sample_and_pending_entries() {
        let mut article = sample_article(SAMPLE_SLUG);
        let temp = TempIdGenerator::new().next(TempIdKind::Comment);
        let posted = article.published_at;
        let draft = Comment::draft(temp.clone(), Author::anonymous(), "Great article!", posted);
        article.comments.push(draft);

        let text = render(&article, Reaction::Neither, Some(ArticleSource::Sample));
        assert!(text.starts_with("(backend unavailable"));
        assert!(text.contains(&format!("[{temp}] Anonymous: Great article! (0 likes, pending)")));
    }
}
