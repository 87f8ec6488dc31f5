//! Quill Console: drive one article page from the terminal.
//!
//! Loads an article (falling back to the bundled sample), then reads
//! commands from stdin. Every command goes through the same handlers a page
//! shell would bind, so local state changes immediately and backend syncs
//! run in the background.

mod commands;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use quill_engagement::adapters::{HttpBlogBackend, JsonFilePreferenceStore, StoredSession};
use quill_engagement::domain::SAMPLE_SLUG;
use quill_engagement::ports::Viewer;
use quill_engagement::{ActionOutcome, ArticlePage, EngagementApi, EngagementConfig, EntityId};
use quill_telemetry::{init_telemetry, log_event, TelemetryConfig};

use commands::{parse, render, render_related, Command, HELP};

type Page = ArticlePage<HttpBlogBackend, StoredSession<JsonFilePreferenceStore>>;

/// Quill Console: interactive article page
#[derive(Parser, Debug)]
#[command(name = "quill-console")]
#[command(about = "Read, react to and comment on a blog article from the terminal")]
struct Args {
    /// Article slug to open
    #[arg(default_value = SAMPLE_SLUG)]
    slug: String,

    /// Backend API base URL (overrides QUILL_API_URL)
    #[arg(short, long)]
    api: Option<String>,

    /// Public site URL for share links (overrides QUILL_SITE_URL)
    #[arg(long)]
    site: Option<String>,

    /// File holding the stored session
    #[arg(long, default_value = ".quill/preferences.json")]
    prefs: PathBuf,

    /// Log level filter (overrides QUILL_LOG_LEVEL)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::for_component("console");
    if let Some(level) = &args.log_level {
        telemetry = telemetry.with_log_level(level.as_str());
    }
    let _guard = init_telemetry(telemetry).context("failed to initialise logging")?;

    let mut config = EngagementConfig::from_env();
    if let Some(api) = &args.api {
        config = config.with_api_base_url(api);
    }
    if let Some(site) = &args.site {
        config = config.with_site_url(site);
    }

    let store = Arc::new(
        JsonFilePreferenceStore::open(&args.prefs)
            .with_context(|| format!("cannot open preferences at {}", args.prefs.display()))?,
    );
    log_event!(debug, "console", "Preferences opened", path = %store.path().display());
    let session = Arc::new(StoredSession::new(store));
    let backend = HttpBlogBackend::new(&config)
        .context("invalid backend configuration")?
        .with_session(session.clone());

    let page = ArticlePage::new(&config, Arc::new(backend), Arc::clone(&session));
    let source = page.load(&args.slug).await;
    log_event!(info, "console", "Article opened", slug = %args.slug, ?source);

    if let Some(article) = page.snapshot() {
        println!("{}", render(&article, page.reaction(), page.source()));
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("{e}");
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }
        run(&page, &session, command).await;
    }

    // Let pending syncs finish before exiting
    page.settle().await;
    log_event!(info, "console", "Console closed");
    Ok(())
}

async fn run(page: &Page, session: &StoredSession<JsonFilePreferenceStore>, command: Command) {
    let outcome = match command {
        Command::Show => None,
        Command::Like => Some(page.toggle_like()),
        Command::Dislike => Some(page.toggle_dislike()),
        Command::Comment(text) => {
            page.set_comment_draft(&text);
            Some(page.submit_comment_draft())
        }
        Command::Reply { parent, text } => {
            let parent = EntityId::from(parent);
            page.open_reply(&parent);
            page.set_reply_draft(&text);
            Some(page.submit_reply(&parent, &text))
        }
        Command::LikeComment(id) => Some(page.like_comment(&EntityId::from(id))),
        Command::Login { name, token } => {
            let viewer = Viewer {
                id: format!("console-{name}"),
                display_name: name,
                avatar: None,
                access_token: token,
            };
            match session.sign_in(&viewer) {
                Ok(()) => {
                    page.dismiss_login_prompt();
                    println!("signed in as {}", viewer.display_name);
                }
                Err(e) => eprintln!("sign-in failed: {e}"),
            }
            return;
        }
        Command::Logout => {
            if let Err(e) = session.sign_out() {
                eprintln!("sign-out failed: {e}");
            }
            return;
        }
        Command::Share => {
            match page.share_link() {
                Some(link) => println!("{link}"),
                None => eprintln!("no article loaded"),
            }
            return;
        }
        Command::Related => {
            print!("{}", render_related(&page.related()));
            return;
        }
        Command::Settle => {
            page.settle().await;
            println!("all syncs settled");
            return;
        }
        Command::Help => {
            println!("{HELP}");
            return;
        }
        Command::Quit => return,
    };

    match outcome {
        Some(ActionOutcome::LoginRequired) => {
            eprintln!("sign in first: login <name> <token>");
            page.dismiss_login_prompt();
        }
        Some(ActionOutcome::Rejected(reason)) => eprintln!("nothing changed: {reason:?}"),
        Some(ActionOutcome::Applied { id: Some(id) }) => println!("added {id}"),
        Some(ActionOutcome::Applied { id: None }) | None => {}
    }

    if let Some(article) = page.snapshot() {
        println!("{}", render(&article, page.reaction(), page.source()));
    }
}
