//! # Rendering
//!
//! Turns `CmdResult` pieces into terminal text. Every `render_*` function
//! returns a `String` so layout can be tested without a terminal; the
//! command handlers print them.
//!
//! Layout (width, truncation, padding) is computed with `unicode-width`;
//! styling uses `colored`, which honours `NO_COLOR` and non-tty output.

use chrono::{DateTime, Utc};
use colored::Colorize;
use devblog::api::{CmdMessage, FeedPage, ListedPost, MessageLevel};
use devblog::commands::visibility::toggle_label;
use devblog::config::BlogConfig;
use devblog::feed::filter::ALL_LABEL;
use devblog::feed::highlight::{highlight, MatchSegment};
use devblog::model::Visibility;
use timeago::Formatter;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const TIME_WIDTH: usize = 14;
const KEY_WIDTH: usize = 28;
const PRIVATE_MARKER: &str = "🔒";
const OWN_MARKER: &str = "✎";

pub fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => eprintln!("{}", message.content.red()),
        }
    }
}

/// Title with query matches emphasised.
fn highlighted(text: &str, query: &str) -> String {
    highlight(text, query)
        .into_iter()
        .map(|segment| match segment {
            MatchSegment::Plain(s) => s,
            MatchSegment::Match(s) => s.yellow().bold().to_string(),
        })
        .collect()
}

pub fn render_feed_header(feed: &FeedPage, categories: &[String]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", feed.heading.bold()));

    let bar: Vec<String> = categories
        .iter()
        .map(|c| {
            if *c == feed.category {
                format!("[{}]", c).cyan().bold().to_string()
            } else {
                c.clone()
            }
        })
        .collect();
    if !bar.is_empty() {
        out.push_str(&format!("{}\n", bar.join("  ")));
    }

    if feed.total_pages > 0 {
        out.push_str(
            &format!(
                "page {}/{} · {} post{}",
                feed.page,
                feed.total_pages,
                feed.matches,
                if feed.matches == 1 { "" } else { "s" }
            )
            .dimmed()
            .to_string(),
        );
        out.push('\n');
    }
    out
}

/// Command that reveals the next page of the same feed.
pub fn render_more_hint(feed: &FeedPage) -> String {
    let mut command = String::from("devblog list");
    if feed.category != ALL_LABEL {
        command.push_str(&format!(" --tag {}", shell_quote(&feed.category)));
    }
    if !feed.query.is_empty() {
        command.push_str(&format!(" --search {}", shell_quote(&feed.query)));
    }
    command.push_str(&format!(" --page {}", feed.page + 1));
    format!("More posts: {}\n", command)
}

fn shell_quote(arg: &str) -> String {
    if !arg.is_empty() && arg.chars().all(|c| c.is_alphanumeric() || "-_.".contains(c)) {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// One line per post: route key, title, author and age.
/// Matches of `query` in the title are highlighted when it is a real search.
pub fn render_post_list(posts: &[ListedPost], query: &str) -> String {
    let mut out = String::new();
    for lp in posts {
        let post = &lp.post;
        let key = truncate_to_width(post.route_key(), KEY_WIDTH);
        let key_padding = KEY_WIDTH.saturating_sub(key.width());

        let mut markers = String::new();
        if post.visibility == Visibility::Private {
            markers.push_str(PRIVATE_MARKER);
        }
        if lp.can_manage {
            markers.push_str(OWN_MARKER);
        }

        let time_ago = post
            .created_at
            .map(format_time_ago)
            .unwrap_or_else(|| " ".repeat(TIME_WIDTH));
        let byline = format!(" by {}", post.author_name());

        let fixed = KEY_WIDTH + 2 + markers.width() + 1 + TIME_WIDTH;
        let available = LINE_WIDTH.saturating_sub(fixed);
        let title_and_byline = truncate_to_width(&format!("{}{}", post.title, byline), available);
        let padding = available.saturating_sub(title_and_byline.width());

        // Highlight only the part of the title that survived truncation.
        let title_len = post.title.len().min(title_and_byline.len());
        let (title_part, rest) = if title_and_byline.is_char_boundary(title_len) {
            title_and_byline.split_at(title_len)
        } else {
            (title_and_byline.as_str(), "")
        };

        out.push_str(&format!(
            "{}{}  {}{}{} {}{}\n",
            key.yellow(),
            " ".repeat(key_padding),
            highlighted(title_part, query),
            rest.dimmed(),
            " ".repeat(padding),
            markers,
            time_ago.dimmed()
        ));
    }
    out
}

pub fn render_suggestions(posts: &[ListedPost], query: &str) -> String {
    posts
        .iter()
        .enumerate()
        .map(|(i, lp)| {
            format!(
                "{} {}  {}\n",
                format!("{}.", i + 1).dimmed(),
                highlighted(&lp.post.title, query),
                lp.post.route_key().yellow()
            )
        })
        .collect()
}

pub fn render_full_post(lp: &ListedPost) -> String {
    let post = &lp.post;
    let mut out = String::new();
    out.push_str(&format!("{}\n", post.title.bold()));

    let mut meta = vec![post.author_name().to_string()];
    if let Some(created) = post.created_at {
        meta.push(created.format("%b %-d, %Y").to_string());
    }
    if !post.read_time.is_empty() {
        meta.push(post.read_time.clone());
    }
    if post.visibility == Visibility::Private {
        meta.push(format!("{} private", PRIVATE_MARKER));
    }
    out.push_str(&format!("{}\n", meta.join(" · ").dimmed()));

    if !post.tags.is_empty() {
        let tags: Vec<String> = post.tags.iter().map(|t| format!("#{}", t)).collect();
        out.push_str(&format!("{}\n", tags.join(" ").cyan()));
    }
    out.push_str("--------------------------------\n");
    if !post.excerpt.is_empty() {
        out.push_str(&format!("{}\n\n", post.excerpt.italic()));
    }
    if !post.content.is_empty() {
        out.push_str(&post.content);
        if !post.content.ends_with('\n') {
            out.push('\n');
        }
    }

    if let Some(bio) = post.author.as_ref().map(|a| a.bio()).filter(|b| !b.is_empty()) {
        out.push_str(&format!("\n{} {}\n", "About the author:".bold(), bio));
    }

    if lp.can_manage {
        let key = post.route_key();
        out.push_str(&format!(
            "\n{}\n",
            format!(
                "devblog edit {key} · devblog delete {key} · devblog visibility {key} ({})",
                toggle_label(post.visibility)
            )
            .dimmed()
        ));
    }
    out
}

pub fn render_categories(categories: &[String]) -> String {
    categories.iter().map(|c| format!("{}\n", c)).collect()
}

pub fn render_config(config: &BlogConfig) -> String {
    devblog::config::KEYS
        .iter()
        .filter_map(|key| config.get(key).map(|v| format!("{} = {}\n", key, v)))
        .collect()
}

pub fn render_reply(reply: &str) -> String {
    format!("{} {}\n", "bot:".cyan().bold(), reply)
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn format_time_ago(timestamp: DateTime<Utc>) -> String {
    let duration = Utc::now().signed_duration_since(timestamp);
    let time_str = Formatter::new().convert(duration.to_std().unwrap_or_default());
    format!("{:>width$}", time_str, width = TIME_WIDTH)
}
