//! # CLI Layer
//!
//! This module is **one possible UI client** for devblog. It is the only place
//! that parses arguments, prompts, prints or decides exit codes.
//!
//! ## Structure
//!
//! - `run()`: dispatch (called by `main.rs`)
//! - `init_context()`: resolves the data directory, config and stored session
//!   and builds the `BlogApi`
//! - `handle_*()`: one handler per command: call the API, render the result

use super::render::{
    print_messages, render_categories, render_config, render_feed_header, render_full_post,
    render_more_hint, render_post_list, render_reply, render_suggestions,
};
use super::setup::{
    print_grouped_help, print_help_for_command, AccountCommands, Cli, Commands, FeedCommands,
    MiscCommands, PostCommands,
};
use devblog::api::{BlogApi, BlogPaths, CmdResult, ConfigAction, FeedRequest, SignUp};
use devblog::auth::{AuthContext, Session};
use devblog::backend::http::HttpBackend;
use devblog::config::BlogConfig;
use devblog::editor::{edit_content, EditorContent};
use devblog::error::{BlogError, Result};
use devblog::model::{parse_tags, MyPostsFilter, PostChanges, PostDraft, PostStatus};
use directories::ProjectDirs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

struct AppContext {
    api: BlogApi<HttpBackend>,
}

pub fn run(cli: Cli) -> Result<()> {
    if cli.help {
        match &cli.command {
            Some(command) => print_help_for_command(command.name()),
            None => print_grouped_help(),
        }
        return Ok(());
    }

    let command = match cli.command {
        Some(Commands::Misc(MiscCommands::Help { command })) => {
            match command {
                Some(name) => print_help_for_command(&name),
                None => print_grouped_help(),
            }
            return Ok(());
        }
        Some(command) => command,
        None => Commands::Feed(FeedCommands::List {
            tag: None,
            search: None,
            page: 1,
        }),
    };

    let mut ctx = init_context(cli.home)?;

    match command {
        Commands::Feed(cmd) => match cmd {
            FeedCommands::List { tag, search, page } => handle_list(&ctx, tag, search, page),
            FeedCommands::Search { tag, query } => handle_search(&ctx, query.join(" "), tag),
            FeedCommands::Tags => handle_tags(&ctx),
            FeedCommands::View { post } => handle_view(&ctx, &post),
        },
        Commands::Post(cmd) => match cmd {
            PostCommands::Create {
                excerpt,
                tags,
                content,
                author_name,
                author_bio,
                cover,
                author_image,
                draft,
                no_editor,
                title,
            } => {
                let draft = PostDraft {
                    title: title.join(" "),
                    excerpt: excerpt.unwrap_or_default(),
                    content: content.unwrap_or_default(),
                    tags: tags.as_deref().map(parse_tags).unwrap_or_default(),
                    author_name: author_name.unwrap_or_default(),
                    author_bio: author_bio.unwrap_or_default(),
                    status: if draft {
                        PostStatus::Draft
                    } else {
                        PostStatus::Published
                    },
                    cover_image: cover,
                    author_image,
                    ..Default::default()
                };
                handle_create(&mut ctx, draft, no_editor)
            }
            PostCommands::Edit {
                post,
                title,
                excerpt,
                content,
                tags,
                author_name,
                author_bio,
                author_image,
                editor,
            } => {
                let changes = PostChanges {
                    title,
                    excerpt,
                    content,
                    tags: tags.as_deref().map(parse_tags),
                    author_name,
                    author_bio,
                    author_image,
                };
                handle_edit(&mut ctx, &post, changes, editor)
            }
            PostCommands::Delete { post, yes } => handle_delete(&mut ctx, &post, yes),
            PostCommands::Visibility { post } => {
                let result = ctx.api.toggle_visibility(&post)?;
                print_messages(&result.messages);
                Ok(())
            }
            PostCommands::Mine { published, drafts } => {
                let filter = if published {
                    MyPostsFilter::Published
                } else if drafts {
                    MyPostsFilter::Draft
                } else {
                    MyPostsFilter::All
                };
                handle_mine(&ctx, filter)
            }
        },
        Commands::Account(cmd) => match cmd {
            AccountCommands::Register {
                name,
                email,
                password,
                confirm_password,
            } => handle_register(&mut ctx, name, email, password, confirm_password),
            AccountCommands::Login { email, password } => handle_login(&mut ctx, email, password),
            AccountCommands::Logout => {
                let result = ctx.api.logout()?;
                print_messages(&result.messages);
                Ok(())
            }
            AccountCommands::Whoami => {
                let result = ctx.api.whoami()?;
                print_messages(&result.messages);
                Ok(())
            }
        },
        Commands::Misc(cmd) => match cmd {
            MiscCommands::Chat { message } => handle_chat(&ctx, message.join(" ")),
            MiscCommands::Config { key, value } => handle_config(&ctx, key, value),
            MiscCommands::Help { .. } => Ok(()),
        },
    }
}

fn data_dir(home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = home {
        return Ok(dir);
    }
    ProjectDirs::from("com", "devblog", "devblog")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| BlogError::Config("Could not determine a data directory".to_string()))
}

fn init_context(home: Option<PathBuf>) -> Result<AppContext> {
    let dir = data_dir(home)?;
    let config = BlogConfig::load(&dir)?.with_env_overrides();
    let session = Session::load(&dir)?;
    tracing::debug!(
        data_dir = %dir.display(),
        api_url = %config.api_url,
        signed_in = session.is_some(),
        "context ready"
    );

    let backend = HttpBackend::new(&config)?;
    let api = BlogApi::new(
        backend,
        BlogPaths::new(dir),
        config,
        AuthContext::from_session(session),
    );
    Ok(AppContext { api })
}

/// Renders a result that is expected to be empty on success but may carry
/// error messages, and turns those into a failing exit.
fn finish(result: &CmdResult) -> Result<()> {
    print_messages(&result.messages);
    if result.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn handle_list(
    ctx: &AppContext,
    tag: Option<String>,
    search: Option<String>,
    page: usize,
) -> Result<()> {
    let request = FeedRequest {
        category: tag,
        query: search,
        page,
    };
    let result = ctx.api.list_posts(&request)?;

    if let Some(feed) = &result.feed {
        print!("{}", render_feed_header(feed, &result.categories));
        println!();
        print!("{}", render_post_list(&result.listed_posts, &feed.query));
        if feed.has_more {
            println!();
            print!("{}", render_more_hint(feed));
        }
    }
    finish(&result)
}

fn handle_search(ctx: &AppContext, query: String, tag: Option<String>) -> Result<()> {
    let result = ctx.api.suggest(&query, tag.as_deref())?;
    print!("{}", render_suggestions(&result.listed_posts, query.trim()));
    finish(&result)
}

fn handle_tags(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.categories()?;
    print!("{}", render_categories(&result.categories));
    finish(&result)
}

fn handle_view(ctx: &AppContext, key: &str) -> Result<()> {
    let result = ctx.api.view_post(key)?;
    for lp in &result.listed_posts {
        print!("{}", render_full_post(lp));
    }
    finish(&result)
}

fn handle_mine(ctx: &AppContext, filter: MyPostsFilter) -> Result<()> {
    let result = ctx.api.my_posts(filter)?;
    print!("{}", render_post_list(&result.listed_posts, ""));
    finish(&result)
}

fn handle_create(ctx: &mut AppContext, mut draft: PostDraft, no_editor: bool) -> Result<()> {
    if draft.author_name.trim().is_empty() {
        if let Some(session) = ctx.api.session() {
            draft.author_name = session.name.clone();
        }
    }

    if draft.content.trim().is_empty() {
        if !io::stdin().is_terminal() {
            let piped = io::read_to_string(io::stdin())?;
            let parsed = EditorContent::from_buffer(&piped);
            if draft.title.trim().is_empty() {
                draft.title = parsed.title;
                draft.content = parsed.content;
            } else {
                draft.content = piped.trim().to_string();
            }
        } else if !no_editor {
            let edited = edit_content(&EditorContent::new(draft.title.clone(), ""))?;
            draft.title = edited.title;
            draft.content = edited.content;
        }
    }

    let result = ctx.api.create_post(&draft)?;
    finish(&result)
}

fn handle_edit(
    ctx: &mut AppContext,
    key: &str,
    mut changes: PostChanges,
    use_editor: bool,
) -> Result<()> {
    if use_editor {
        let current = ctx.api.view_post(key)?;
        if let Some(lp) = current.listed_posts.first() {
            let initial = EditorContent::new(
                changes.title.clone().unwrap_or_else(|| lp.post.title.clone()),
                changes
                    .content
                    .clone()
                    .unwrap_or_else(|| lp.post.content.clone()),
            );
            let edited = edit_content(&initial)?;
            if edited.title != lp.post.title {
                changes.title = Some(edited.title);
            }
            if edited.content != lp.post.content {
                changes.content = Some(edited.content);
            }
        }
    }

    let result = ctx.api.update_post(key, changes)?;
    finish(&result)
}

fn handle_delete(ctx: &mut AppContext, key: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Delete post {}? [y/N] ", key))? {
        println!("Aborted.");
        return Ok(());
    }
    let result = ctx.api.delete_post(key)?;
    finish(&result)
}

fn handle_register(
    ctx: &mut AppContext,
    name: String,
    email: String,
    password: Option<String>,
    confirm_password: Option<String>,
) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };
    let confirm_password = match confirm_password {
        Some(p) => p,
        None => prompt("Confirm password: ")?,
    };
    let form = SignUp {
        full_name: name,
        email,
        password,
        confirm_password,
    };
    let result = ctx.api.register(&form)?;
    finish(&result)
}

fn handle_login(ctx: &mut AppContext, email: String, password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => p,
        None => prompt("Password: ")?,
    };
    let result = ctx.api.login(&email, &password)?;
    finish(&result)
}

fn handle_chat(ctx: &AppContext, message: String) -> Result<()> {
    let result = ctx.api.chat(&message)?;
    if let Some(reply) = &result.reply {
        print!("{}", render_reply(reply));
    }
    finish(&result)
}

fn handle_config(ctx: &AppContext, key: Option<String>, value: Option<String>) -> Result<()> {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(k), None) => ConfigAction::ShowKey(k),
        (Some(k), Some(v)) => ConfigAction::Set(k, v),
    };
    let show_all = matches!(action, ConfigAction::ShowAll);

    let result = ctx.api.config(action)?;
    if show_all {
        if let Some(config) = &result.config {
            print!("{}", render_config(config));
        }
    }
    finish(&result)
}

/// Reads one line from stdin after printing `label` to stderr.
fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

fn confirm(question: &str) -> Result<bool> {
    let answer = prompt(question)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
