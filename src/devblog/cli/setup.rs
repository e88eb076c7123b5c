use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.3.2" for releases, "0.3.2@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(
    name = "devblog",
    bin_name = "devblog",
    version = get_version(),
    disable_help_flag = true,
    disable_help_subcommand = true
)]
#[command(about = "Read, search and publish posts on a developer blog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory for config and session (defaults to the platform data dir)
    #[arg(long, global = true, env = "DEVBLOG_HOME", help_heading = "Options")]
    pub home: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,

    /// Print help
    #[arg(short, long, global = true)]
    pub help: bool,
}

/// Command group definitions for help output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandGroup {
    Feed,
    Post,
    Account,
    Misc,
}

impl CommandGroup {
    pub fn heading(&self) -> &'static str {
        match self {
            CommandGroup::Feed => "Reading:",
            CommandGroup::Post => "Writing:",
            CommandGroup::Account => "Account:",
            CommandGroup::Misc => "Miscellaneous:",
        }
    }

    pub fn for_command(name: &str) -> Option<Self> {
        match name {
            "list" | "search" | "tags" | "view" => Some(CommandGroup::Feed),
            "create" | "edit" | "delete" | "visibility" | "mine" => Some(CommandGroup::Post),
            "register" | "login" | "logout" | "whoami" => Some(CommandGroup::Account),
            "chat" | "config" | "help" => Some(CommandGroup::Misc),
            _ => None,
        }
    }

    pub fn all() -> &'static [CommandGroup] {
        &[
            CommandGroup::Feed,
            CommandGroup::Post,
            CommandGroup::Account,
            CommandGroup::Misc,
        ]
    }
}

pub fn get_grouped_help() -> String {
    let cmd = Cli::command();
    let version = cmd.get_version().unwrap_or("unknown");

    let mut output = String::new();
    output.push_str(&format!("devblog {version}\n"));
    output.push_str("Read, search and publish posts on a developer blog\n");
    output.push('\n');
    output.push_str("Usage: devblog [OPTIONS] [COMMAND]\n");

    let subcommands: Vec<_> = cmd.get_subcommands().collect();
    for group in CommandGroup::all() {
        let group_cmds: Vec<_> = subcommands
            .iter()
            .filter(|sc| {
                !sc.is_hide_set() && CommandGroup::for_command(sc.get_name()) == Some(*group)
            })
            .collect();

        if !group_cmds.is_empty() {
            output.push('\n');
            output.push_str(&format!("{}\n", group.heading()));
            for sc in group_cmds {
                let about = sc.get_about().map(|s| s.to_string()).unwrap_or_default();
                output.push_str(&format!("  {:<12} {}\n", sc.get_name(), about));
            }
        }
    }

    output.push('\n');
    output.push_str("Options:\n");
    output.push_str("      --home <DIR>  Directory for config and session [env: DEVBLOG_HOME]\n");
    output.push_str("  -v, --verbose     Debug logging on stderr\n");
    output.push_str("  -h, --help        Print help\n");
    output.push_str("  -V, --version     Print version\n");

    output
}

pub fn print_grouped_help() {
    print!("{}", get_grouped_help());
}

/// Prints clap's help for one subcommand, or the grouped help if unknown.
pub fn print_help_for_command(name: &str) {
    let mut cmd = Cli::command();
    for subcmd in cmd.get_subcommands_mut() {
        if subcmd.get_name() == name {
            print!("{}", subcmd.render_help());
            return;
        }
    }

    eprintln!("Unknown command: {}", name);
    eprintln!();
    print_grouped_help();
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(flatten)]
    Feed(FeedCommands),

    #[command(flatten)]
    Post(PostCommands),

    #[command(flatten)]
    Account(AccountCommands),

    #[command(flatten)]
    Misc(MiscCommands),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Feed(c) => match c {
                FeedCommands::List { .. } => "list",
                FeedCommands::Search { .. } => "search",
                FeedCommands::Tags => "tags",
                FeedCommands::View { .. } => "view",
            },
            Commands::Post(c) => match c {
                PostCommands::Create { .. } => "create",
                PostCommands::Edit { .. } => "edit",
                PostCommands::Delete { .. } => "delete",
                PostCommands::Visibility { .. } => "visibility",
                PostCommands::Mine { .. } => "mine",
            },
            Commands::Account(c) => match c {
                AccountCommands::Register { .. } => "register",
                AccountCommands::Login { .. } => "login",
                AccountCommands::Logout => "logout",
                AccountCommands::Whoami => "whoami",
            },
            Commands::Misc(c) => match c {
                MiscCommands::Chat { .. } => "chat",
                MiscCommands::Config { .. } => "config",
                MiscCommands::Help { .. } => "help",
            },
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum FeedCommands {
    /// List public posts
    #[command(alias = "ls", display_order = 1)]
    List {
        /// Only posts with this tag ("All" for every post)
        #[arg(short, long)]
        tag: Option<String>,

        /// Filter by title or excerpt (2+ characters)
        #[arg(short, long)]
        search: Option<String>,

        /// Reveal this many pages of results
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },

    /// Suggest posts as you type
    #[command(alias = "s", display_order = 2)]
    Search {
        /// Restrict to a tag
        #[arg(short, long)]
        tag: Option<String>,

        /// Query words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// List categories
    #[command(display_order = 3)]
    Tags,

    /// Show a post
    #[command(alias = "v", display_order = 4)]
    View {
        /// Post slug, or id:<id>
        post: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum PostCommands {
    /// Write a new post
    #[command(alias = "n", display_order = 10)]
    Create {
        #[arg(long)]
        excerpt: Option<String>,

        /// Comma separated, e.g. "java,spring"
        #[arg(long)]
        tags: Option<String>,

        /// Body text (opens the editor if omitted)
        #[arg(long)]
        content: Option<String>,

        /// Defaults to your display name
        #[arg(long)]
        author_name: Option<String>,

        #[arg(long)]
        author_bio: Option<String>,

        /// Cover image file
        #[arg(long, value_name = "FILE")]
        cover: Option<PathBuf>,

        /// Author avatar file
        #[arg(long, value_name = "FILE")]
        author_image: Option<PathBuf>,

        /// Save as draft instead of publishing
        #[arg(long)]
        draft: bool,

        /// Skip opening the editor
        #[arg(long)]
        no_editor: bool,

        /// Title words (joined with spaces)
        #[arg(trailing_var_arg = true)]
        title: Vec<String>,
    },

    /// Edit one of your posts
    #[command(alias = "e", display_order = 11)]
    Edit {
        /// Post slug, or id:<id>
        post: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        excerpt: Option<String>,

        #[arg(long)]
        content: Option<String>,

        /// Comma separated, replaces the current tags
        #[arg(long)]
        tags: Option<String>,

        #[arg(long)]
        author_name: Option<String>,

        #[arg(long)]
        author_bio: Option<String>,

        #[arg(long, value_name = "FILE")]
        author_image: Option<PathBuf>,

        /// Edit title and body in $EDITOR
        #[arg(long)]
        editor: bool,
    },

    /// Delete one of your posts
    #[command(alias = "rm", display_order = 12)]
    Delete {
        /// Post slug, or id:<id>
        post: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },

    /// Toggle a post between public and private
    #[command(display_order = 13)]
    Visibility {
        /// Post slug, or id:<id>
        post: String,
    },

    /// List your own posts
    #[command(display_order = 14)]
    Mine {
        /// Only published posts
        #[arg(long, conflicts_with = "drafts")]
        published: bool,

        /// Only drafts
        #[arg(long)]
        drafts: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum AccountCommands {
    /// Create an account
    #[command(display_order = 20)]
    Register {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long, env = "DEVBLOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,

        /// Prompted for when omitted
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Sign in and remember the session
    #[command(display_order = 21)]
    Login {
        #[arg(long)]
        email: String,

        /// Prompted for when omitted
        #[arg(long, env = "DEVBLOG_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget the stored session
    #[command(display_order = 22)]
    Logout,

    /// Show who is signed in
    #[command(display_order = 23)]
    Whoami,
}

#[derive(Subcommand, Debug)]
pub enum MiscCommands {
    /// Ask the blog assistant something
    #[command(display_order = 30)]
    Chat {
        /// Message words (joined with spaces)
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// Get or set configuration
    #[command(display_order = 31)]
    Config {
        /// Configuration key (e.g., api-url)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Print help for devblog or a subcommand
    #[command(display_order = 32)]
    Help {
        /// Subcommand to get help for
        command: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_list_flags() {
        let cli = Cli::try_parse_from(["devblog", "list", "-t", "java", "-s", "spring", "-p", "2"])
            .unwrap();
        match cli.command {
            Some(Commands::Feed(FeedCommands::List { tag, search, page })) => {
                assert_eq!(tag.as_deref(), Some("java"));
                assert_eq!(search.as_deref(), Some("spring"));
                assert_eq!(page, 2);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn create_collects_title_words() {
        let cli = Cli::try_parse_from([
            "devblog", "create", "--tags", "java", "--draft", "Hello", "Spring",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Post(PostCommands::Create {
                title, draft, tags, ..
            })) => {
                assert_eq!(title, vec!["Hello", "Spring"]);
                assert!(draft);
                assert_eq!(tags.as_deref(), Some("java"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn mine_filters_conflict() {
        assert!(Cli::try_parse_from(["devblog", "mine", "--published", "--drafts"]).is_err());
    }

    #[test]
    fn every_command_has_a_group() {
        let cmd = Cli::command();
        for sc in cmd.get_subcommands() {
            assert!(
                CommandGroup::for_command(sc.get_name()).is_some(),
                "{} has no help group",
                sc.get_name()
            );
        }
    }

    #[test]
    fn grouped_help_lists_commands() {
        let help = get_grouped_help();
        assert!(help.contains("Reading:"));
        assert!(help.contains("visibility"));
        assert!(help.contains("whoami"));
    }
}
