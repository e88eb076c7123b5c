use crate::error::{BlogError, Result};
use std::env;
use std::fs;
use std::path::Path;
use std::process::Command;

/// A post's title and body as laid out in an editor buffer.
/// Format: title\n\ncontent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorContent {
    pub title: String,
    pub content: String,
}

impl EditorContent {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn to_buffer(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }

    /// First non-blank line is the title; everything after it, minus
    /// surrounding blank lines, is the content.
    pub fn from_buffer(buffer: &str) -> Self {
        let trimmed = buffer.trim_start_matches(['\n', '\r']);
        let (title, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
        Self {
            title: title.trim().to_string(),
            content: rest.trim_matches(['\n', '\r']).trim_end().to_string(),
        }
    }
}

/// $EDITOR, then $VISUAL, then the first of vim, vi, nano found on PATH.
pub fn get_editor() -> Result<String> {
    for var in ["EDITOR", "VISUAL"] {
        if let Ok(editor) = env::var(var) {
            if !editor.trim().is_empty() {
                return Ok(editor);
            }
        }
    }

    ["vim", "vi", "nano"]
        .into_iter()
        .find(|candidate| {
            Command::new("which")
                .arg(candidate)
                .output()
                .map(|o| o.status.success())
                .unwrap_or(false)
        })
        .map(String::from)
        .ok_or_else(|| BlogError::Config("No editor found. Set $EDITOR.".to_string()))
}

/// Opens `path` in the user's editor and returns the file once it closes.
pub fn open_in_editor<P: AsRef<Path>>(path: P) -> Result<String> {
    let editor = get_editor()?;
    let path = path.as_ref();

    // $EDITOR may carry arguments, e.g. "code --wait"
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    let status = Command::new(program)
        .args(parts)
        .arg(path)
        .status()
        .map_err(|e| BlogError::Config(format!("Failed to launch editor '{}': {}", editor, e)))?;

    if !status.success() {
        return Err(BlogError::Config(format!(
            "Editor '{}' exited with non-zero status",
            editor
        )));
    }

    Ok(fs::read_to_string(path)?)
}

/// Round-trips `initial` through the editor using a temporary markdown file.
pub fn edit_content(initial: &EditorContent) -> Result<EditorContent> {
    let temp_file = env::temp_dir().join(format!("devblog_post_{}.md", uuid::Uuid::new_v4()));
    fs::write(&temp_file, initial.to_buffer())?;

    let edited = open_in_editor(&temp_file);
    if let Err(e) = fs::remove_file(&temp_file) {
        tracing::debug!(path = %temp_file.display(), error = %e, "could not remove editor buffer");
    }

    Ok(EditorContent::from_buffer(&edited?))
}
