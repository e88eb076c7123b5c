//! # Authentication Context
//!
//! The signed-in user is represented by an explicit [`Session`], created at
//! login, persisted in the data directory and removed at logout. Everything
//! that needs the user receives an [`AuthContext`] as an argument; nothing
//! reads the token from ambient state.
//!
//! ## Ownership check
//!
//! Author-only actions (edit, delete, visibility toggle) are gated by comparing
//! the token's `sub` claim with the post author's identity. The token payload is
//! decoded **without verifying the signature**: the check only decides what the
//! client offers, the API is the one that enforces it.

use crate::error::{BlogError, Result};
use crate::model::Post;
use base64::engine::general_purpose::{STANDARD_NO_PAD, URL_SAFE_NO_PAD};
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const SESSION_FILENAME: &str = "session.json";

/// The claims devblog reads from a token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Decodes the payload segment of a JWT. Never fails: anything malformed
/// yields `None`.
pub fn decode_claims(token: &str) -> Option<TokenClaims> {
    let payload = token.split('.').nth(1)?;
    let payload = payload.trim_end_matches('=');
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD_NO_PAD.decode(payload))
        .ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The `sub` claim of a token, if the token decodes and the claim is non-empty.
pub fn decode_subject(token: &str) -> Option<String> {
    decode_claims(token)?.sub.filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub name: String,
}

impl Session {
    /// Builds the session for a fresh login. The display name comes from the
    /// token's `name` claim, falling back to the local part of the email.
    pub fn from_login(email: &str, token: String) -> Self {
        let name = decode_claims(&token)
            .and_then(|c| c.name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());
        Self {
            token,
            email: email.to_string(),
            name,
        }
    }

    pub fn load<P: AsRef<Path>>(data_dir: P) -> Result<Option<Self>> {
        let path = data_dir.as_ref().join(SESSION_FILENAME);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)?;
        match serde_json::from_str(&content) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, data_dir: P) -> Result<()> {
        let data_dir = data_dir.as_ref();
        if !data_dir.exists() {
            fs::create_dir_all(data_dir)?;
        }
        fs::write(
            data_dir.join(SESSION_FILENAME),
            serde_json::to_string_pretty(self)?,
        )?;
        Ok(())
    }

    /// Removes the persisted session. Returns whether one existed.
    pub fn clear<P: AsRef<Path>>(data_dir: P) -> Result<bool> {
        let path = data_dir.as_ref().join(SESSION_FILENAME);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }
}

/// Who is using the client right now, threaded explicitly through the API.
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    session: Option<Session>,
    subject: Option<String>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(session: Session) -> Self {
        let subject = decode_subject(&session.token);
        Self {
            session: Some(session),
            subject,
        }
    }

    pub fn from_session(session: Option<Session>) -> Self {
        session.map(Self::signed_in).unwrap_or_default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// The session, or [`BlogError::Unauthorized`] when nobody is signed in.
    pub fn require(&self) -> Result<&Session> {
        self.session.as_ref().ok_or(BlogError::Unauthorized)
    }

    /// Whether author-only controls should be offered for `post`.
    pub fn is_author(&self, post: &Post) -> bool {
        self.subject
            .as_deref()
            .is_some_and(|sub| sub == post.author_identity())
    }
}
