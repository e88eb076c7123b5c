use crate::auth::{AuthContext, Session};
use crate::backend::{BlogBackend, Credentials, Registration};
use crate::commands::{BlogPaths, CmdMessage, CmdResult};
use crate::error::{BlogError, Result};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
pub struct SignUp {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUp {
    /// Client-side checks run before anything is sent.
    pub fn validate(&self) -> Result<()> {
        if self.password != self.confirm_password {
            return Err(BlogError::Validation("Passwords do not match".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(BlogError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

pub fn register<B: BlogBackend>(backend: &mut B, form: &SignUp) -> Result<CmdResult> {
    form.validate()?;
    backend.register(&Registration {
        full_name: form.full_name.trim().to_string(),
        email: form.email.trim().to_string(),
        password: form.password.clone(),
    })?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Registered {}. You can now log in.",
        form.email.trim()
    )));
    Ok(result)
}

/// Exchanges credentials for a token and persists the new session.
pub fn login<B: BlogBackend>(
    backend: &B,
    paths: &BlogPaths,
    email: &str,
    password: &str,
) -> Result<CmdResult> {
    let email = email.trim();
    let token = backend.login(&Credentials {
        email: email.to_string(),
        password: password.to_string(),
    })?;
    let session = Session::from_login(email, token);
    session.save(&paths.data_dir)?;
    tracing::info!(%email, "session created");

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Welcome back, {}!",
        session.name
    )));
    Ok(result.with_session(session))
}

pub fn logout(paths: &BlogPaths) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    if Session::clear(&paths.data_dir)? {
        result.add_message(CmdMessage::success("Logged out."));
    } else {
        result.add_message(CmdMessage::info("You are not logged in."));
    }
    Ok(result)
}

pub fn whoami(auth: &AuthContext) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match auth.session() {
        Some(session) => {
            result.add_message(CmdMessage::info(format!(
                "{} <{}>",
                session.name, session.email
            )));
            if auth.subject().is_none() {
                result.add_message(CmdMessage::warning(
                    "The stored token carries no user id; author controls are disabled.",
                ));
            }
            result = result.with_session(session.clone());
        }
        None => result.add_message(CmdMessage::info("You are not logged in.")),
    }
    Ok(result)
}
