use crate::auth::AuthContext;
use crate::backend::BlogBackend;
use crate::commands::helpers::{fetch_post, listed};
use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::PostKey;

pub fn run<B: BlogBackend>(backend: &B, auth: &AuthContext, key: &PostKey) -> Result<CmdResult> {
    let post = fetch_post(backend, auth, key)?;
    Ok(CmdResult::default().with_listed_posts(listed(auth, vec![post])))
}
