use crate::auth::AuthContext;
use crate::backend::BlogBackend;
use crate::commands::helpers::listed;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::MyPostsFilter;

pub fn run<B: BlogBackend>(
    backend: &B,
    auth: &AuthContext,
    filter: MyPostsFilter,
) -> Result<CmdResult> {
    let session = auth.require()?;
    let posts = backend.my_posts(&session.token, filter)?;

    let mut result = CmdResult::default().with_listed_posts(listed(auth, posts));
    if result.listed_posts.is_empty() {
        let what = match filter {
            MyPostsFilter::All => "posts",
            MyPostsFilter::Published => "published posts",
            MyPostsFilter::Draft => "drafts",
        };
        result.add_message(CmdMessage::info(format!("You have no {} yet.", what)));
    }
    Ok(result)
}
