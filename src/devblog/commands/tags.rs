use crate::backend::BlogBackend;
use crate::commands::CmdResult;
use crate::error::Result;
use crate::feed::filter::categories;

/// The category bar: "All" followed by every tag on the public feed.
pub fn run<B: BlogBackend>(backend: &B) -> Result<CmdResult> {
    let posts = backend.public_posts()?;
    let mut result = CmdResult::default();
    result.categories = categories(&posts)
        .iter()
        .map(|c| c.label().to_string())
        .collect();
    Ok(result)
}
