use crate::backend::BlogBackend;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;

pub const CHAT_FALLBACK: &str = "⚠️ Sorry, something went wrong.";

/// Sends one message to the assistant. A failed exchange still produces a
/// bot reply, the fallback text.
pub fn run<B: BlogBackend>(backend: &B, message: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let message = message.trim();
    if message.is_empty() {
        result.add_message(CmdMessage::info("Nothing to send."));
        return Ok(result);
    }

    let reply = match backend.chat(message) {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!(error = %e, "chat request failed");
            CHAT_FALLBACK.to_string()
        }
    };
    result.reply = Some(reply);
    Ok(result)
}
