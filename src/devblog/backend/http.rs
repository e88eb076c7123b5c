use super::{BlogBackend, Credentials, Registration};
use crate::config::BlogConfig;
use crate::error::{BlogError, Result};
use crate::model::{MyPostsFilter, Post, PostDraft};
use reqwest::blocking::multipart::Form;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use serde_json::Value;

const NO_REPLY: &str = "No response";

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenBody {
    #[serde(default)]
    token: Option<String>,
}

/// Extracts the human readable message from an error body
/// (`{"error": ..}` or `{"message": ..}`).
pub(crate) fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed
        .error
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
}

/// The chat endpoint answers either `{"reply": ".."}` or a bare JSON string.
pub(crate) fn chat_reply(body: &Value) -> String {
    match body {
        Value::Object(map) => match map.get("reply") {
            Some(Value::String(reply)) if !reply.is_empty() => reply.clone(),
            _ => NO_REPLY.to_string(),
        },
        Value::String(reply) if !reply.is_empty() => reply.clone(),
        _ => NO_REPLY.to_string(),
    }
}

/// Parses the public feed, skipping entries that are not post documents.
pub(crate) fn posts_from_value(body: Value) -> Option<Vec<Post>> {
    let Value::Array(items) = body else {
        return None;
    };
    let total = items.len();
    let posts: Vec<Post> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(post) => Some(post),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed post");
                None
            }
        })
        .collect();
    tracing::debug!(total, kept = posts.len(), "parsed post list");
    Some(posts)
}

fn draft_form(draft: &PostDraft, creating: bool) -> Result<Form> {
    let mut form = Form::new()
        .text("title", draft.title.clone())
        .text("excerpt", draft.excerpt.clone())
        .text("content", draft.content.clone())
        .text("tags", draft.tags_field())
        .text("authorName", draft.author_name.clone())
        .text("authorBio", draft.author_bio.clone());

    if creating {
        form = form.text("status", draft.status.to_string());
        if let Some(path) = &draft.cover_image {
            form = form.file("coverImage", path)?;
        }
    } else {
        form = form.text("image", draft.image.clone());
    }
    if let Some(path) = &draft.author_image {
        form = form.file("authorImage", path)?;
    }
    Ok(form)
}

/// The production backend: the blog service over HTTP.
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &BlogConfig) -> Result<Self> {
        let base = Url::parse(&config.api_url)
            .ok()
            .filter(|u| !u.cannot_be_a_base())
            .ok_or_else(|| BlogError::Config(format!("Invalid api-url: {}", config.api_url)))?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("devblog/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, base })
    }

    /// `<base>/api/<segments..>`, each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("api").extend(segments);
        }
        url
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = error_message(&body).unwrap_or_else(|| fallback_message(status, &body));
        tracing::debug!(status = status.as_u16(), %message, "request rejected");
        Err(BlogError::Api {
            status: status.as_u16(),
            message,
        })
    }

    fn fetch_post(&self, url: Url, token: Option<&str>, key: &str) -> Result<Post> {
        tracing::debug!(%url, "GET");
        let mut request = self.client.get(url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        match self.send(request) {
            Ok(response) => Ok(response.json()?),
            Err(BlogError::Api { status: 404, .. }) => Err(BlogError::PostNotFound(key.to_string())),
            Err(e) => Err(e),
        }
    }
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() && body.len() <= 200 && !body.starts_with('<') {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("Request failed")
        .to_string()
}

impl BlogBackend for HttpBackend {
    fn public_posts(&self) -> Result<Vec<Post>> {
        let url = self.endpoint(&["posts", "public"]);
        tracing::debug!(%url, "GET");
        let response = self.send(self.client.get(url))?;
        let status = response.status().as_u16();
        let body: Value = response.json()?;
        posts_from_value(body).ok_or(BlogError::Api {
            status,
            message: "Expected a list of posts".to_string(),
        })
    }

    fn post_by_id(&self, id: &str, token: Option<&str>) -> Result<Post> {
        self.fetch_post(self.endpoint(&["posts", id]), token, id)
    }

    fn post_by_slug(&self, slug: &str) -> Result<Post> {
        self.fetch_post(self.endpoint(&["posts", "slug", slug]), None, slug)
    }

    fn my_posts(&self, token: &str, filter: MyPostsFilter) -> Result<Vec<Post>> {
        let mut segments = vec!["posts", "me"];
        let suffix = filter.path_suffix().trim_start_matches('/');
        if !suffix.is_empty() {
            segments.push(suffix);
        }
        let url = self.endpoint(&segments);
        tracing::debug!(%url, "GET");
        let response = self.send(self.client.get(url).bearer_auth(token))?;
        let body: Value = response.json()?;
        Ok(posts_from_value(body).unwrap_or_default())
    }

    fn create_post(&mut self, token: &str, draft: &PostDraft) -> Result<()> {
        let url = self.endpoint(&["posts"]);
        tracing::debug!(%url, title = %draft.title, "POST");
        let form = draft_form(draft, true)?;
        self.send(self.client.post(url).bearer_auth(token).multipart(form))?;
        Ok(())
    }

    fn update_post(&mut self, token: &str, id: &str, draft: &PostDraft) -> Result<()> {
        let url = self.endpoint(&["posts", id]);
        tracing::debug!(%url, "PUT");
        let form = draft_form(draft, false)?;
        self.send(self.client.put(url).bearer_auth(token).multipart(form))?;
        Ok(())
    }

    fn delete_post(&mut self, token: &str, id: &str) -> Result<()> {
        let url = self.endpoint(&["posts", id]);
        tracing::debug!(%url, "DELETE");
        self.send(self.client.delete(url).bearer_auth(token))?;
        Ok(())
    }

    fn toggle_visibility(&mut self, token: &str, id: &str) -> Result<()> {
        let url = self.endpoint(&["posts", id, "visibility"]);
        tracing::debug!(%url, "PATCH");
        self.send(self.client.patch(url).bearer_auth(token))?;
        Ok(())
    }

    fn register(&mut self, registration: &Registration) -> Result<()> {
        let url = self.endpoint(&["users", "register"]);
        tracing::debug!(%url, email = %registration.email, "POST");
        self.send(self.client.post(url).json(registration))?;
        Ok(())
    }

    fn login(&self, credentials: &Credentials) -> Result<String> {
        let url = self.endpoint(&["users", "login"]);
        tracing::debug!(%url, email = %credentials.email, "POST");
        let response = self.send(self.client.post(url).json(credentials))?;
        let status = response.status().as_u16();
        let body: TokenBody = response.json()?;
        body.token.filter(|t| !t.is_empty()).ok_or(BlogError::Api {
            status,
            message: "Login response did not include a token".to_string(),
        })
    }

    fn chat(&self, message: &str) -> Result<String> {
        let url = self.endpoint(&["chat"]);
        tracing::debug!(%url, "POST");
        let response = self.send(
            self.client
                .post(url)
                .json(&serde_json::json!({ "message": message })),
        )?;
        let body: Value = response.json()?;
        Ok(chat_reply(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serves exactly one HTTP response and hands back the raw request.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut request = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap_or(0);
                }
                let end = line == "\r\n" || line.is_empty();
                request.push_str(&line);
                if end {
                    break;
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();
            request.push_str(&String::from_utf8_lossy(&body));
            reader.get_mut().write_all(response.as_bytes()).unwrap();
            request
        });
        (format!("http://{}", addr), handle)
    }

    fn backend(base: &str) -> HttpBackend {
        let config = BlogConfig {
            api_url: base.to_string(),
            timeout_secs: 5,
            ..BlogConfig::default()
        };
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn builds_encoded_endpoints() {
        let b = backend("https://blog.example.com/");
        assert_eq!(
            b.endpoint(&["posts", "public"]).as_str(),
            "https://blog.example.com/api/posts/public"
        );
        assert_eq!(
            b.endpoint(&["posts", "slug", "a b/c"]).as_str(),
            "https://blog.example.com/api/posts/slug/a%20b%2Fc"
        );
    }

    #[test]
    fn keeps_base_path_prefix() {
        let b = backend("https://example.com/blog");
        assert_eq!(
            b.endpoint(&["chat"]).as_str(),
            "https://example.com/blog/api/chat"
        );
    }

    #[test]
    fn rejects_unusable_base_url() {
        let config = BlogConfig {
            api_url: "mailto:someone".into(),
            ..BlogConfig::default()
        };
        assert!(matches!(
            HttpBackend::new(&config),
            Err(BlogError::Config(_))
        ));
    }

    #[test]
    fn error_message_prefers_error_then_message() {
        assert_eq!(
            error_message(r#"{"error":"Bad creds","message":"x"}"#).as_deref(),
            Some("Bad creds")
        );
        assert_eq!(
            error_message(r#"{"message":"Email taken"}"#).as_deref(),
            Some("Email taken")
        );
        assert_eq!(error_message("<html>"), None);
        assert_eq!(error_message(r#"{"message":""}"#), None);
    }

    #[test]
    fn chat_reply_shapes() {
        assert_eq!(chat_reply(&serde_json::json!({"reply": "hi"})), "hi");
        assert_eq!(chat_reply(&serde_json::json!("plain")), "plain");
        assert_eq!(chat_reply(&serde_json::json!({"other": 1})), NO_REPLY);
        assert_eq!(chat_reply(&Value::Null), NO_REPLY);
    }

    #[test]
    fn non_array_feed_is_rejected() {
        assert!(posts_from_value(serde_json::json!({"posts": []})).is_none());
        let posts = posts_from_value(serde_json::json!([{"_id": "1"}, 42, {"_id": "2"}])).unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn oddly_shaped_posts_stay_in_the_feed() {
        let posts = posts_from_value(serde_json::json!([
            {"_id": "1", "tags": ["java", null]},
            {"_id": "2", "visibility": "public"},
            {"_id": "3", "author": {"name": "Jane", "bio": 7}},
        ]))
        .unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].tags, vec!["java"]);
        assert_eq!(posts[2].author_name(), "Jane");
    }

    #[test]
    fn fetches_public_posts() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"_id":"1","title":"Hello","tags":["java"]},{"_id":"2"}]"#,
        );
        let posts = backend(&base).public_posts().unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].title, "Hello");

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/posts/public "));
    }

    #[test]
    fn surfaces_structured_api_errors() {
        let (base, server) = serve_once("401 Unauthorized", r#"{"error":"Invalid credentials"}"#);
        let err = backend(&base)
            .login(&Credentials {
                email: "a@b.c".into(),
                password: "nope".into(),
            })
            .unwrap_err();
        match err {
            BlogError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected error: {other}"),
        }
        let request = server.join().unwrap();
        assert!(request.contains(r#""email":"a@b.c""#));
    }

    #[test]
    fn sends_bearer_token_on_mutations() {
        let (base, server) = serve_once("200 OK", "{}");
        backend(&base).delete_post("tok-123", "p1").unwrap();
        let request = server.join().unwrap();
        assert!(request.starts_with("DELETE /api/posts/p1 "));
        assert!(request
            .to_ascii_lowercase()
            .contains("authorization: bearer tok-123"));
    }

    #[test]
    fn missing_post_maps_to_not_found() {
        let (base, server) = serve_once("404 Not Found", r#"{"message":"Post not found"}"#);
        let err = backend(&base).post_by_slug("nope").unwrap_err();
        assert!(matches!(err, BlogError::PostNotFound(ref key) if key == "nope"));
        server.join().unwrap();
    }
}
