//! Request descriptors and payload types.
//!
//! An `ApiRequest` describes one call (path, method, body, whether to send
//! credentials). The client turns it into a `PreparedRequest` with the final
//! URL and headers, which is what a `Transport` actually sends.

use std::path::Path;

use reqwest::header::HeaderMap;
use reqwest::{Method, Url};
use serde::Serialize;

use super::error::{ApiError, ApiResult};

/// Query parameters. Blank values are never added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pairs: Vec<(String, String)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: impl ToString) {
        let value = value.to_string();
        if !value.trim().is_empty() {
            self.pairs.push((key.to_string(), value));
        }
    }

    pub fn push_opt<V: ToString>(&mut self, key: &str, value: Option<V>) {
        if let Some(value) = value {
            self.push(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A file attached to a multipart upload.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePart {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl FilePart {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }

    /// Read a file from disk, guessing its content type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(file_name, content_type_for(path), bytes))
    }
}

/// Content type for an image upload, by file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Multipart body: text fields plus file parts, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    text: Vec<(String, String)>,
    files: Vec<(String, FilePart)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_text(&mut self, name: &str, value: impl ToString) {
        self.text.push((name.to_string(), value.to_string()));
    }

    pub fn push_opt<V: ToString>(&mut self, name: &str, value: Option<V>) {
        if let Some(value) = value {
            self.push_text(name, value);
        }
    }

    pub fn push_file(&mut self, name: &str, file: FilePart) {
        self.files.push((name.to_string(), file));
    }

    pub fn text_fields(&self) -> &[(String, String)] {
        &self.text
    }

    pub fn files(&self) -> &[(String, FilePart)] {
        &self.files
    }

    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.text
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn file_count(&self, name: &str) -> usize {
        self.files.iter().filter(|(n, _)| n == name).count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.files.is_empty()
    }

    /// Check every file's content type before anything is sent.
    pub(crate) fn validate(&self) -> ApiResult<()> {
        for (name, file) in &self.files {
            reqwest::multipart::Part::bytes(Vec::new())
                .mime_str(&file.content_type)
                .map_err(|_| {
                    ApiError::InvalidRequest(format!(
                        "Invalid content type {:?} for {} ({})",
                        file.content_type, name, file.file_name
                    ))
                })?;
        }
        Ok(())
    }

    pub(crate) fn into_reqwest(self) -> reqwest::Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new();
        for (name, value) in self.text {
            form = form.text(name, value);
        }
        for (name, file) in self.files {
            let part = reqwest::multipart::Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.content_type)?;
            form = form.part(name, part);
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartForm),
}

/// Description of a single API call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: RequestBody,
    pub query: Query,
    /// Send the stored bearer token with this request
    pub auth: bool,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::Empty,
            query: Query::new(),
            auth: true,
            headers: Vec::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Send without credentials, even if a token is stored.
    pub fn public(mut self) -> Self {
        self.auth = false;
        self
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::InvalidRequest(format!("Failed to serialize body: {}", e)))?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// A request with its final URL and headers resolved.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: RequestBody,
}

/// Join a collection path and a record id, rejecting ids that would change
/// the route.
pub(crate) fn resource_path(collection: &str, id: &str) -> ApiResult<String> {
    let id = id.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '?', '#']) {
        return Err(ApiError::InvalidRequest(format!("Invalid id: {:?}", id)));
    }
    Ok(format!("{}/{}", collection, id))
}
