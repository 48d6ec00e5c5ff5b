use sha2::{Digest, Sha256};
use std::path::Path;

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub enum FileType {
    CSS,
    JS,
    JSON,
    HTML,
    SVG,
    PNG,
    JPEG,
    GIF,
    WEBP,
    ICO,
    WOFF,
    WOFF2,
    Text,
    SourceMap,
    Other,
}

impl FileType {
    /// Return MIME content type
    pub fn content_type(&self) -> &'static str {
        match self {
            FileType::CSS => "text/css; charset=utf-8",
            FileType::JS => "text/javascript; charset=utf-8",
            FileType::JSON | FileType::SourceMap => "application/json",
            FileType::HTML => "text/html; charset=utf-8",
            FileType::SVG => "image/svg+xml",
            FileType::PNG => "image/png",
            FileType::JPEG => "image/jpeg",
            FileType::GIF => "image/gif",
            FileType::WEBP => "image/webp",
            FileType::ICO => "image/x-icon",
            FileType::WOFF => "font/woff",
            FileType::WOFF2 => "font/woff2",
            FileType::Text => "text/plain; charset=utf-8",
            FileType::Other => "application/octet-stream",
        }
    }
}

pub fn calculate_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

pub fn detect_file_type(path: &Path) -> FileType {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
        .as_str()
    {
        "css" => FileType::CSS,
        "js" | "mjs" => FileType::JS,
        "json" => FileType::JSON,
        "map" => FileType::SourceMap,
        "html" | "htm" => FileType::HTML,
        "svg" => FileType::SVG,
        "png" => FileType::PNG,
        "jpg" | "jpeg" => FileType::JPEG,
        "gif" => FileType::GIF,
        "webp" => FileType::WEBP,
        "ico" => FileType::ICO,
        "woff" => FileType::WOFF,
        "woff2" => FileType::WOFF2,
        "txt" => FileType::Text,
        _ => FileType::Other,
    }
}
