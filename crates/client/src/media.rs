//! Media type hints derived from resource identifiers.

use podfs_common::PodUri;

/// Media type hint for an item, derived from its apparent file extension.
///
/// Pods store a content type per resource; when replacing content the client
/// supplies a hint based on the identifier alone, falling back to an opaque
/// byte stream.
pub fn media_type_for(uri: &PodUri) -> &'static str {
    match uri.extension().as_deref() {
        Some("txt") => "text/plain",
        Some("md") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        Some("css") => "text/css",
        Some("csv") => "text/csv",
        Some("ttl") => "text/turtle",
        Some("js") => "text/javascript",
        Some("json") => "application/json",
        Some("jsonld") => "application/ld+json",
        Some("xml") => "application/xml",
        Some("pdf") => "application/pdf",
        Some("zip") => "application/zip",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("webp") => "image/webp",
        Some("ico") => "image/x-icon",
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}
