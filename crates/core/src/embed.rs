//! Embedded office viewer links.
//!
//! The hosted viewer is an alternative to the render pipeline, never
//! combined with it. It only works for publicly reachable HTTPS sources.

/// Base URL of the embeddable office document viewer.
pub const OFFICE_VIEWER_BASE: &str = "https://view.officeapps.live.com/op/embed.aspx";

/// Build the embeddable viewer URL for a public document link.
pub fn office_viewer_url(document_url: &str) -> String {
    format!("{}?src={}", OFFICE_VIEWER_BASE, urlencoding::encode(document_url))
}

/// Whether the hosted viewer can reach this source at all.
pub fn is_embeddable(document_url: &str) -> bool {
    document_url.starts_with("https://")
}
