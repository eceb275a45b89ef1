use serde::{Deserialize, Serialize};

/// Site-wide settings managed from the admin panel. `Default` is the
/// documented fallback when the stored value is missing or unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub site_title: String,
    pub tagline: String,
    pub posts_per_page: i64,
    pub allow_comments: bool,
    pub require_comment_approval: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_title: "Quill".to_string(),
            tagline: "A place to write".to_string(),
            posts_per_page: 10,
            allow_comments: true,
            require_comment_approval: false,
        }
    }
}
