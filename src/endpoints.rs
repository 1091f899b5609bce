use std::fmt;
use std::str::FromStr;

/// Production automation host that owns the moderation webhooks.
pub const DEFAULT_WEBHOOK_BASE_URL: &str = "https://biohackyourself.app.n8n.cloud";

/// Kind of item under review. Drives endpoint selection and payload shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContentCategory {
    /// User-submitted content awaiting its first review.
    Content,
    /// Content sent back for regeneration and up for review again.
    Regenerated,
    News,
    Journals,
    Rss,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 5] = [
        Self::Content,
        Self::Regenerated,
        Self::News,
        Self::Journals,
        Self::Rss,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::Regenerated => "regenerated",
            Self::News => "news",
            Self::Journals => "journals",
            Self::Rss => "rss",
        }
    }

    /// Lenient lookup: unknown labels resolve to [`ContentCategory::Content`].
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(Self::Content)
    }

    /// `content` and `regenerated` share endpoints and payload shape.
    pub fn is_user_content(self) -> bool {
        matches!(self, Self::Content | Self::Regenerated)
    }
}

impl fmt::Display for ContentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| format!("unknown content category '{trimmed}'"))
    }
}

/// Moderation decision forwarded to the automation backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReviewAction {
    Approve,
    Reject,
    Delete,
}

impl ReviewAction {
    /// Operation label used for diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Delete => "delete",
        }
    }
}

/// Static mapping from (category, action) to webhook URL.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointTable {
    base_url: String,
}

impl Default for EndpointTable {
    fn default() -> Self {
        Self::new(DEFAULT_WEBHOOK_BASE_URL)
    }
}

impl EndpointTable {
    /// Builds a table rooted at `base_url` (trailing slashes are ignored).
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self {
            base_url: base_url.as_ref().trim().trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resolve(&self, category: ContentCategory, action: ReviewAction) -> String {
        format!("{}/webhook/{}", self.base_url, webhook_path(category, action))
    }

    pub fn approve_url(&self, category: ContentCategory) -> String {
        self.resolve(category, ReviewAction::Approve)
    }

    pub fn reject_url(&self, category: ContentCategory) -> String {
        self.resolve(category, ReviewAction::Reject)
    }

    pub fn delete_url(&self, category: ContentCategory) -> String {
        self.resolve(category, ReviewAction::Delete)
    }
}

fn webhook_path(category: ContentCategory, action: ReviewAction) -> &'static str {
    use ContentCategory::*;
    use ReviewAction::*;

    match (category, action) {
        (Content | Regenerated, Approve) => "updatesheet",
        (Content | Regenerated, Reject) => "updateno",
        (Content | Regenerated, Delete) => "deleterow",
        (News, Approve) => "newsapiupdateyes",
        (News, Reject) => "newsapiupdateno",
        (News, Delete) => "deletenewsapi",
        (Journals, Approve) => "journalsupdateyes",
        (Journals, Reject) => "journalsupdateno",
        (Journals, Delete) => "deletejournals",
        (Rss, Approve) => "RSSUPDATEYES",
        (Rss, Reject) => "RSSupdateno",
        (Rss, Delete) => "deleterss",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{ContentCategory, EndpointTable, ReviewAction};

    #[test]
    fn default_table_points_at_production_host() {
        let table = EndpointTable::default();
        assert_eq!(
            table.approve_url(ContentCategory::News),
            "https://biohackyourself.app.n8n.cloud/webhook/newsapiupdateyes"
        );
        assert_eq!(
            table.reject_url(ContentCategory::Rss),
            "https://biohackyourself.app.n8n.cloud/webhook/RSSupdateno"
        );
        assert_eq!(
            table.delete_url(ContentCategory::Journals),
            "https://biohackyourself.app.n8n.cloud/webhook/deletejournals"
        );
    }

    #[test]
    fn content_and_regenerated_share_endpoints() {
        let table = EndpointTable::new("http://localhost:9000/");
        for action in [ReviewAction::Approve, ReviewAction::Reject, ReviewAction::Delete] {
            assert_eq!(
                table.resolve(ContentCategory::Content, action),
                table.resolve(ContentCategory::Regenerated, action)
            );
        }
        assert_eq!(
            table.approve_url(ContentCategory::Content),
            "http://localhost:9000/webhook/updatesheet"
        );
    }

    #[test]
    fn every_category_has_distinct_approve_reject_pair() {
        let table = EndpointTable::default();
        let categories = [
            ContentCategory::Content,
            ContentCategory::News,
            ContentCategory::Journals,
            ContentCategory::Rss,
        ];
        let urls: HashSet<String> = categories
            .iter()
            .flat_map(|c| [table.approve_url(*c), table.reject_url(*c), table.delete_url(*c)])
            .collect();
        assert_eq!(urls.len(), 12);
    }

    #[test]
    fn labels_parse_case_insensitively_with_lenient_fallback() {
        assert_eq!("RSS".parse::<ContentCategory>(), Ok(ContentCategory::Rss));
        assert_eq!(" journals ".parse::<ContentCategory>(), Ok(ContentCategory::Journals));
        assert!("podcasts".parse::<ContentCategory>().is_err());
        assert_eq!(ContentCategory::from_label("podcasts"), ContentCategory::Content);
        assert_eq!(ContentCategory::from_label("regenerated"), ContentCategory::Regenerated);
    }
}
