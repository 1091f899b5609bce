use serde::Serialize;

use crate::ContentCategory;

/// Column-status value written for an approval.
pub const STATUS_APPROVED: &str = "YES";
/// Column-status value written for a rejection.
pub const STATUS_REJECTED: &str = "NO";

const RSS_SHEET: &str = "RSS";

/// A spreadsheet row under review.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReviewItem {
    pub sheet: String,
    /// 1-based spreadsheet row number.
    pub row: u64,
    /// Headline for news and RSS entries.
    pub title: Option<String>,
    /// Headline for journal articles.
    pub article_title: Option<String>,
    /// Post caption for user content.
    pub caption: Option<String>,
}

impl ReviewItem {
    pub fn new(sheet: impl Into<String>, row: u64) -> Self {
        Self {
            sheet: sheet.into(),
            row,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_article_title(mut self, title: impl Into<String>) -> Self {
        self.article_title = Some(title.into());
        self
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    fn caption(&self) -> Option<String> {
        self.caption.clone().filter(|caption| !caption.is_empty())
    }
}

/// Reviewer guidance attached to a rejected user-content item.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Rejection {
    pub feedback: Option<String>,
    pub image_query: Option<String>,
    pub headline_improvements: Option<String>,
    pub caption_improvements: Option<String>,
}

impl Rejection {
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }

    pub fn with_image_query(mut self, query: impl Into<String>) -> Self {
        self.image_query = Some(query.into());
        self
    }
}

/// JSON body of an approve, reject or delete webhook call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DecisionPayload {
    pub sheet: String,
    pub row: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline_improvements: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption_improvements: Option<String>,
}

impl DecisionPayload {
    fn base(item: &ReviewItem, status: Option<&'static str>) -> Self {
        Self {
            sheet: item.sheet.clone(),
            row: item.row,
            status,
            title: None,
            caption: None,
            feedback: None,
            image_query: None,
            headline_improvements: None,
            caption_improvements: None,
        }
    }

    /// Adds the category-specific headline and sheet override.
    fn with_headline(mut self, category: ContentCategory, item: &ReviewItem) -> Self {
        match category {
            ContentCategory::News => {
                self.title = Some(item.title.clone().unwrap_or_default());
            }
            ContentCategory::Journals => {
                self.title = Some(item.article_title.clone().unwrap_or_default());
            }
            ContentCategory::Rss => {
                self.title = Some(item.title.clone().unwrap_or_default());
                self.sheet = RSS_SHEET.to_owned();
            }
            ContentCategory::Content | ContentCategory::Regenerated => {}
        }
        self
    }

    pub fn approve(category: ContentCategory, item: &ReviewItem) -> Self {
        let mut payload = Self::base(item, Some(STATUS_APPROVED)).with_headline(category, item);
        if category.is_user_content() {
            payload.caption = item.caption();
        }
        payload
    }

    /// Rejection guidance is only forwarded for user content; other
    /// categories carry status and headline only.
    pub fn reject(category: ContentCategory, item: &ReviewItem, rejection: &Rejection) -> Self {
        let mut payload = Self::base(item, Some(STATUS_REJECTED)).with_headline(category, item);
        if category.is_user_content() {
            payload.feedback = Some(rejection.feedback.clone().unwrap_or_default());
            payload.image_query = Some(rejection.image_query.clone().unwrap_or_default());
            payload.headline_improvements =
                Some(rejection.headline_improvements.clone().unwrap_or_default());
            payload.caption_improvements =
                Some(rejection.caption_improvements.clone().unwrap_or_default());
            payload.caption = item.caption();
        }
        payload
    }

    pub fn delete(item: &ReviewItem) -> Self {
        Self::base(item, None)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{DecisionPayload, Rejection, ReviewItem};
    use crate::ContentCategory;

    fn to_json(payload: &DecisionPayload) -> serde_json::Value {
        serde_json::to_value(payload).unwrap()
    }

    #[test]
    fn approve_content_carries_caption() {
        let item = ReviewItem::new("text/image", 5).with_caption("Morning light");
        let payload = DecisionPayload::approve(ContentCategory::Content, &item);
        assert_eq!(
            to_json(&payload),
            json!({"sheet": "text/image", "row": 5, "status": "YES", "caption": "Morning light"})
        );
    }

    #[test]
    fn approve_content_without_caption_omits_it() {
        let item = ReviewItem::new("text/image", 5);
        let payload = DecisionPayload::approve(ContentCategory::Regenerated, &item);
        assert_eq!(
            to_json(&payload),
            json!({"sheet": "text/image", "row": 5, "status": "YES"})
        );
    }

    #[test]
    fn approve_journal_uses_article_title() {
        let item = ReviewItem::new("Journals", 12)
            .with_title("ignored")
            .with_article_title("Sleep and recovery");
        let payload = DecisionPayload::approve(ContentCategory::Journals, &item);
        assert_eq!(
            to_json(&payload),
            json!({"sheet": "Journals", "row": 12, "status": "YES", "title": "Sleep and recovery"})
        );
    }

    #[test]
    fn rss_forces_rss_sheet_and_defaults_missing_title() {
        let item = ReviewItem::new("Feed 3", 8);
        let payload = DecisionPayload::reject(ContentCategory::Rss, &item, &Rejection::default());
        assert_eq!(
            to_json(&payload),
            json!({"sheet": "RSS", "row": 8, "status": "NO", "title": ""})
        );
    }

    #[test]
    fn reject_content_sends_all_guidance_fields() {
        let item = ReviewItem::new("text/image", 3).with_caption("Cold plunge");
        let rejection = Rejection::default()
            .with_feedback("too long")
            .with_image_query("ice bath");
        let payload = DecisionPayload::reject(ContentCategory::Content, &item, &rejection);
        assert_eq!(
            to_json(&payload),
            json!({
                "sheet": "text/image",
                "row": 3,
                "status": "NO",
                "caption": "Cold plunge",
                "feedback": "too long",
                "image_query": "ice bath",
                "headline_improvements": "",
                "caption_improvements": ""
            })
        );
    }

    #[test]
    fn reject_news_ignores_guidance() {
        let item = ReviewItem::new("News", 4).with_title("Fasting study");
        let rejection = Rejection::default().with_feedback("off topic");
        let payload = DecisionPayload::reject(ContentCategory::News, &item, &rejection);
        assert_eq!(
            to_json(&payload),
            json!({"sheet": "News", "row": 4, "status": "NO", "title": "Fasting study"})
        );
    }

    #[test]
    fn delete_identifies_row_only() {
        let item = ReviewItem::new("News", 4).with_title("Fasting study");
        assert_eq!(
            to_json(&DecisionPayload::delete(&item)),
            json!({"sheet": "News", "row": 4})
        );
    }
}
