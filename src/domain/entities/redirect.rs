//! Redirect record entity and the inputs that create or modify it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Open Graph content type of the destination page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Website,
    Article,
    Blog,
    Product,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Website => "website",
            Self::Article => "article",
            Self::Blog => "blog",
            Self::Product => "product",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "website" => Ok(Self::Website),
            "article" => Ok(Self::Article),
            "blog" => Ok(Self::Blog),
            "product" => Ok(Self::Product),
            other => Err(format!("unknown content type '{other}'")),
        }
    }
}

/// A slug mapped to its destination URL, preview metadata and click counter.
///
/// `canonical_url` and `author` hold whatever the writer stored; readers never
/// substitute defaults for them.
#[derive(Debug, Clone, PartialEq)]
pub struct RedirectRecord {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub keywords: String,
    pub site_name: String,
    pub content_type: ContentType,
    pub canonical_url: String,
    pub author: String,
    pub clicks: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
}

impl RedirectRecord {
    /// Splits the comma-delimited keyword list into trimmed, non-empty tags.
    pub fn keyword_tags(&self) -> Vec<String> {
        self.keywords
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Case-insensitive substring match over slug, title, description, keywords
    /// and content type.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        [
            self.slug.as_str(),
            self.title.as_str(),
            self.description.as_str(),
            self.keywords.as_str(),
            self.content_type.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Input for inserting a new record.
///
/// Defaults are already applied: `canonical_url` and `author` are never empty here.
/// The store sets `clicks = 0` and both `created_at` and `updated_at` to now.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRedirect {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub keywords: String,
    pub site_name: String,
    pub content_type: ContentType,
    pub canonical_url: String,
    pub author: String,
    pub published_time: Option<DateTime<Utc>>,
}

/// Partial metadata update.
///
/// `None` fields are left unchanged. There is deliberately no `clicks` field:
/// the counter is only changed by the atomic increment and the reset operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedirectPatch {
    pub url: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub keywords: Option<String>,
    pub site_name: Option<String>,
    pub content_type: Option<ContentType>,
    pub canonical_url: Option<String>,
    pub author: Option<String>,
    pub published_time: Option<DateTime<Utc>>,
}

impl RedirectPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Ordering of list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListSort {
    /// Most recently created first.
    #[default]
    Newest,
    /// Highest click count first.
    Clicks,
}

/// Filter and window for listing records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListFilter {
    pub query: Option<String>,
    pub sort: ListSort,
    pub offset: u64,
    pub limit: u64,
}

impl Default for ListFilter {
    fn default() -> Self {
        Self {
            query: None,
            sort: ListSort::default(),
            offset: 0,
            limit: 25,
        }
    }
}

/// Kind of change observed on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

impl FromStr for ChangeKind {
    type Err = String;

    /// Accepts both the event names and the SQL trigger operations.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" | "insert" => Ok(Self::Created),
            "updated" | "update" => Ok(Self::Updated),
            "deleted" | "delete" => Ok(Self::Deleted),
            other => Err(format!("unknown change kind '{other}'")),
        }
    }
}

/// A change notification emitted by a record store's watch stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub slug: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(slug: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            slug: slug.into(),
            kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> RedirectRecord {
        let now = Utc::now();
        RedirectRecord {
            slug: "rust-launch".to_string(),
            url: "https://example.com/a".to_string(),
            title: "Rust Launch".to_string(),
            description: "Release notes".to_string(),
            image_url: "https://example.com/og.png".to_string(),
            keywords: "rust, release ,, async".to_string(),
            site_name: "thisisio".to_string(),
            content_type: ContentType::Article,
            canonical_url: "https://example.com/a".to_string(),
            author: "thisisio".to_string(),
            clicks: 0,
            created_at: now,
            updated_at: now,
            published_time: Some(now),
            modified_time: None,
        }
    }

    #[test]
    fn test_content_type_round_trip() {
        for ty in [
            ContentType::Website,
            ContentType::Article,
            ContentType::Blog,
            ContentType::Product,
        ] {
            assert_eq!(ty.as_str().parse::<ContentType>().unwrap(), ty);
        }
        assert!("video".parse::<ContentType>().is_err());
        assert!("Website".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_content_type_serde() {
        assert_eq!(
            serde_json::to_string(&ContentType::Blog).unwrap(),
            "\"blog\""
        );
        let parsed: ContentType = serde_json::from_str("\"product\"").unwrap();
        assert_eq!(parsed, ContentType::Product);
    }

    #[test]
    fn test_keyword_tags() {
        assert_eq!(record().keyword_tags(), vec!["rust", "release", "async"]);
    }

    #[test]
    fn test_matches_query_is_case_insensitive() {
        let r = record();
        assert!(r.matches_query("LAUNCH"));
        assert!(r.matches_query("release"));
        assert!(r.matches_query("async"));
        assert!(!r.matches_query("python"));
    }

    #[test]
    fn test_matches_query_includes_content_type() {
        let r = record();
        assert!(r.matches_query("ARTICLE"));
        assert!(!r.matches_query("product"));
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(RedirectPatch::default().is_empty());
        let patch = RedirectPatch {
            title: Some("New".to_string()),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn test_change_kind_from_trigger_op() {
        assert_eq!("insert".parse::<ChangeKind>().unwrap(), ChangeKind::Created);
        assert_eq!("update".parse::<ChangeKind>().unwrap(), ChangeKind::Updated);
        assert_eq!("delete".parse::<ChangeKind>().unwrap(), ChangeKind::Deleted);
        assert!("truncate".parse::<ChangeKind>().is_err());
    }
}
