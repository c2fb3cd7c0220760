use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::{Map, Value};

use super::client::TlyClient;
use super::require;
use crate::error::{Result, TlyError};

const LINK_PATH: &str = "/api/v1/link";
const SHORTEN_PATH: &str = "/api/v1/link/shorten";
const EXPAND_PATH: &str = "/api/v1/link/expand";
const LIST_PATH: &str = "/api/v1/link/list";
const BULK_PATH: &str = "/api/v1/link/bulk";
const STATS_PATH: &str = "/api/v1/link/stats";

const UPDATE_FIELDS: &[&str] = &[
    "short_url",
    "long_url",
    "expire_at_datetime",
    "expire_at_views",
    "description",
    "public_stats",
    "password",
    "tags",
    "pixels",
    "meta",
];

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

mod datetime_format {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.collect_str(&dt.format(super::DATETIME_FORMAT)),
            None => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreateShortLinkRequest {
    pub long_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(with = "datetime_format", skip_serializing_if = "Option::is_none")]
    pub expire_at_datetime: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at_views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_stats: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pixels: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl CreateShortLinkRequest {
    pub fn new(long_url: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            short_id: None,
            domain: None,
            expire_at_datetime: None,
            expire_at_views: None,
            description: None,
            public_stats: None,
            password: None,
            tags: Vec::new(),
            pixels: Vec::new(),
            meta: None,
        }
    }

    pub fn short_id(mut self, short_id: impl Into<String>) -> Self {
        self.short_id = Some(short_id.into());
        self
    }

    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn expire_at_datetime(mut self, at: NaiveDateTime) -> Self {
        self.expire_at_datetime = Some(at);
        self
    }

    pub fn expire_at_views(mut self, views: u64) -> Self {
        self.expire_at_views = Some(views);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn public_stats(mut self, public: bool) -> Self {
        self.public_stats = Some(public);
        self
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn tags(mut self, tags: Vec<u64>) -> Self {
        self.tags = tags;
        self
    }

    pub fn pixels(mut self, pixels: Vec<u64>) -> Self {
        self.pixels = pixels;
        self
    }

    pub fn meta(mut self, meta: Value) -> Self {
        self.meta = Some(meta);
        self
    }
}

/// Fields to change on an existing link, identified by `short_url`.
///
/// Anything in `extra` is sent alongside the named fields untouched, so
/// partial updates and service-side additions pass through. `extra` may not
/// repeat a named field.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UpdateShortLinkRequest {
    pub short_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_url: Option<String>,
    #[serde(with = "datetime_format", skip_serializing_if = "Option::is_none")]
    pub expire_at_datetime: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at_views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_stats: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UpdateShortLinkRequest {
    pub fn new(short_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DeleteShortLinkRequest {
    pub short_url: String,
}

impl DeleteShortLinkRequest {
    pub fn new(short_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExpandShortLinkRequest {
    pub short_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ExpandShortLinkRequest {
    pub fn new(short_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
            password: None,
        }
    }

    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }
}

/// Filters for the link listing. Unset filters are left out of the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListShortLinksParams {
    pub search: Option<String>,
    pub tag_ids: Vec<u64>,
    pub pixel_ids: Vec<u64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub domains: Vec<String>,
}

impl ListShortLinksParams {
    /// Query pairs in service order; list filters use the `key[]` form.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();

        if let Some(ref search) = self.search {
            query.push(("search".to_string(), search.clone()));
        }
        for id in &self.tag_ids {
            query.push(("tag_ids[]".to_string(), id.to_string()));
        }
        for id in &self.pixel_ids {
            query.push(("pixel_ids[]".to_string(), id.to_string()));
        }
        if let Some(start) = self.start_date {
            query.push(("start_date".to_string(), start.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.end_date {
            query.push(("end_date".to_string(), end.format(DATE_FORMAT).to_string()));
        }
        for domain in &self.domains {
            query.push(("domains[]".to_string(), domain.clone()));
        }

        query
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BulkLink {
    pub long_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_half: Option<String>,
}

impl BulkLink {
    pub fn new(long_url: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            back_half: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BulkShortenRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub links: Vec<BulkLink>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pixels: Vec<u64>,
}

impl TlyClient {
    pub async fn create_short_link(&self, request: &CreateShortLinkRequest) -> Result<Value> {
        require(&request.long_url, "long_url")?;
        self.post(SHORTEN_PATH, request).await
    }

    pub async fn get_short_link(&self, short_url: &str) -> Result<Value> {
        require(short_url, "short_url")?;
        self.get_with_query(LINK_PATH, &[("short_url".to_string(), short_url.to_string())])
            .await
    }

    pub async fn update_short_link(&self, request: &UpdateShortLinkRequest) -> Result<Value> {
        require(&request.short_url, "short_url")?;
        if let Some(field) = UPDATE_FIELDS.iter().find(|f| request.extra.contains_key(**f)) {
            return Err(TlyError::InvalidRequest(format!(
                "{} must be set through its own field, not extra",
                field
            )));
        }
        self.put(LINK_PATH, request).await
    }

    pub async fn delete_short_link(&self, request: &DeleteShortLinkRequest) -> Result<Value> {
        require(&request.short_url, "short_url")?;
        self.delete_with_body(LINK_PATH, request).await
    }

    pub async fn expand_short_link(&self, request: &ExpandShortLinkRequest) -> Result<Value> {
        require(&request.short_url, "short_url")?;
        self.post(EXPAND_PATH, request).await
    }

    pub async fn list_short_links(&self, params: &ListShortLinksParams) -> Result<Value> {
        self.get_with_query(LIST_PATH, &params.to_query()).await
    }

    pub async fn bulk_shorten_links(&self, request: &BulkShortenRequest) -> Result<Value> {
        if request.links.is_empty() {
            return Err(TlyError::InvalidRequest(
                "at least one link is required".to_string(),
            ));
        }
        for link in &request.links {
            require(&link.long_url, "links[].long_url")?;
        }
        self.post(BULK_PATH, request).await
    }

    pub async fn get_stats(&self, short_url: &str) -> Result<Value> {
        require(short_url, "short_url")?;
        self.get_with_query(STATS_PATH, &[("short_url".to_string(), short_url.to_string())])
            .await
    }
}
