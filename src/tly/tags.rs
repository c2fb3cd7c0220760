use serde::Serialize;
use serde_json::Value;

use super::client::TlyClient;
use super::require;
use crate::error::Result;

const TAG_PATH: &str = "/api/v1/link/tag";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TagRequest {
    pub tag: String,
}

impl TagRequest {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

impl TlyClient {
    pub async fn list_tags(&self) -> Result<Value> {
        self.get(TAG_PATH).await
    }

    pub async fn create_tag(&self, request: &TagRequest) -> Result<Value> {
        require(&request.tag, "tag")?;
        self.post(TAG_PATH, request).await
    }

    pub async fn get_tag(&self, id: u64) -> Result<Value> {
        self.get(&format!("{}/{}", TAG_PATH, id)).await
    }

    pub async fn update_tag(&self, id: u64, request: &TagRequest) -> Result<Value> {
        require(&request.tag, "tag")?;
        self.put(&format!("{}/{}", TAG_PATH, id), request).await
    }

    pub async fn delete_tag(&self, id: u64) -> Result<Value> {
        self.delete(&format!("{}/{}", TAG_PATH, id)).await
    }
}
