use serde::Serialize;
use serde_json::Value;

use super::client::TlyClient;
use super::require;
use crate::error::Result;

const PIXEL_PATH: &str = "/api/v1/link/pixel";

/// A tracking pixel to register, e.g. `pixel_type = "googleAnalytics"`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CreatePixelRequest {
    pub name: String,
    pub pixel_id: String,
    pub pixel_type: String,
}

impl CreatePixelRequest {
    pub fn new(
        name: impl Into<String>,
        pixel_id: impl Into<String>,
        pixel_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            pixel_id: pixel_id.into(),
            pixel_type: pixel_type.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct UpdatePixelRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixel_type: Option<String>,
}

impl TlyClient {
    pub async fn create_pixel(&self, request: &CreatePixelRequest) -> Result<Value> {
        require(&request.name, "name")?;
        require(&request.pixel_id, "pixel_id")?;
        self.post(PIXEL_PATH, request).await
    }

    pub async fn list_pixels(&self) -> Result<Value> {
        self.get(PIXEL_PATH).await
    }

    pub async fn get_pixel(&self, id: u64) -> Result<Value> {
        self.get(&format!("{}/{}", PIXEL_PATH, id)).await
    }

    pub async fn update_pixel(&self, id: u64, request: &UpdatePixelRequest) -> Result<Value> {
        self.put(&format!("{}/{}", PIXEL_PATH, id), request).await
    }

    pub async fn delete_pixel(&self, id: u64) -> Result<Value> {
        self.delete(&format!("{}/{}", PIXEL_PATH, id)).await
    }
}
