pub mod client;
pub mod links;
pub mod pixels;
pub mod tags;
pub mod transport;

pub use client::TlyClient;
pub use links::{
    BulkLink, BulkShortenRequest, CreateShortLinkRequest, DeleteShortLinkRequest,
    ExpandShortLinkRequest, ListShortLinksParams, UpdateShortLinkRequest,
};
pub use pixels::{CreatePixelRequest, UpdatePixelRequest};
pub use tags::TagRequest;
pub use transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

use crate::error::{Result, TlyError};

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TlyError::missing(field));
    }
    Ok(())
}
