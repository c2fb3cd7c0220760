//! Async client for the [T.ly](https://t.ly) URL shortener API.
//!
//! ```no_run
//! use tly::{CreateShortLinkRequest, TlyClient};
//!
//! # async fn run() -> tly::Result<()> {
//! let client = TlyClient::new("your-api-token")?;
//! let link = client
//!     .create_short_link(&CreateShortLinkRequest::new("https://example.com"))
//!     .await?;
//! println!("{}", link["short_url"]);
//! # Ok(())
//! # }
//! ```
//!
//! Every method returns the service's JSON body as a [`serde_json::Value`].

pub mod config;
pub mod error;
pub mod tly;

pub use config::TlyConfig;
pub use error::{Result, TlyError};
pub use tly::{
    ApiRequest, ApiResponse, BulkLink, BulkShortenRequest, CreatePixelRequest,
    CreateShortLinkRequest, DeleteShortLinkRequest, ExpandShortLinkRequest,
    ListShortLinksParams, ReqwestTransport, TagRequest, TlyClient, Transport,
    UpdatePixelRequest, UpdateShortLinkRequest,
};
