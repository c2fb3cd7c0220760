use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tly::{
    BulkLink, BulkShortenRequest, CreatePixelRequest, CreateShortLinkRequest,
    DeleteShortLinkRequest, ExpandShortLinkRequest, ListShortLinksParams, TagRequest, TlyClient,
    TlyConfig, UpdatePixelRequest, UpdateShortLinkRequest,
};

#[derive(Parser)]
#[command(name = "tly")]
#[command(about = "Command-line access to the T.ly URL shortener API")]
struct Cli {
    /// TOML file with api_token / base_url / timeout_seconds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API token (overrides TLY_API_TOKEN and the config file)
    #[arg(long)]
    token: Option<String>,

    /// API base address (overrides TLY_BASE_URL and the config file)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Short link management
    #[command(subcommand)]
    Link(LinkCommand),
    /// Tag management
    #[command(subcommand)]
    Tag(TagCommand),
    /// Tracking pixel management
    #[command(subcommand)]
    Pixel(PixelCommand),
}

#[derive(Subcommand)]
enum LinkCommand {
    Create {
        long_url: String,
        #[arg(long)]
        short_id: Option<String>,
        #[arg(long)]
        domain: Option<String>,
        /// "YYYY-MM-DD HH:MM:SS"
        #[arg(long, value_parser = parse_datetime)]
        expire_at: Option<NaiveDateTime>,
        #[arg(long)]
        expire_views: Option<u64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        public_stats: Option<bool>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<u64>,
        #[arg(long = "pixel")]
        pixels: Vec<u64>,
        /// Arbitrary JSON object sent as `meta`
        #[arg(long, value_parser = parse_json)]
        meta: Option<Value>,
    },
    Get {
        short_url: String,
    },
    Update {
        short_url: String,
        #[arg(long)]
        long_url: Option<String>,
        #[arg(long, value_parser = parse_datetime)]
        expire_at: Option<NaiveDateTime>,
        #[arg(long)]
        expire_views: Option<u64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        public_stats: Option<bool>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long = "tag")]
        tags: Option<Vec<u64>>,
        #[arg(long = "pixel")]
        pixels: Option<Vec<u64>>,
        #[arg(long, value_parser = parse_json)]
        meta: Option<Value>,
        /// Extra fields as a JSON object, merged into the request body
        #[arg(long, value_parser = parse_json)]
        extra: Option<Value>,
    },
    Delete {
        short_url: String,
    },
    Expand {
        short_url: String,
        #[arg(long)]
        password: Option<String>,
    },
    List {
        #[arg(long)]
        search: Option<String>,
        #[arg(long = "tag-id")]
        tag_ids: Vec<u64>,
        #[arg(long = "pixel-id")]
        pixel_ids: Vec<u64>,
        /// YYYY-MM-DD
        #[arg(long)]
        start_date: Option<NaiveDate>,
        /// YYYY-MM-DD
        #[arg(long)]
        end_date: Option<NaiveDate>,
        #[arg(long = "domain")]
        domains: Vec<String>,
    },
    Bulk {
        #[arg(required = true)]
        long_urls: Vec<String>,
        #[arg(long)]
        domain: Option<String>,
        #[arg(long = "tag")]
        tags: Vec<u64>,
        #[arg(long = "pixel")]
        pixels: Vec<u64>,
    },
    Stats {
        short_url: String,
    },
}

#[derive(Subcommand)]
enum TagCommand {
    List,
    Create { tag: String },
    Get { id: u64 },
    Update { id: u64, tag: String },
    Delete { id: u64 },
}

#[derive(Subcommand)]
enum PixelCommand {
    List,
    Create {
        name: String,
        pixel_id: String,
        /// e.g. googleAnalytics, facebook, tiktok
        pixel_type: String,
    },
    Get {
        id: u64,
    },
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        pixel_id: Option<String>,
        #[arg(long)]
        pixel_type: Option<String>,
    },
    Delete {
        id: u64,
    },
}

fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map_err(|e| format!("expected \"YYYY-MM-DD HH:MM:SS\": {}", e))
}

fn parse_json(s: &str) -> Result<Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {}", e))
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the JSON response, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = TlyConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(token) = cli.token {
        config.api_token = Some(token);
    }
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url;
    }
    debug!(base_url = %config.base_url, "Configuration resolved");

    let client = TlyClient::from_config(&config)?;

    let response = match cli.command {
        Command::Link(command) => run_link(&client, command).await?,
        Command::Tag(command) => run_tag(&client, command).await?,
        Command::Pixel(command) => run_pixel(&client, command).await?,
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run_link(client: &TlyClient, command: LinkCommand) -> Result<Value> {
    let response = match command {
        LinkCommand::Create {
            long_url,
            short_id,
            domain,
            expire_at,
            expire_views,
            description,
            public_stats,
            password,
            tags,
            pixels,
            meta,
        } => {
            let request = CreateShortLinkRequest {
                short_id,
                domain,
                expire_at_datetime: expire_at,
                expire_at_views: expire_views,
                description,
                public_stats,
                password,
                tags,
                pixels,
                meta,
                ..CreateShortLinkRequest::new(long_url)
            };
            client.create_short_link(&request).await?
        }
        LinkCommand::Get { short_url } => client.get_short_link(&short_url).await?,
        LinkCommand::Update {
            short_url,
            long_url,
            expire_at,
            expire_views,
            description,
            public_stats,
            password,
            tags,
            pixels,
            meta,
            extra,
        } => {
            let extra = match extra {
                Some(Value::Object(map)) => map,
                Some(_) => anyhow::bail!("--extra must be a JSON object"),
                None => Default::default(),
            };
            let request = UpdateShortLinkRequest {
                short_url,
                long_url,
                expire_at_datetime: expire_at,
                expire_at_views: expire_views,
                description,
                public_stats,
                password,
                tags,
                pixels,
                meta,
                extra,
            };
            client.update_short_link(&request).await?
        }
        LinkCommand::Delete { short_url } => {
            client
                .delete_short_link(&DeleteShortLinkRequest::new(short_url))
                .await?
        }
        LinkCommand::Expand {
            short_url,
            password,
        } => {
            let request = ExpandShortLinkRequest {
                short_url,
                password,
            };
            client.expand_short_link(&request).await?
        }
        LinkCommand::List {
            search,
            tag_ids,
            pixel_ids,
            start_date,
            end_date,
            domains,
        } => {
            let params = ListShortLinksParams {
                search,
                tag_ids,
                pixel_ids,
                start_date,
                end_date,
                domains,
            };
            client.list_short_links(&params).await?
        }
        LinkCommand::Bulk {
            long_urls,
            domain,
            tags,
            pixels,
        } => {
            let request = BulkShortenRequest {
                domain,
                links: long_urls.into_iter().map(BulkLink::new).collect(),
                tags,
                pixels,
            };
            client.bulk_shorten_links(&request).await?
        }
        LinkCommand::Stats { short_url } => client.get_stats(&short_url).await?,
    };
    Ok(response)
}

async fn run_tag(client: &TlyClient, command: TagCommand) -> Result<Value> {
    let response = match command {
        TagCommand::List => client.list_tags().await?,
        TagCommand::Create { tag } => client.create_tag(&TagRequest::new(tag)).await?,
        TagCommand::Get { id } => client.get_tag(id).await?,
        TagCommand::Update { id, tag } => client.update_tag(id, &TagRequest::new(tag)).await?,
        TagCommand::Delete { id } => client.delete_tag(id).await?,
    };
    Ok(response)
}

async fn run_pixel(client: &TlyClient, command: PixelCommand) -> Result<Value> {
    let response = match command {
        PixelCommand::List => client.list_pixels().await?,
        PixelCommand::Create {
            name,
            pixel_id,
            pixel_type,
        } => {
            client
                .create_pixel(&CreatePixelRequest::new(name, pixel_id, pixel_type))
                .await?
        }
        PixelCommand::Get { id } => client.get_pixel(id).await?,
        PixelCommand::Update {
            id,
            name,
            pixel_id,
            pixel_type,
        } => {
            let request = UpdatePixelRequest {
                id: Some(id),
                name,
                pixel_id,
                pixel_type,
            };
            client.update_pixel(id, &request).await?
        }
        PixelCommand::Delete { id } => client.delete_pixel(id).await?,
    };
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_link_create_flags() {
        let cli = Cli::try_parse_from([
            "tly",
            "--token",
            "abc",
            "link",
            "create",
            "https://example.com",
            "--expire-at",
            "2035-01-17 15:00:00",
            "--tag",
            "1",
            "--tag",
            "2",
            "--meta",
            r#"{"a":1}"#,
            "--public-stats",
            "false",
        ])
        .unwrap();

        assert_eq!(cli.token.as_deref(), Some("abc"));
        match cli.command {
            Command::Link(LinkCommand::Create {
                long_url,
                public_stats,
                expire_at,
                tags,
                meta,
                ..
            }) => {
                assert_eq!(long_url, "https://example.com");
                assert_eq!(public_stats, Some(false));
                assert_eq!(expire_at.unwrap().to_string(), "2035-01-17 15:00:00");
                assert_eq!(tags, vec![1, 2]);
                assert_eq!(meta.unwrap()["a"], 1);
            }
            _ => panic!("expected link create"),
        }
    }

    #[test]
    fn rejects_malformed_datetime() {
        let result = Cli::try_parse_from([
            "tly",
            "link",
            "create",
            "https://example.com",
            "--expire-at",
            "tomorrow",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_tag_update() {
        let cli = Cli::try_parse_from(["tly", "tag", "update", "7", "renamed"]).unwrap();
        match cli.command {
            Command::Tag(TagCommand::Update { id, tag }) => {
                assert_eq!(id, 7);
                assert_eq!(tag, "renamed");
            }
            _ => panic!("expected tag update"),
        }
    }
}
