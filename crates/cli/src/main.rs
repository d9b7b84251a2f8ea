// ABOUTME: CLI for resolving comment and clip URLs with unfurl-resolver.
// ABOUTME: Builds the extractor set from environment credentials and prints JSON.

use std::env;

use anyhow::Result;
use clap::Parser;
use serde_json::json;
use unfurl_resolver::sources::cmtt::{Cmtt, CmttConfig};
use unfurl_resolver::sources::habr::{Habr, HabrConfig};
use unfurl_resolver::sources::instagram::{Instagram, InstagramConfig};
use unfurl_resolver::sources::reddit::{Reddit, RedditConfig};
use unfurl_resolver::sources::tiktok::{Tiktok, TiktokConfig};
use unfurl_resolver::sources::trashbox::{Trashbox, TrashboxConfig};
use unfurl_resolver::sources::twitter::{Twitter, TwitterConfig};
use unfurl_resolver::sources::vk::{Vk, VkConfig};
use unfurl_resolver::sources::youtube::{Youtube, YoutubeConfig};
use unfurl_resolver::{Extractor, Resolver};

const DEFAULT_USER_AGENT: &str = concat!("unfurl/", env!("CARGO_PKG_VERSION"));

/// Resolve one or more URLs and output the normalized content as JSON.
#[derive(Parser, Debug)]
#[command(name = "unfurl-cli")]
#[command(about = "Resolve comment and clip URLs with unfurl-resolver and print JSON", long_about = None)]
struct Args {
    /// URL(s) to resolve.
    #[arg(required = true)]
    urls: Vec<String>,

    /// Output compact JSON instead of pretty.
    #[arg(long, default_value_t = false)]
    compact: bool,
}

/// Build the resolver from environment credentials. Sources whose
/// credentials or endpoint templates are absent are left unregistered;
/// the keyless sources are always available.
fn build_resolver() -> Resolver {
    let ua = env::var("UNFURL_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
    let mut extractors: Vec<Box<dyn Extractor>> = Vec::new();

    if let (Ok(id), Ok(secret)) = (
        env::var("REDDIT_CLIENT_ID"),
        env::var("REDDIT_CLIENT_SECRET"),
    ) {
        extractors.push(Box::new(Reddit::new(RedditConfig::new(id, secret, &ua))));
    }
    extractors.push(Box::new(Habr::new(HabrConfig::new(&ua))));
    extractors.push(Box::new(Cmtt::new(CmttConfig::new(&ua))));
    extractors.push(Box::new(Twitter::new(TwitterConfig::new(&ua))));
    if let Ok(key) = env::var("YOUTUBE_API_KEY") {
        extractors.push(Box::new(Youtube::new(YoutubeConfig::new(key, &ua))));
    }
    if let Ok(thumbnail) = env::var("VK_THUMBNAIL_URL") {
        extractors.push(Box::new(Vk::new(VkConfig::new(thumbnail, &ua))));
    }
    if let (Ok(meta), Ok(storage), Ok(thumbnail)) = (
        env::var("INSTAGRAM_VIDEO_META_URL"),
        env::var("INSTAGRAM_VIDEO_STORAGE_URL"),
        env::var("INSTAGRAM_THUMBNAIL_URL"),
    ) {
        extractors.push(Box::new(Instagram::new(InstagramConfig {
            video_meta_url: meta,
            video_storage_url: storage,
            thumbnail_url: thumbnail,
            user_agent: ua.clone(),
        })));
    }
    if let (Ok(video), Ok(thumbnail)) = (
        env::var("TIKTOK_VIDEO_RESOURCE_URL"),
        env::var("TIKTOK_THUMBNAIL_RESOURCE_URL"),
    ) {
        extractors.push(Box::new(Tiktok::new(TiktokConfig {
            video_resource_url: video,
            thumbnail_resource_url: thumbnail,
            user_agent: ua.clone(),
            short_link_origin: None,
        })));
    }
    extractors.push(Box::new(Trashbox::new(TrashboxConfig::new(&ua))));

    Resolver::new(extractors)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let resolver = build_resolver();

    let mut results = Vec::new();
    for url in &args.urls {
        match resolver.parse(url).await {
            Ok(content) => results.push(json!({
                "url": url,
                "ok": true,
                "content": content,
                "error": null
            })),
            Err(err) => results.push(json!({
                "url": url,
                "ok": false,
                "content": null,
                "error": err.to_string()
            })),
        }
    }

    // Output format:
    // - Single URL and ok => emit the content object alone
    // - Otherwise emit an envelope with results and counts
    let output = if args.urls.len() == 1 {
        if let Some(first) = results.first() {
            if first.get("ok").and_then(|v| v.as_bool()) == Some(true) {
                first.get("content").cloned().unwrap_or_else(|| json!({}))
            } else {
                json!({ "results": results, "total": results.len(), "resolved": 0, "failed": 1 })
            }
        } else {
            json!({})
        }
    } else {
        let resolved = results
            .iter()
            .filter(|r| r.get("ok").and_then(|v| v.as_bool()) == Some(true))
            .count();
        let failed = results.len() - resolved;
        json!({
            "results": results,
            "total": results.len(),
            "resolved": resolved,
            "failed": failed
        })
    };

    if args.compact {
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
