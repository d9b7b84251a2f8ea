// ABOUTME: Source extractors, one per origin site, plus shared fetch helpers.
// ABOUTME: Each extractor maps one class of URL onto the content model.

pub mod cmtt;
pub mod habr;
pub mod instagram;
pub mod reddit;
pub mod tiktok;
pub mod trashbox;
pub mod twitter;
pub mod vk;
pub mod youtube;

use serde::de::DeserializeOwned;

use crate::error::ResolveError;

/// Build the per-extractor HTTP client with the configured identifying
/// user-agent. Extractors are long-lived; the client is built once.
pub(crate) fn http_client(user_agent: &str) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .build()
        .expect("failed to build HTTP client")
}

/// GET a JSON endpoint. Non-success status or an undeserializable body is
/// an upstream failure; there is no retry.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T, ResolveError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(ResolveError::transport)?;
    if !resp.status().is_success() {
        return Err(ResolveError::status(url, resp.status()));
    }
    resp.json::<T>().await.map_err(ResolveError::malformed)
}

/// GET a page or raw-text endpoint.
pub(crate) async fn get_text(client: &reqwest::Client, url: &str) -> Result<String, ResolveError> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(ResolveError::transport)?;
    if !resp.status().is_success() {
        return Err(ResolveError::status(url, resp.status()));
    }
    resp.text().await.map_err(ResolveError::transport)
}

/// Fill successive `{}` placeholders in a configured URL template.
pub(crate) fn fill_template(template: &str, args: &[&str]) -> String {
    let mut out = template.to_string();
    for arg in args {
        out = out.replacen("{}", arg, 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::fill_template;
    use pretty_assertions::assert_eq;

    #[test]
    fn fill_template_replaces_in_order() {
        assert_eq!(
            fill_template("https://cdn.example.com/{}/{}.mp4", &["reel", "abc"]),
            "https://cdn.example.com/reel/abc.mp4"
        );
    }

    #[test]
    fn fill_template_leaves_extra_placeholders() {
        assert_eq!(fill_template("{}/{}", &["a"]), "a/{}");
    }
}
