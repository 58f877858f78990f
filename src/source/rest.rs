//! REST stats source for WordPress.com-style APIs.
//!
//! Each [`SectionId`] maps to one endpoint.  Decoding is done by pure
//! functions over the raw body so tests can exercise it without the network.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::{LatestPost, LatestPostModel, Payload, RemoteData, StatsSource};
use crate::error::StatsError;
use crate::section::SectionId;

/// Upper bound for a single request, connection included.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Fields requested for the latest-post summary.
const SUMMARY_FIELDS: &str = "ID,title,URL,discussion,like_count,date";

/// A stats source backed by the REST API of one site.
pub struct RestSource {
    client: reqwest::Client,
    api_base: Url,
    site: String,
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostsResponse {
    #[serde(default)]
    found: u64,
    #[serde(default)]
    posts: Vec<PostJson>,
}

#[derive(Debug, Deserialize)]
struct PostJson {
    #[serde(rename = "ID")]
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(rename = "URL", default)]
    url: String,
    date: Option<String>,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    discussion: Discussion,
}

#[derive(Debug, Default, Deserialize)]
struct Discussion {
    #[serde(default)]
    comment_count: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    message: String,
}

impl RestSource {
    /// Create a source for `site` (numeric id or domain).
    pub fn new(
        api_base: Url,
        site: impl Into<String>,
        token: Option<String>,
    ) -> Result<Self, StatsError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            api_base,
            site: site.into(),
            token,
        })
    }

    /// Build the endpoint URL for a section.
    ///
    /// Returns `Ok(None)` when the section needs a post id and none was given.
    pub fn endpoint(&self, section: SectionId, post_id: Option<u64>) -> Result<Option<Url>, StatsError> {
        let mut url = self.api_base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| StatsError::Transport(format!("unusable API base `{}`", self.api_base)))?;
            segments.pop_if_empty().push("sites").push(&self.site);
            match section {
                SectionId::InsightsLatestPostSummary => {
                    segments.push("posts");
                }
                SectionId::InsightsLatestPostViews => {
                    let Some(id) = post_id else {
                        return Ok(None);
                    };
                    let id = id.to_string();
                    segments.extend(["stats", "post", id.as_str()]);
                }
                SectionId::InsightsToday => {
                    segments.extend(["stats", "summary"]);
                }
            }
        }

        match section {
            SectionId::InsightsLatestPostSummary => {
                url.query_pairs_mut()
                    .append_pair("order_by", "date")
                    .append_pair("number", "1")
                    .append_pair("status", "publish")
                    .append_pair("fields", SUMMARY_FIELDS);
            }
            SectionId::InsightsLatestPostViews => {
                url.query_pairs_mut().append_pair("fields", "views");
            }
            SectionId::InsightsToday => {}
        }
        Ok(Some(url))
    }

    /// Decode a posts listing into a latest-post model.
    pub fn decode_latest_post(site: &str, body: &[u8]) -> Payload {
        let response: PostsResponse = match serde_json::from_slice(body) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "undecodable latest post summary");
                return Payload::Null;
            }
        };

        let model = match response.posts.into_iter().next() {
            Some(post) if response.found > 0 => {
                // Dates come back as RFC 3339; degrade to None on failure.
                let published = post
                    .date
                    .as_deref()
                    .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
                    .map(|dt| dt.with_timezone(&Utc));

                LatestPostModel::available(
                    site,
                    LatestPost {
                        post_id: post.id,
                        title: post.title,
                        url: post.url,
                        published,
                        views: None,
                        likes: post.like_count,
                        comments: post.discussion.comment_count,
                    },
                )
            }
            _ => LatestPostModel::unavailable(site),
        };
        debug!(
            available = model.is_latest_post_available(),
            "decoded latest post summary"
        );
        Payload::Data(RemoteData::LatestPost(model))
    }

    /// Decode a single post's view count.
    pub fn decode_views(body: &[u8]) -> Payload {
        let value: serde_json::Value = match serde_json::from_slice(body) {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "undecodable post views");
                return Payload::Null;
            }
        };
        value
            .get("views")
            .and_then(serde_json::Value::as_i64)
            .map_or(Payload::Null, Payload::Integer)
    }

    /// Pass a JSON object through undecoded.
    pub fn decode_object(body: &[u8]) -> Payload {
        match serde_json::from_slice::<serde_json::Value>(body) {
            Ok(value) if value.is_object() => Payload::Data(RemoteData::Other(value)),
            _ => Payload::Null,
        }
    }

    /// Turn a non-success response into a domain error.
    pub fn decode_error(status: u16, body: &[u8]) -> StatsError {
        match serde_json::from_slice::<ErrorBody>(body) {
            Ok(err) => StatsError::Domain {
                code: err.error,
                message: err.message,
            },
            Err(_) => StatsError::Domain {
                code: format!("http_{status}"),
                message: String::from_utf8_lossy(body).trim().to_string(),
            },
        }
    }
}

#[async_trait]
impl StatsSource for RestSource {
    fn name(&self) -> &str {
        &self.site
    }

    async fn fetch(&self, section: SectionId, post_id: Option<u64>) -> Result<Payload, StatsError> {
        let Some(url) = self.endpoint(section, post_id)? else {
            warn!(%section, "section requires a post id");
            return Ok(Payload::Null);
        };
        debug!(%section, %url, "fetching section");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(Self::decode_error(status.as_u16(), &body));
        }

        Ok(match section {
            SectionId::InsightsLatestPostSummary => Self::decode_latest_post(&self.site, &body),
            SectionId::InsightsLatestPostViews => Self::decode_views(&body),
            SectionId::InsightsToday => Self::decode_object(&body),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> RestSource {
        let base = Url::parse("https://public-api.wordpress.com/rest/v1.1").unwrap();
        RestSource::new(base, "example.blog", None).unwrap()
    }

    fn latest_post(payload: Payload) -> LatestPostModel {
        match payload {
            Payload::Data(RemoteData::LatestPost(model)) => model,
            other => panic!("expected a latest post model, got {other:?}"),
        }
    }

    #[test]
    fn summary_endpoint_asks_for_one_published_post() {
        let url = source()
            .endpoint(SectionId::InsightsLatestPostSummary, None)
            .unwrap()
            .unwrap();

        assert_eq!(url.path(), "/rest/v1.1/sites/example.blog/posts");
        let query = url.query().unwrap();
        assert!(query.contains("number=1"));
        assert!(query.contains("status=publish"));
        assert!(query.contains("order_by=date"));
    }

    #[test]
    fn views_endpoint_is_scoped_to_post() {
        let url = source()
            .endpoint(SectionId::InsightsLatestPostViews, Some(77))
            .unwrap()
            .unwrap();
        assert_eq!(url.path(), "/rest/v1.1/sites/example.blog/stats/post/77");
        assert_eq!(url.query(), Some("fields=views"));
    }

    #[test]
    fn views_endpoint_without_post_id_is_none() {
        let url = source()
            .endpoint(SectionId::InsightsLatestPostViews, None)
            .unwrap();
        assert!(url.is_none());
    }

    #[test]
    fn today_endpoint() {
        let url = source()
            .endpoint(SectionId::InsightsToday, None)
            .unwrap()
            .unwrap();
        assert_eq!(url.path(), "/rest/v1.1/sites/example.blog/stats/summary");
    }

    #[test]
    fn decode_latest_post_extracts_fields() {
        let body = br#"{
            "found": 12,
            "posts": [{
                "ID": 77,
                "title": "Hello world",
                "URL": "https://example.blog/hello-world",
                "date": "2024-01-02T12:00:00+00:00",
                "like_count": 4,
                "discussion": { "comment_count": 1 }
            }]
        }"#;

        let model = latest_post(RestSource::decode_latest_post("example.blog", body));
        assert_eq!(model.blog_id, "example.blog");

        let post = model.post.unwrap();
        assert_eq!(post.post_id, 77);
        assert_eq!(post.title, "Hello world");
        assert_eq!(post.url, "https://example.blog/hello-world");
        assert_eq!(post.likes, 4);
        assert_eq!(post.comments, 1);
        assert!(post.published.is_some());
        assert_eq!(post.views, None, "views are never part of the summary");
    }

    #[test]
    fn decode_latest_post_without_posts_is_unavailable() {
        let body = br#"{ "found": 0, "posts": [] }"#;
        let model = latest_post(RestSource::decode_latest_post("example.blog", body));
        assert!(!model.is_latest_post_available());
    }

    #[test]
    fn decode_latest_post_tolerates_bad_date() {
        let body = br#"{ "found": 1, "posts": [{ "ID": 1, "date": "yesterday" }] }"#;
        let post = latest_post(RestSource::decode_latest_post("s", body)).post.unwrap();
        assert!(post.published.is_none());
        assert_eq!(post.comments, 0);
    }

    #[test]
    fn decode_latest_post_garbage_is_null() {
        assert_eq!(RestSource::decode_latest_post("s", b"<html>"), Payload::Null);
    }

    #[test]
    fn decode_views_reads_integer() {
        assert_eq!(RestSource::decode_views(br#"{"views": 42}"#), Payload::Integer(42));
    }

    #[test]
    fn decode_views_missing_or_wrong_type_is_null() {
        assert_eq!(RestSource::decode_views(br#"{}"#), Payload::Null);
        assert_eq!(RestSource::decode_views(br#"{"views": "many"}"#), Payload::Null);
        assert_eq!(RestSource::decode_views(b"not json"), Payload::Null);
    }

    #[test]
    fn decode_object_passes_json_through() {
        let payload = RestSource::decode_object(br#"{"views": 10, "visitors": 3}"#);
        match payload {
            Payload::Data(RemoteData::Other(value)) => assert_eq!(value["visitors"], 3),
            other => panic!("unexpected payload {other:?}"),
        }
        assert_eq!(RestSource::decode_object(b"[1, 2]"), Payload::Null);
    }

    #[test]
    fn decode_error_uses_structured_body() {
        let err = RestSource::decode_error(
            403,
            br#"{"error": "unauthorized", "message": "Login required"}"#,
        );
        assert_eq!(
            err,
            StatsError::Domain {
                code: "unauthorized".into(),
                message: "Login required".into()
            }
        );
    }

    #[test]
    fn decode_error_falls_back_to_status() {
        let err = RestSource::decode_error(502, b" Bad Gateway \n");
        assert_eq!(
            err,
            StatsError::Domain {
                code: "http_502".into(),
                message: "Bad Gateway".into()
            }
        );
    }

    #[test]
    fn name_returns_site() {
        assert_eq!(source().name(), "example.blog");
    }
}
