// YouTube Music search through the innertube API (WEB_REMIX client)

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use serde_json::{json, Value};
use tracing::debug;

use super::{SearchClient, SearchError, SearchItem};
use crate::downloader::strategy::WEB_USER_AGENT;
use crate::thumbnail::Thumbnail;

const SEARCH_URL: &str = "https://music.youtube.com/youtubei/v1/search?alt=json";
const CLIENT_NAME: &str = "WEB_REMIX";
const CLIENT_VERSION: &str = "1.20240101.01.00";
/// `filter=songs` as encoded by the YouTube Music web app
const SONGS_FILTER_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const ARTIST_PAGE: &str = "MUSIC_PAGE_TYPE_ARTIST";
const ALBUM_PAGE: &str = "MUSIC_PAGE_TYPE_ALBUM";

lazy_static::lazy_static! {
    static ref DURATION_RE: Regex = Regex::new(r"^\d+(:\d{2})+$").unwrap();
}

pub struct YtMusicClient {
    client: reqwest::Client,
}

impl YtMusicClient {
    pub fn new(proxy: Option<&str>) -> Result<Self, SearchError> {
        let mut builder = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(Self::default_headers());

        if let Some(proxy_url) = proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy_url)?);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    fn default_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(WEB_USER_AGENT));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, HeaderValue::from_static("https://music.youtube.com"));
        headers.insert(REFERER, HeaderValue::from_static("https://music.youtube.com/"));
        headers
    }

    fn request_body(query: &str) -> Value {
        json!({
            "context": {
                "client": {
                    "clientName": CLIENT_NAME,
                    "clientVersion": CLIENT_VERSION,
                    "hl": "en",
                    "gl": "US",
                },
                "user": {},
            },
            "query": query,
            "params": SONGS_FILTER_PARAMS,
        })
    }
}

#[async_trait]
impl SearchClient for YtMusicClient {
    async fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<SearchItem>, SearchError> {
        debug!("[YtMusic] searching songs for {:?}", query);

        let response = self
            .client
            .post(SEARCH_URL)
            .json(&Self::request_body(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::HttpStatus {
                status: status.as_u16(),
                url: SEARCH_URL.to_string(),
            });
        }

        let body: Value = response.json().await?;
        let mut items = parse_search_response(&body)?;
        items.truncate(limit);
        Ok(items)
    }
}

/// Collect song rows from every music shelf in the response
pub(crate) fn parse_search_response(body: &Value) -> Result<Vec<SearchItem>, SearchError> {
    let tabbed = &body["contents"]["tabbedSearchResultsRenderer"]["tabs"][0]["tabRenderer"]
        ["content"]["sectionListRenderer"]["contents"];
    // Responses for a filtered search sometimes drop the tab wrapper
    let sections = tabbed
        .as_array()
        .or_else(|| body["contents"]["sectionListRenderer"]["contents"].as_array())
        .ok_or_else(|| SearchError::Parse("no result sections in response".to_string()))?;

    let items = sections
        .iter()
        .filter_map(|section| section["musicShelfRenderer"]["contents"].as_array())
        .flatten()
        .filter_map(|entry| entry.get("musicResponsiveListItemRenderer"))
        .map(parse_item)
        .collect();

    Ok(items)
}

fn runs(column: &Value) -> &[Value] {
    column["musicResponsiveListItemFlexColumnRenderer"]["text"]["runs"]
        .as_array()
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn is_separator(text: &str) -> bool {
    matches!(text.trim(), "" | "•" | "&" | ",")
}

fn parse_item(renderer: &Value) -> SearchItem {
    let columns = renderer["flexColumns"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    let mut item = SearchItem::default();

    if let Some(title_run) = columns.first().and_then(|c| runs(c).first()) {
        item.title = title_run["text"].as_str().map(str::to_string);
        item.video_id = title_run["navigationEndpoint"]["watchEndpoint"]["videoId"]
            .as_str()
            .map(str::to_string);
    }

    if let Some(id) = renderer["playlistItemData"]["videoId"].as_str() {
        item.video_id = Some(id.to_string());
    }

    if item.video_id.is_none() {
        item.video_id = renderer["overlay"]["musicItemThumbnailOverlayRenderer"]["content"]
            ["musicPlayButtonRenderer"]["playNavigationEndpoint"]["watchEndpoint"]["videoId"]
            .as_str()
            .map(str::to_string);
    }

    for run in columns.get(1).map(runs).unwrap_or(&[]) {
        let text = run["text"].as_str().unwrap_or("");
        if is_separator(text) {
            continue;
        }

        let page_type = run["navigationEndpoint"]["browseEndpoint"]
            ["browseEndpointContextSupportedConfigs"]["browseEndpointContextMusicConfig"]["pageType"]
            .as_str();

        match page_type {
            Some(ARTIST_PAGE) => item.artists.push(text.to_string()),
            Some(ALBUM_PAGE) => item.album = Some(text.to_string()),
            _ if DURATION_RE.is_match(text.trim()) => item.duration = Some(text.trim().to_string()),
            // Unlinked artist names show up before the album
            None if item.album.is_none() && item.duration.is_none() => {
                item.artists.push(text.to_string())
            }
            _ => {}
        }
    }

    if item.duration.is_none() {
        item.duration = renderer["fixedColumns"][0]["musicResponsiveListItemFixedColumnRenderer"]
            ["text"]["runs"][0]["text"]
            .as_str()
            .map(str::to_string);
    }

    item.thumbnails = serde_json::from_value::<Vec<Thumbnail>>(
        renderer["thumbnail"]["musicThumbnailRenderer"]["thumbnail"]["thumbnails"].clone(),
    )
    .unwrap_or_default();

    item
}

#[cfg(test)]
mod tests {
    use super::*;

    fn browse_run(text: &str, page_type: &str) -> Value {
        json!({
            "text": text,
            "navigationEndpoint": {
                "browseEndpoint": {
                    "browseId": "UC123",
                    "browseEndpointContextSupportedConfigs": {
                        "browseEndpointContextMusicConfig": { "pageType": page_type }
                    }
                }
            }
        })
    }

    fn song_row(title: &str, video_id: &str, second_column: Vec<Value>) -> Value {
        json!({
            "musicResponsiveListItemRenderer": {
                "thumbnail": { "musicThumbnailRenderer": { "thumbnail": { "thumbnails": [
                    { "url": "https://lh3.googleusercontent.com/t=w60-h60-l90-rj", "width": 60, "height": 60 },
                    { "url": "https://lh3.googleusercontent.com/t=w120-h120-l90-rj", "width": 120, "height": 120 }
                ]}}},
                "flexColumns": [
                    { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": [
                        { "text": title, "navigationEndpoint": { "watchEndpoint": { "videoId": video_id } } }
                    ]}}},
                    { "musicResponsiveListItemFlexColumnRenderer": { "text": { "runs": second_column }}}
                ],
                "playlistItemData": { "videoId": video_id }
            }
        })
    }

    fn response(rows: Vec<Value>) -> Value {
        json!({
            "contents": { "tabbedSearchResultsRenderer": { "tabs": [ { "tabRenderer": { "content": {
                "sectionListRenderer": { "contents": [
                    { "itemSectionRenderer": { "contents": [] } },
                    { "musicShelfRenderer": { "contents": rows } }
                ]}
            }}}]}}
        })
    }

    #[test]
    fn parses_song_rows() {
        let body = response(vec![song_row(
            "Under Pressure",
            "a01QQZyl-_I",
            vec![
                browse_run("Queen", ARTIST_PAGE),
                json!({ "text": " & " }),
                browse_run("David Bowie", ARTIST_PAGE),
                json!({ "text": " • " }),
                browse_run("Hot Space", ALBUM_PAGE),
                json!({ "text": " • " }),
                json!({ "text": "4:08" }),
            ],
        )]);

        let items = parse_search_response(&body).unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title.as_deref(), Some("Under Pressure"));
        assert_eq!(item.video_id.as_deref(), Some("a01QQZyl-_I"));
        assert_eq!(item.artists, vec!["Queen", "David Bowie"]);
        assert_eq!(item.album.as_deref(), Some("Hot Space"));
        assert_eq!(item.duration.as_deref(), Some("4:08"));
        assert_eq!(item.thumbnails.len(), 2);
    }

    #[test]
    fn unlinked_artist_and_missing_album() {
        let body = response(vec![song_row(
            "Demo",
            "xyz",
            vec![json!({ "text": "Some Band" }), json!({ "text": " • " }), json!({ "text": "1:02:03" })],
        )]);

        let item = &parse_search_response(&body).unwrap()[0];
        assert_eq!(item.artists, vec!["Some Band"]);
        assert!(item.album.is_none());
        assert_eq!(item.duration.as_deref(), Some("1:02:03"));
    }

    #[test]
    fn untabbed_section_list_is_accepted() {
        let body = json!({
            "contents": { "sectionListRenderer": { "contents": [
                { "musicShelfRenderer": { "contents": [song_row(
                    "Demo",
                    "xyz",
                    vec![browse_run("Some Band", ARTIST_PAGE)],
                )] } }
            ]}}
        });

        let items = parse_search_response(&body).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].video_id.as_deref(), Some("xyz"));
        assert_eq!(items[0].artists, vec!["Some Band"]);
    }

    #[test]
    fn no_results_section_yields_empty_list() {
        let body = json!({
            "contents": { "tabbedSearchResultsRenderer": { "tabs": [ { "tabRenderer": { "content": {
                "sectionListRenderer": { "contents": [
                    { "itemSectionRenderer": { "contents": [
                        { "messageRenderer": { "text": { "runs": [ { "text": "No results found" } ] } } }
                    ] } }
                ]}
            }}}]}}
        });

        assert!(parse_search_response(&body).unwrap().is_empty());
    }

    #[test]
    fn response_without_sections_is_a_parse_error() {
        let err = parse_search_response(&json!({ "contents": {} })).unwrap_err();
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn request_body_uses_songs_filter() {
        let body = YtMusicClient::request_body("bohemian rhapsody");
        assert_eq!(body["query"], "bohemian rhapsody");
        assert_eq!(body["params"], SONGS_FILTER_PARAMS);
        assert_eq!(body["context"]["client"]["clientName"], "WEB_REMIX");
    }
}
