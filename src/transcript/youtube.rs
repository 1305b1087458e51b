//! YouTube transcript source implementation.
//!
//! Parses a video id out of the common YouTube URL shapes, then scrapes the
//! watch page for its caption track list and downloads the English track.

use super::{FetchedTranscript, TranscriptSource};
use crate::error::{Result, SvarError};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

/// YouTube transcript source.
pub struct YoutubeTranscriptSource {
    http: reqwest::Client,
    video_id_regex: Regex,
}

/// One entry of the watch page's `captionTracks` array.
#[derive(Debug, Deserialize)]
struct CaptionTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
    #[serde(rename = "languageCode")]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl YoutubeTranscriptSource {
    pub fn new() -> Self {
        // Matches various YouTube URL formats and bare video IDs
        let video_id_regex = Regex::new(
            r"(?x)
            (?:
                (?:https?://)?
                (?:www\.)?
                (?:youtube\.com/watch\?.*?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/v/)
                ([a-zA-Z0-9_-]{11})
            )
            |
            ^([a-zA-Z0-9_-]{11})$
        ",
        )
        .expect("Invalid regex");

        Self {
            http: reqwest::Client::new(),
            video_id_regex,
        }
    }

    /// Extract the video id from a YouTube URL or bare id.
    pub fn parse_video_id(&self, input: &str) -> Option<String> {
        let caps = self.video_id_regex.captures(input.trim())?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Extract the `t=` playback offset from a URL, in seconds.
    pub fn parse_start_offset(&self, input: &str) -> Option<u64> {
        let url = Url::parse(input.trim()).ok()?;
        let value = url
            .query_pairs()
            .find(|(k, _)| k == "t")
            .map(|(_, v)| v.into_owned())?;
        value.trim_end_matches('s').parse().ok()
    }

    /// Pull the caption track list out of the watch page HTML.
    fn extract_caption_tracks(html: &str) -> Result<Vec<CaptionTrack>> {
        let marker = "\"captionTracks\":";
        let start = html.find(marker).ok_or_else(|| {
            SvarError::TranscriptUnavailable("no caption tracks on watch page".to_string())
        })? + marker.len();

        // The value is a JSON array; find its balanced closing bracket.
        let bytes = html[start..].as_bytes();
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        let mut end = None;
        for (i, &b) in bytes.iter().enumerate() {
            if escaped {
                escaped = false;
                continue;
            }
            match b {
                b'\\' if in_string => escaped = true,
                b'"' => in_string = !in_string,
                b'[' if !in_string => depth += 1,
                b']' if !in_string && depth > 0 => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i + 1);
                        break;
                    }
                }
                _ => {}
            }
        }

        let end = end.ok_or_else(|| {
            SvarError::TranscriptUnavailable("malformed caption track list".to_string())
        })?;

        let tracks: Vec<CaptionTrack> = serde_json::from_str(&html[start..start + end])?;
        Ok(tracks)
    }

    /// Pick the English track, preferring manual captions over auto-generated.
    fn select_english_track(tracks: Vec<CaptionTrack>) -> Result<CaptionTrack> {
        let mut english: Vec<CaptionTrack> = tracks
            .into_iter()
            .filter(|t| t.language_code.starts_with("en"))
            .collect();

        english.sort_by_key(|t| t.kind.as_deref() == Some("asr"));
        english.into_iter().next().ok_or_else(|| {
            SvarError::TranscriptUnavailable("no English caption track".to_string())
        })
    }

    /// Flatten a timedtext XML document into plain text.
    fn parse_timedtext(xml: &str) -> String {
        let text_re = Regex::new(r"<text[^>]*>([^<]*)</text>").expect("Invalid regex");
        let lines: Vec<String> = text_re
            .captures_iter(xml)
            .map(|c| decode_entities(&c[1]))
            .filter(|line| !line.trim().is_empty())
            .collect();
        lines.join(" ")
    }
}

impl Default for YoutubeTranscriptSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptSource {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<FetchedTranscript> {
        let video_id = self
            .parse_video_id(url)
            .ok_or_else(|| SvarError::InvalidUrl(format!("no video id found in '{}'", url)))?;
        let start_offset_seconds = self.parse_start_offset(url);

        info!("Fetching transcript for video {}", video_id);

        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        let html = self
            .http
            .get(&watch_url)
            .header("Accept-Language", "en-US")
            .send()
            .await?
            .error_for_status()
            .map_err(|e| SvarError::TranscriptUnavailable(format!("watch page: {}", e)))?
            .text()
            .await?;

        let tracks = Self::extract_caption_tracks(&html)?;
        debug!("Found {} caption track(s)", tracks.len());
        let track = Self::select_english_track(tracks)?;

        let xml = self
            .http
            .get(&track.base_url)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| SvarError::TranscriptUnavailable(format!("caption track: {}", e)))?
            .text()
            .await?;

        let text = Self::parse_timedtext(&xml);
        if text.is_empty() {
            return Err(SvarError::TranscriptUnavailable(format!(
                "caption track for {} is empty",
                video_id
            )));
        }

        info!("Fetched transcript ({} characters)", text.len());

        Ok(FetchedTranscript {
            video_id,
            text,
            start_offset_seconds,
        })
    }
}

/// Decode the XML entities that appear in timedtext payloads.
fn decode_entities(text: &str) -> String {
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_video_id_from_urls() {
        let source = YoutubeTranscriptSource::new();

        let cases = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "dQw4w9WgXcQ",
        ];

        for case in cases {
            assert_eq!(
                source.parse_video_id(case).as_deref(),
                Some("dQw4w9WgXcQ"),
                "failed for {}",
                case
            );
        }
    }

    #[test]
    fn test_parse_video_id_rejects_garbage() {
        let source = YoutubeTranscriptSource::new();
        assert!(source.parse_video_id("https://example.com/watch?v=short").is_none());
        assert!(source.parse_video_id("not a url").is_none());
    }

    #[test]
    fn test_parse_start_offset() {
        let source = YoutubeTranscriptSource::new();
        assert_eq!(
            source.parse_start_offset("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=90s"),
            Some(90)
        );
        assert_eq!(
            source.parse_start_offset("https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=90"),
            Some(90)
        );
        assert_eq!(
            source.parse_start_offset("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            None
        );
    }

    #[test]
    fn test_extract_caption_tracks() {
        let html = r#"junk"captionTracks":[{"baseUrl":"https://example.com/tt?a=[1]","languageCode":"en","kind":"asr"},{"baseUrl":"https://example.com/tt2","languageCode":"de"}]more junk"#;
        let tracks = YoutubeTranscriptSource::extract_caption_tracks(html).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].language_code, "en");
    }

    #[test]
    fn test_extract_caption_tracks_missing() {
        let result = YoutubeTranscriptSource::extract_caption_tracks("<html></html>");
        assert!(matches!(result, Err(SvarError::TranscriptUnavailable(_))));
    }

    #[test]
    fn test_select_prefers_manual_english_track() {
        let tracks = vec![
            CaptionTrack {
                base_url: "auto".to_string(),
                language_code: "en".to_string(),
                kind: Some("asr".to_string()),
            },
            CaptionTrack {
                base_url: "manual".to_string(),
                language_code: "en-GB".to_string(),
                kind: None,
            },
        ];
        let track = YoutubeTranscriptSource::select_english_track(tracks).unwrap();
        assert_eq!(track.base_url, "manual");
    }

    #[test]
    fn test_select_rejects_non_english() {
        let tracks = vec![CaptionTrack {
            base_url: "x".to_string(),
            language_code: "de".to_string(),
            kind: None,
        }];
        assert!(matches!(
            YoutubeTranscriptSource::select_english_track(tracks),
            Err(SvarError::TranscriptUnavailable(_))
        ));
    }

    #[test]
    fn test_parse_timedtext() {
        let xml = r#"<?xml version="1.0"?><transcript>
            <text start="0.0" dur="2.5">The cat sat</text>
            <text start="2.5" dur="2.0">on the mat &amp; purred</text>
            <text start="4.5" dur="1.0"> </text>
        </transcript>"#;
        assert_eq!(
            YoutubeTranscriptSource::parse_timedtext(xml),
            "The cat sat on the mat & purred"
        );
    }
}
