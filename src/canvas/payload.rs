use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CanvasKind {
    #[default]
    None,
    JobSearch,
    Roadmap,
    SessionSearch,
    Unknown(String),
}

impl CanvasKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "none",
            Self::JobSearch => "job_search",
            Self::Roadmap => "roadmap",
            Self::SessionSearch => "session_search",
            Self::Unknown(kind) => kind.as_str(),
        }
    }

    pub fn has_content(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for CanvasKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for CanvasKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CanvasKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(match raw.as_deref() {
            None | Some("") | Some("none") => Self::None,
            Some("job_search") => Self::JobSearch,
            Some("roadmap") => Self::Roadmap,
            Some("session_search") => Self::SessionSearch,
            Some(other) => Self::Unknown(other.to_string()),
        })
    }
}

/// Structured content attached to a message. The payload is kept as raw JSON
/// until a renderer mounts it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Canvas {
    pub kind: CanvasKind,
    pub payload: Value,
}

impl Canvas {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(kind: CanvasKind, payload: Option<Value>) -> Self {
        if !kind.has_content() {
            return Self::none();
        }
        Self {
            kind,
            payload: payload.unwrap_or(Value::Null),
        }
    }

    pub fn has_content(&self) -> bool {
        self.kind.has_content()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobSearchPayload {
    #[serde(default)]
    pub job_link: Option<String>,
    #[serde(default)]
    pub job_api: Option<String>,
    #[serde(default)]
    pub job_results: Option<Vec<JobListing>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JobListing {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub location_name: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub platform_job_url: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl JobListing {
    pub fn link(&self) -> Option<&str> {
        self.platform_job_url.as_deref().or(self.url.as_deref())
    }

    pub fn platform_name(&self) -> &str {
        self.platform.as_deref().unwrap_or("herkey")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RoadmapPayload {
    #[serde(default)]
    pub roadmap: Vec<RoadmapStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadmapStep {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub calendar_event: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionSearchPayload {
    #[serde(default)]
    pub session_link: Option<String>,
    #[serde(default)]
    pub session_api: Option<String>,
    #[serde(default)]
    pub session_results: Option<Vec<Value>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionListing {
    pub topic: String,
    pub starts_at: Option<String>,
    pub link: String,
}

pub const SESSIONS_HOME_URL: &str = "https://www.herkey.com/sessions";

impl SessionSearchPayload {
    /// Session records come straight from the sessions API, so only the fields
    /// the list shows are pulled out and everything else is ignored.
    pub fn listings(&self) -> Vec<SessionListing> {
        let Some(results) = &self.session_results else {
            return Vec::new();
        };

        results
            .iter()
            .filter_map(|record| {
                let content = record.get("post_content")?;
                let topic = content.get("post_topic_text")?.as_str()?.to_string();
                let starts_at = content
                    .get("discussion_start_date_time")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let link = record
                    .get("post_info")
                    .and_then(|info| info.get("post_id"))
                    .and_then(Value::as_str)
                    .map(|post_id| format!("{SESSIONS_HOME_URL}/{post_id}"))
                    .unwrap_or_else(|| SESSIONS_HOME_URL.to_string());
                Some(SessionListing {
                    topic,
                    starts_at,
                    link,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn canvas_kind_reads_known_and_unknown_tags() {
        let kinds: Vec<CanvasKind> =
            serde_json::from_value(json!(["none", "job_search", "roadmap", "sessions", null]))
                .expect("canvas kinds should parse");
        assert_eq!(
            kinds,
            vec![
                CanvasKind::None,
                CanvasKind::JobSearch,
                CanvasKind::Roadmap,
                CanvasKind::Unknown("sessions".to_string()),
                CanvasKind::None,
            ]
        );
        assert!(kinds[3].has_content());
    }

    #[test]
    fn canvas_without_content_drops_payload() {
        let canvas = Canvas::new(CanvasKind::None, Some(json!({ "job_link": "x" })));
        assert_eq!(canvas, Canvas::none());
    }

    #[test]
    fn session_listings_skip_records_without_topic() {
        let payload: SessionSearchPayload = serde_json::from_value(json!({
            "session_link": "https://example.test/sessions",
            "session_results": [
                {
                    "post_info": { "post_id": "42" },
                    "post_content": {
                        "post_topic_text": "Negotiating your first offer",
                        "discussion_start_date_time": "2025-05-01T10:00:00"
                    }
                },
                { "post_content": {} }
            ]
        }))
        .expect("session payload should parse");

        let listings = payload.listings();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].topic, "Negotiating your first offer");
        assert_eq!(listings[0].link, "https://www.herkey.com/sessions/42");
    }
}
