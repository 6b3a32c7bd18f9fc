use crate::canvas::payload::{Canvas, CanvasKind, SESSIONS_HOME_URL};
use crate::chat::NewMessage;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::watch;

pub const EVENTS_WELCOME: &str =
    "Welcome to the Event Hub! Here are upcoming sessions, workshops and meetups picked for you.";
pub const ROADMAP_WELCOME: &str =
    "Here's a starter career roadmap. Ask me to tailor any step to your goals.";
const SESSIONS_API: &str = "https://api-prod.herkey.com/api/v1/herkey/sessions/get-sessions";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKey {
    Jobs,
    Events,
    Roadmap,
    #[default]
    Unset,
}

impl ViewKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jobs => "jobs",
            Self::Events => "events",
            Self::Roadmap => "roadmap",
            Self::Unset => "unset",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Jobs => "Job Hunt",
            Self::Events => "Event Hub",
            Self::Roadmap => "My Roadmap",
            Self::Unset => "Chat",
        }
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ViewKey {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "jobs" => Ok(Self::Jobs),
            "events" => Ok(Self::Events),
            "roadmap" => Ok(Self::Roadmap),
            "" | "unset" => Ok(Self::Unset),
            other => Err(format!("unknown view: {other}")),
        }
    }
}

/// Write side of the requested-view channel. Cheap to clone and hand to any
/// part of the app that navigates.
#[derive(Debug, Clone)]
pub struct ViewSignal {
    tx: Arc<watch::Sender<ViewKey>>,
}

impl ViewSignal {
    pub fn new(initial: ViewKey) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn request(&self, view: ViewKey) {
        tracing::debug!(%view, "view requested");
        self.tx.send_replace(view);
    }

    pub fn subscribe(&self) -> ViewWatcher {
        ViewWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug)]
pub struct ViewWatcher {
    rx: watch::Receiver<ViewKey>,
}

impl ViewWatcher {
    /// Returns the latest request if one arrived since the last call.
    pub fn poll(&mut self) -> Option<ViewKey> {
        match self.rx.has_changed() {
            Ok(true) => Some(*self.rx.borrow_and_update()),
            Ok(false) | Err(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpeningPanel {
    Closed,
    Open,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewPlan {
    Seed {
        message: NewMessage,
        panel: OpeningPanel,
    },
    LoadHistory,
}

/// Turns view requests into opening states, once per distinct view.
#[derive(Debug, Default)]
pub struct ViewDispatcher {
    applied: Option<ViewKey>,
}

impl ViewDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&mut self, view: ViewKey) -> Option<ViewPlan> {
        if self.applied == Some(view) {
            return None;
        }
        self.applied = Some(view);
        tracing::info!(%view, "switching view");

        Some(match view {
            ViewKey::Events => ViewPlan::Seed {
                message: events_opening(),
                panel: OpeningPanel::Closed,
            },
            ViewKey::Roadmap => ViewPlan::Seed {
                message: roadmap_opening(),
                panel: OpeningPanel::Open,
            },
            ViewKey::Jobs | ViewKey::Unset => ViewPlan::LoadHistory,
        })
    }
}

fn events_opening() -> NewMessage {
    NewMessage::assistant(EVENTS_WELCOME).with_canvas(Canvas::new(
        CanvasKind::SessionSearch,
        Some(json!({
            "session_link": SESSIONS_HOME_URL,
            "session_api": SESSIONS_API,
        })),
    ))
}

fn roadmap_opening() -> NewMessage {
    NewMessage::assistant(ROADMAP_WELCOME).with_canvas(Canvas::new(
        CanvasKind::Roadmap,
        Some(json!({
            "roadmap": [
                {
                    "title": "Take stock of your skills",
                    "description": "List the skills you use today and the ones your target role asks for.",
                    "link": "https://www.herkey.com/skills"
                },
                {
                    "title": "Close one skill gap",
                    "description": "Pick a short course or certification for the most requested missing skill.",
                    "link": "https://www.herkey.com/learning"
                },
                {
                    "title": "Join a community session",
                    "description": "Attend a session in your field to meet people already doing the job.",
                    "link": SESSIONS_HOME_URL
                },
                {
                    "title": "Refresh your resume and apply",
                    "description": "Update your resume with the new skill and apply to three matching roles.",
                    "link": "https://www.herkey.com/jobs"
                }
            ]
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_view_keys() {
        assert_eq!("events".parse::<ViewKey>(), Ok(ViewKey::Events));
        assert_eq!(" Roadmap ".parse::<ViewKey>(), Ok(ViewKey::Roadmap));
        assert_eq!("".parse::<ViewKey>(), Ok(ViewKey::Unset));
        assert!("calendar".parse::<ViewKey>().is_err());
    }

    #[test]
    fn repeated_view_is_dispatched_once() {
        let mut dispatcher = ViewDispatcher::new();
        assert!(dispatcher.dispatch(ViewKey::Events).is_some());
        assert!(dispatcher.dispatch(ViewKey::Events).is_none());
        assert!(dispatcher.dispatch(ViewKey::Roadmap).is_some());
        assert!(dispatcher.dispatch(ViewKey::Events).is_some());
    }

    #[test]
    fn roadmap_seeds_open_panel_and_jobs_loads_history() {
        let mut dispatcher = ViewDispatcher::new();
        let Some(ViewPlan::Seed { message, panel }) = dispatcher.dispatch(ViewKey::Roadmap) else {
            panic!("roadmap should seed a message");
        };
        assert_eq!(panel, OpeningPanel::Open);
        assert_eq!(message.canvas.kind, CanvasKind::Roadmap);

        assert_eq!(dispatcher.dispatch(ViewKey::Jobs), Some(ViewPlan::LoadHistory));
    }

    #[test]
    fn watcher_sees_only_new_requests() {
        let signal = ViewSignal::new(ViewKey::Unset);
        let mut watcher = signal.subscribe();
        assert_eq!(watcher.poll(), None);

        signal.request(ViewKey::Events);
        assert_eq!(watcher.poll(), Some(ViewKey::Events));
        assert_eq!(watcher.poll(), None);

        signal.request(ViewKey::Events);
        assert_eq!(watcher.poll(), Some(ViewKey::Events));
    }
}
