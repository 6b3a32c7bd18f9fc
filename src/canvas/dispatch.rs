use crate::canvas::payload::{
    Canvas, CanvasKind, JobSearchPayload, RoadmapPayload, SessionSearchPayload,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// What the panel paints for one mounted message.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasView {
    Jobs(JobSearchPayload),
    Roadmap(RoadmapPayload),
    Sessions(SessionSearchPayload),
    Unreadable { kind: String, reason: String },
    Fallback { kind: String },
}

impl CanvasView {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Jobs(_) => "Job Search",
            Self::Roadmap(_) => "Career Roadmap",
            Self::Sessions(_) => "Event Hub",
            Self::Unreadable { .. } | Self::Fallback { .. } => "Canvas",
        }
    }
}

/// Maps a canvas to its renderer. `None` when there is nothing to paint.
pub fn resolve(canvas: &Canvas) -> Option<CanvasView> {
    let view = match &canvas.kind {
        CanvasKind::None => return None,
        CanvasKind::JobSearch => decode(&canvas.kind, &canvas.payload, CanvasView::Jobs),
        CanvasKind::Roadmap => decode(&canvas.kind, &canvas.payload, CanvasView::Roadmap),
        CanvasKind::SessionSearch => decode(&canvas.kind, &canvas.payload, CanvasView::Sessions),
        CanvasKind::Unknown(kind) => CanvasView::Fallback { kind: kind.clone() },
    };
    Some(view)
}

fn decode<T: DeserializeOwned + Default>(
    kind: &CanvasKind,
    payload: &Value,
    wrap: fn(T) -> CanvasView,
) -> CanvasView {
    if payload.is_null() {
        return wrap(T::default());
    }
    match serde_json::from_value::<T>(payload.clone()) {
        Ok(parsed) => wrap(parsed),
        Err(err) => {
            tracing::warn!(kind = %kind, error = %err, "canvas payload did not match its type");
            CanvasView::Unreadable {
                kind: kind.to_string(),
                reason: err.to_string(),
            }
        }
    }
}
