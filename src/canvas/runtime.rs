use crate::canvas::dispatch::{resolve, CanvasView};
use crate::canvas::payload::Canvas;
use crate::canvas::registry::CanvasRegistry;
use crate::chat::MessageId;
use crate::theme::Theme;
use eframe::egui::{self, RichText};

/// Holds the view currently mounted in the panel. A message's payload is
/// decoded once when it mounts and dropped when it unmounts.
pub struct CanvasRuntime {
    registry: CanvasRegistry,
    mounted: Option<(MessageId, Option<CanvasView>)>,
}

impl CanvasRuntime {
    pub fn new() -> Self {
        Self {
            registry: CanvasRegistry::new(),
            mounted: None,
        }
    }

    pub fn mounted_id(&self) -> Option<MessageId> {
        self.mounted.as_ref().map(|(id, _)| *id)
    }

    pub fn view(&self) -> Option<&CanvasView> {
        self.mounted.as_ref().and_then(|(_, view)| view.as_ref())
    }

    pub fn mount(&mut self, id: MessageId, canvas: &Canvas) {
        if self.mounted_id() == Some(id) {
            return;
        }
        tracing::debug!(message_id = %id, kind = %canvas.kind, "mounting canvas");
        self.mounted = Some((id, resolve(canvas)));
    }

    pub fn unmount(&mut self) {
        if let Some((id, _)) = self.mounted.take() {
            tracing::debug!(message_id = %id, "unmounting canvas");
        }
    }

    pub fn render(&self, ui: &mut egui::Ui, theme: &Theme) {
        match self.view() {
            Some(view) => self.registry.render(view, ui, theme),
            None => {
                ui.label(RichText::new("No content available").color(theme.text_muted));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::payload::CanvasKind;
    use crate::chat::store::MessageStore;
    use crate::chat::NewMessage;
    use serde_json::json;

    fn two_canvases() -> (MessageStore, MessageId, MessageId) {
        let mut store = MessageStore::new();
        store.append(NewMessage::assistant("plan").with_canvas(Canvas::new(
            CanvasKind::Roadmap,
            Some(json!({ "roadmap": [{ "title": "Learn SQL" }] })),
        )));
        store.append(NewMessage::assistant("jobs").with_canvas(Canvas::new(
            CanvasKind::JobSearch,
            Some(json!({ "job_link": "https://jobs.test" })),
        )));
        let ids: Vec<MessageId> = store.messages().iter().map(|message| message.id).collect();
        (store, ids[0], ids[1])
    }

    #[test]
    fn mount_resolves_the_message_canvas() {
        let (store, plan, _) = two_canvases();
        let mut runtime = CanvasRuntime::new();
        let message = store.get(plan).expect("plan should exist");

        runtime.mount(plan, &message.canvas);

        assert_eq!(runtime.mounted_id(), Some(plan));
        assert!(matches!(
            runtime.view(),
            Some(CanvasView::Roadmap(payload)) if payload.roadmap[0].title == "Learn SQL"
        ));
    }

    #[test]
    fn remount_of_other_message_replaces_view() {
        let (store, plan, jobs) = two_canvases();
        let mut runtime = CanvasRuntime::new();
        runtime.mount(plan, &store.get(plan).expect("plan should exist").canvas);

        runtime.unmount();
        assert!(runtime.mounted_id().is_none());
        assert!(runtime.view().is_none());

        runtime.mount(jobs, &store.get(jobs).expect("jobs should exist").canvas);
        assert!(matches!(runtime.view(), Some(CanvasView::Jobs(_))));
    }
}
