use crate::backend::BackendClient;
use crate::canvas::runtime::CanvasRuntime;
use crate::canvas::selection::{CanvasPhase, CommitTicket};
use crate::chat::send::SendRejection;
use crate::chat::{Message, MessageId, Origin};
use crate::config::AppConfig;
use crate::conversation::{Conversation, Effect};
use crate::event::AppEvent;
use crate::theme::Theme;
use crate::view::{ViewKey, ViewSignal, ViewWatcher};
use eframe::egui::{self, Color32, RichText, ScrollArea};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::{SystemTime, UNIX_EPOCH};

const NAV_VIEWS: [ViewKey; 3] = [ViewKey::Jobs, ViewKey::Events, ViewKey::Roadmap];
const MAX_DIAGNOSTICS: usize = 200;

pub struct AskAshaApp {
    rx: Receiver<AppEvent>,
    backend: BackendClient,
    views: ViewSignal,
    view_watcher: ViewWatcher,
    conversation: Conversation,
    canvas: CanvasRuntime,
    theme: Theme,
    theme_applied: bool,
    input_buffer: String,
    diagnostics_log: Vec<String>,
    painted_commit: Option<CommitTicket>,
}

impl AskAshaApp {
    pub fn new(
        rx: Receiver<AppEvent>,
        backend: BackendClient,
        views: ViewSignal,
        config: &AppConfig,
    ) -> Self {
        let view_watcher = views.subscribe();
        let mut app = Self {
            rx,
            backend,
            views,
            view_watcher,
            conversation: Conversation::new(config.user_id.clone()),
            canvas: CanvasRuntime::new(),
            theme: Theme::default(),
            theme_applied: false,
            input_buffer: String::new(),
            diagnostics_log: Vec::new(),
            painted_commit: None,
        };

        if config.user_id.is_empty() {
            app.log_diagnostic("no user id configured; history will not load");
        }
        app.apply_view(config.initial_view);
        app
    }

    fn timestamp() -> String {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => duration.as_secs().to_string(),
            Err(_) => "0".to_string(),
        }
    }

    pub fn log_diagnostic(&mut self, message: impl Into<String>) {
        self.diagnostics_log
            .push(format!("[{}] {}", Self::timestamp(), message.into()));
        if self.diagnostics_log.len() > MAX_DIAGNOSTICS {
            let overflow = self.diagnostics_log.len() - MAX_DIAGNOSTICS;
            self.diagnostics_log.drain(..overflow);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::SendChat(request) => self.backend.send_chat(request),
            Effect::LoadHistory(request) => {
                self.log_diagnostic("loading conversation history");
                self.backend.load_history(request);
            }
        }
    }

    fn apply_view(&mut self, view: ViewKey) {
        if let Some(effect) = self.conversation.apply_view(view) {
            self.run_effect(effect);
        }
        self.log_diagnostic(format!("view: {}", self.conversation.active_view()));
    }

    fn poll_view_requests(&mut self) {
        if let Some(view) = self.view_watcher.poll() {
            self.apply_view(view);
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        loop {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.apply_event(event);
                    ctx.request_repaint();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.log_diagnostic("event channel disconnected");
                    break;
                }
            }
        }
    }

    fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::ChatSettled { ticket, result } => {
                if let Err(err) = &result {
                    self.log_diagnostic(format!("chat request failed: {err}"));
                }
                if !self.conversation.settle_chat(ticket, result) {
                    self.log_diagnostic("dropped a reply for an earlier conversation");
                }
            }
            AppEvent::HistoryLoaded { epoch, result } => {
                if let Err(err) = &result {
                    self.log_diagnostic(format!("history load failed: {err}"));
                }
                if !self.conversation.apply_history(epoch, result) {
                    self.log_diagnostic("dropped history for an earlier view");
                }
            }
        }
    }

    fn submit_prompt(&mut self, ctx: &egui::Context) {
        match self.conversation.submit(&self.input_buffer) {
            Ok(effect) => {
                self.input_buffer.clear();
                self.run_effect(effect);
            }
            Err(SendRejection::Unsafe) => {
                self.input_buffer.clear();
                self.log_diagnostic(format!("send rejected: {}", SendRejection::Unsafe));
            }
            Err(rejection @ (SendRejection::Busy | SendRejection::Empty)) => {
                tracing::debug!(%rejection, "send ignored");
            }
        }
        ctx.request_repaint();
    }

    fn select_message(&mut self, id: MessageId) {
        if self.conversation.select_message(id).is_some() {
            self.log_diagnostic(format!("canvas selected: {id}"));
        }
    }

    fn render_top_bar(&mut self, ctx: &egui::Context) {
        let active = self.conversation.active_view();
        let selection = self.conversation.selection();
        let can_toggle = selection.phase() != CanvasPhase::Closed || selection.selected().is_some();
        let toggle_label = if selection.phase() == CanvasPhase::Closed {
            "Show canvas"
        } else {
            "Hide canvas"
        };

        let mut requested = None;
        let mut toggle = false;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.strong("AskAsha");
                ui.separator();
                for view in NAV_VIEWS {
                    if ui.add(self.theme.nav_button(view.label(), view == active)).clicked() {
                        requested = Some(view);
                    }
                }
                ui.separator();
                toggle = ui
                    .add_enabled(can_toggle, egui::Button::new(toggle_label))
                    .clicked();
            });
        });

        if let Some(view) = requested {
            self.views.request(view);
        }
        if toggle {
            self.conversation.toggle_canvas();
        }
    }

    fn render_canvas_panel(&mut self, ctx: &egui::Context) {
        if self.conversation.selection().phase() == CanvasPhase::Closed {
            self.canvas.unmount();
            return;
        }

        if let Some(ticket) = self.conversation.pending_commit() {
            self.canvas.unmount();
            self.painted_commit = Some(ticket);
        } else if let Some(id) = self.conversation.selection().mounted() {
            match self.conversation.store().get(id) {
                Some(message) => self.canvas.mount(id, &message.canvas),
                None => self.canvas.unmount(),
            }
        }

        let title = self.canvas.view().map_or("Canvas", |view| view.title());
        let mut toggle = false;
        let mut dismiss = false;
        egui::SidePanel::right("canvas_panel")
            .resizable(true)
            .default_width(420.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading(title);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        dismiss = ui.button("Dismiss").clicked();
                        toggle = ui.button("Hide").clicked();
                    });
                });
                ui.separator();

                if self.canvas.mounted_id().is_none() {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new("Opening canvas...").color(self.theme.text_muted));
                    });
                    return;
                }

                ScrollArea::vertical()
                    .id_salt("canvas_content")
                    .show(ui, |ui| self.canvas.render(ui, &self.theme));
            });

        if dismiss {
            self.conversation.clear_selected_message();
            self.log_diagnostic("canvas dismissed");
        } else if toggle {
            self.conversation.toggle_canvas();
        }
    }

    fn render_message(&self, message: &Message, ui: &mut egui::Ui) -> bool {
        let from_user = message.origin == Origin::User;
        let selected = self.conversation.selection().selected() == Some(message.id);
        let layout = if from_user {
            egui::Layout::right_to_left(egui::Align::TOP)
        } else {
            egui::Layout::left_to_right(egui::Align::TOP)
        };

        let mut clicked = false;
        ui.with_layout(layout, |ui| {
            ui.set_max_width(ui.available_width() * 0.8);
            let frame = self.theme.bubble_frame(from_user, selected);
            let response = frame.show(ui, |ui| {
                if message.is_pending {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label(RichText::new(message.display_text()).color(self.theme.text_muted));
                    });
                    return;
                }
                ui.label(RichText::new(message.display_text()).color(self.theme.text_primary));
                if message.has_canvas() {
                    let marker = if selected {
                        format!("{} (showing)", message.canvas.kind)
                    } else {
                        format!("{} (click to open)", message.canvas.kind)
                    };
                    ui.label(RichText::new(marker).color(self.theme.accent_primary).size(12.0));
                }
            });
            if message.has_canvas() {
                clicked = response
                    .response
                    .interact(egui::Sense::click())
                    .on_hover_cursor(egui::CursorIcon::PointingHand)
                    .clicked();
            }
        });
        clicked
    }

    fn render_center_panel(&mut self, ctx: &egui::Context) {
        let mut clicked_message = None;
        let mut send_now = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.conversation.active_view().label());
            ui.separator();

            if self.conversation.is_loading_history() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(
                        RichText::new("Loading conversation history...")
                            .color(self.theme.text_muted),
                    );
                });
            }

            let transcript_height = (ui.available_height() - 170.0).max(120.0);
            ScrollArea::vertical()
                .id_salt("chat_transcript")
                .max_height(transcript_height)
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    let mut after_history = false;
                    for message in self.conversation.store().messages() {
                        if after_history && !message.is_historical {
                            ui.label(
                                RichText::new("Earlier conversations above")
                                    .color(self.theme.text_muted)
                                    .size(12.0),
                            );
                            ui.separator();
                        }
                        after_history = message.is_historical;
                        if self.render_message(message, ui) {
                            clicked_message = Some(message.id);
                        }
                        ui.add_space(self.theme.spacing_4);
                    }
                });

            ui.separator();
            egui::CollapsingHeader::new("Diagnostics")
                .default_open(false)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("diagnostics_log")
                        .max_height(90.0)
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for entry in &self.diagnostics_log {
                                ui.label(RichText::new(entry).size(12.0).color(Color32::GRAY));
                            }
                        });
                });

            ui.separator();
            let input_enabled = self.conversation.can_send();
            let hint = if input_enabled {
                "Ask about jobs, events or your career..."
            } else {
                "Waiting for response..."
            };

            self.theme.composer_frame().show(ui, |ui| {
                ui.horizontal(|ui| {
                    let response = ui.add_enabled(
                        input_enabled,
                        egui::TextEdit::singleline(&mut self.input_buffer)
                            .desired_width(ui.available_width() - 80.0)
                            .hint_text(hint),
                    );
                    if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                        send_now = true;
                    }

                    send_now |= ui
                        .add_enabled(
                            input_enabled && !self.input_buffer.trim().is_empty(),
                            egui::Button::new("Send"),
                        )
                        .clicked();
                });
            });
        });

        if let Some(id) = clicked_message {
            self.select_message(id);
        }
        if send_now {
            self.submit_prompt(ctx);
        }
    }

    /// The panel has been drawn empty for this commit, so the target may mount
    /// on the next frame.
    fn finish_frame(&mut self, ctx: &egui::Context) {
        if let Some(ticket) = self.painted_commit.take() {
            if self.conversation.acknowledge(ticket) {
                ctx.request_repaint();
            }
        }
        if self.conversation.pending_commit().is_some() {
            ctx.request_repaint();
        }
    }
}

impl eframe::App for AskAshaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.theme_applied {
            self.theme.apply_visuals(ctx);
            self.theme_applied = true;
        }
        self.drain_events(ctx);
        self.poll_view_requests();
        self.render_top_bar(ctx);
        self.render_canvas_panel(ctx);
        self.render_center_panel(ctx);
        self.finish_frame(ctx);
    }
}
