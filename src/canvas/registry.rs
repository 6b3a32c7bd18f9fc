use crate::canvas::dispatch::CanvasView;
use crate::canvas::payload::{
    JobListing, JobSearchPayload, RoadmapPayload, RoadmapStep, SessionListing,
    SessionSearchPayload,
};
use crate::theme::Theme;
use eframe::egui::{self, RichText};

/// Paints resolved canvas views. One renderer per canvas type.
pub struct CanvasRegistry;

impl CanvasRegistry {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, view: &CanvasView, ui: &mut egui::Ui, theme: &Theme) {
        match view {
            CanvasView::Jobs(payload) => self.render_jobs(payload, ui, theme),
            CanvasView::Roadmap(payload) => self.render_roadmap(payload, ui, theme),
            CanvasView::Sessions(payload) => self.render_sessions(payload, ui, theme),
            CanvasView::Unreadable { kind, reason } => {
                theme.card_frame().show(ui, |ui| {
                    ui.label(
                        RichText::new("Canvas payload could not be read")
                            .color(theme.danger)
                            .size(13.0),
                    );
                    ui.add_space(theme.spacing_8);
                    ui.label(
                        RichText::new(format!("{kind}: {reason}"))
                            .color(theme.text_muted)
                            .size(12.0),
                    );
                });
            }
            CanvasView::Fallback { kind } => {
                theme.card_frame().show(ui, |ui| {
                    ui.label(RichText::new("No content available").color(theme.text_muted));
                    ui.label(
                        RichText::new(format!("type: {kind}"))
                            .color(theme.text_muted)
                            .size(12.0),
                    );
                });
            }
        }
    }

    fn render_jobs(&self, payload: &JobSearchPayload, ui: &mut egui::Ui, theme: &Theme) {
        let results = payload.job_results.as_deref().unwrap_or_default();
        if results.is_empty() {
            self.render_source_link(payload.job_link.as_deref(), "Browse jobs", ui, theme);
            return;
        }

        for listing in results {
            self.render_job(listing, ui, theme);
            ui.add_space(theme.spacing_8);
        }
        if let Some(link) = payload.job_link.as_deref() {
            ui.hyperlink_to("See all matching jobs", link);
        }
    }

    fn render_job(&self, listing: &JobListing, ui: &mut egui::Ui, theme: &Theme) {
        theme.card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(&listing.title)
                    .color(theme.text_primary)
                    .size(14.0)
                    .strong(),
            );
            if !listing.company_name.is_empty() {
                ui.label(RichText::new(&listing.company_name).color(theme.text_primary));
            }
            if !listing.location_name.is_empty() {
                ui.label(
                    RichText::new(&listing.location_name)
                        .color(theme.text_muted)
                        .size(12.0),
                );
            }
            if let Some(link) = listing.link() {
                ui.hyperlink_to(format!("View on {}", listing.platform_name()), link);
            }
        });
    }

    fn render_roadmap(&self, payload: &RoadmapPayload, ui: &mut egui::Ui, theme: &Theme) {
        if payload.roadmap.is_empty() {
            ui.label(RichText::new("This roadmap has no steps yet").color(theme.text_muted));
            return;
        }
        for (index, step) in payload.roadmap.iter().enumerate() {
            self.render_step(index + 1, step, ui, theme);
            ui.add_space(theme.spacing_8);
        }
    }

    fn render_step(&self, number: usize, step: &RoadmapStep, ui: &mut egui::Ui, theme: &Theme) {
        ui.horizontal_top(|ui| {
            egui::Frame::new()
                .fill(theme.accent_muted)
                .corner_radius(egui::CornerRadius::same(theme.radius_12))
                .inner_margin(egui::Margin::symmetric(theme.spacing_8 as i8, theme.spacing_4 as i8))
                .show(ui, |ui| {
                    ui.label(RichText::new(number.to_string()).color(theme.text_on_accent));
                });
            theme.card_frame().show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(
                    RichText::new(&step.title)
                        .color(theme.text_primary)
                        .size(14.0)
                        .strong(),
                );
                if !step.description.is_empty() {
                    ui.label(RichText::new(&step.description).color(theme.text_primary));
                }
                if let Some(event) = step.calendar_event.as_deref() {
                    ui.label(
                        RichText::new(format!("Scheduled: {event}"))
                            .color(theme.warning)
                            .size(12.0),
                    );
                }
                if !step.link.is_empty() {
                    ui.hyperlink_to("Learn more", &step.link);
                }
            });
        });
    }

    fn render_sessions(&self, payload: &SessionSearchPayload, ui: &mut egui::Ui, theme: &Theme) {
        let listings = payload.listings();
        if listings.is_empty() {
            self.render_source_link(payload.session_link.as_deref(), "Browse sessions", ui, theme);
            return;
        }
        for listing in &listings {
            self.render_session(listing, ui, theme);
            ui.add_space(theme.spacing_8);
        }
    }

    fn render_session(&self, listing: &SessionListing, ui: &mut egui::Ui, theme: &Theme) {
        theme.card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.label(
                RichText::new(&listing.topic)
                    .color(theme.text_primary)
                    .size(14.0)
                    .strong(),
            );
            if let Some(starts_at) = listing.starts_at.as_deref() {
                ui.label(RichText::new(starts_at).color(theme.text_muted).size(12.0));
            }
            ui.hyperlink_to("Join session", &listing.link);
        });
    }

    fn render_source_link(
        &self,
        link: Option<&str>,
        label: &str,
        ui: &mut egui::Ui,
        theme: &Theme,
    ) {
        theme.card_frame().show(ui, |ui| {
            ui.set_width(ui.available_width());
            match link {
                Some(link) if !link.is_empty() => {
                    ui.label(RichText::new("No results to show here yet.").color(theme.text_muted));
                    ui.hyperlink_to(label, link);
                }
                _ => {
                    ui.label(RichText::new("No content available").color(theme.text_muted));
                }
            }
        });
    }
}
