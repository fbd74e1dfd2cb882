use std::time::{Duration, Instant};

use client_core::{RenderedLine, Span};
use crossbeam_channel::Receiver;
use egui::{Color32, RichText};
use shared::domain::TripForm;

use crate::controller::{
    events::{ErrorBanner, UiEvent},
    orchestration::SessionController,
    reducer::Affordances,
};

pub struct PlannerApp {
    controller: SessionController,
    ui_rx: Receiver<UiEvent>,
    form: TripForm,
}

impl PlannerApp {
    pub fn new(controller: SessionController, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            controller,
            ui_rx,
            form: TripForm::default(),
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.controller.handle_ui_event(event);
        }
    }

    fn show_form(&mut self, ui: &mut egui::Ui, affordances: Affordances) {
        egui::Grid::new("trip_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                let TripForm {
                    source,
                    destination,
                    dates,
                    travelers,
                    interests,
                } = &mut self.form;
                let fields = [
                    ("From", "e.g. New York", source),
                    ("To", "e.g. Paris", destination),
                    ("Dates", "e.g. 2024-06-01 to 2024-06-07", dates),
                    ("Travelers", "number of people", travelers),
                    ("Interests", "e.g. art, food, history", interests),
                ];
                for (label, hint, value) in fields {
                    ui.label(RichText::new(label).strong());
                    let edit = egui::TextEdit::singleline(value)
                        .id_salt(label)
                        .hint_text(hint)
                        .desired_width(320.0);
                    ui.add_enabled(affordances.submit_enabled, edit);
                    ui.end_row();
                }
            });

        ui.add_space(10.0);
        ui.horizontal(|ui| {
            let button =
                egui::Button::new(RichText::new("Generate Itinerary").strong().size(16.0))
                    .min_size(egui::vec2(200.0, 36.0));
            if ui.add_enabled(affordances.submit_enabled, button).clicked() {
                self.controller.submit(self.form.clone());
            }
            if affordances.busy {
                ui.spinner();
                ui.label(RichText::new("Planning your trip...").weak());
            }
        });
    }

    fn show_error_banner(&mut self, ui: &mut egui::Ui) {
        let Some(message) = self
            .controller
            .banner()
            .map(|banner: &ErrorBanner| banner.error().message().to_string())
        else {
            return;
        };

        egui::Frame::NONE
            .fill(Color32::from_rgb(111, 53, 53))
            .stroke(egui::Stroke::new(1.0, Color32::from_rgb(175, 96, 96)))
            .corner_radius(8.0)
            .inner_margin(egui::Margin::symmetric(10, 8))
            .show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.label(RichText::new(message).color(Color32::WHITE));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("Dismiss").clicked() {
                            self.controller.dismiss_banner();
                        }
                    });
                });
            });
    }

    fn show_itinerary(&mut self, ui: &mut egui::Ui, affordances: Affordances) {
        let Some(displayed) = self.controller.displayed() else {
            return;
        };

        if let Some(trip) = &self.controller.session().current_trip {
            ui.horizontal_wrapped(|ui| {
                ui.label(
                    RichText::new(format!(
                        "{} → {} · {} · {} traveler(s)",
                        trip.source, trip.destination, trip.dates, trip.travelers
                    ))
                    .weak(),
                );
                if ui.small_button("Copy as HTML").clicked() {
                    ui.ctx().copy_text(displayed.rendered.as_markup().to_string());
                }
            });
        }

        egui::Frame::group(ui.style())
            .inner_margin(egui::Margin::same(12))
            .show(ui, |ui| {
                for line in &displayed.lines {
                    show_line(ui, line);
                }
            });

        if !affordances.export_visible {
            return;
        }
        ui.add_space(8.0);
        let label = if affordances.exporting {
            "Generating PDF…"
        } else {
            "Download PDF"
        };
        let clicked = ui
            .add_enabled(affordances.export_enabled, egui::Button::new(label))
            .clicked();
        if affordances.exporting {
            ui.spinner();
        }
        if let Some(path) = self.controller.last_saved() {
            ui.small(RichText::new(format!("Last saved: {}", path.display())).weak());
        }
        if clicked {
            self.controller.request_export();
        }
    }
}

fn show_line(ui: &mut egui::Ui, line: &RenderedLine) {
    if line.spans.is_empty() {
        ui.add_space(6.0);
        return;
    }

    let size = match line.heading {
        Some(1) => Some(26.0),
        Some(2) => Some(22.0),
        Some(3) => Some(18.0),
        _ => None,
    };
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = 0.0;
        for span in &line.spans {
            ui.label(span_text(span, size));
        }
    });
}

fn span_text(span: &Span, heading_size: Option<f32>) -> RichText {
    let mut text = RichText::new(&span.text);
    if let Some(size) = heading_size {
        text = text.size(size).strong();
    }
    if span.strong {
        text = text.strong();
    }
    if span.emphasis {
        text = text.italics();
    }
    text
}

impl eframe::App for PlannerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.controller.expire_banner(Instant::now());
        let affordances = self.controller.affordances();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal_wrapped(|ui| {
                ui.small("Status:");
                ui.small(RichText::new(self.controller.status()).weak());
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Travel Itinerary Planner");
                    ui.add_space(12.0);
                    self.show_form(ui, affordances);
                    ui.add_space(12.0);
                    self.show_error_banner(ui);
                    ui.add_space(8.0);
                    self.show_itinerary(ui, affordances);
                });
        });

        ctx.request_repaint_after(Duration::from_millis(100));
    }
}
