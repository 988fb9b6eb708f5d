#![cfg(feature = "egui")]

use eframe::egui::{self, Color32, RichText, Sense};

use crate::compare::DeltaTag;
use crate::geometry::Point;
use crate::history::CURRENT_RUN_KEY;
use crate::interaction::{HitTarget, InputEvent, PointerButton, PointerDevice, PointerId};
use crate::model::NodeType;
use crate::node_types::node_type_style;
use crate::overlay::{ChecklistSummary, visible_checklist};
use crate::scene::{build_scene, render_scene};
use crate::source::ContentSource;

use super::render::{EguiSceneRenderer, rgb_to_color32};
use super::state::DashboardApp;

/// The single mouse pointer egui reports.
const MOUSE: PointerId = PointerId(0);

fn map_button(b: egui::PointerButton) -> PointerButton {
    match b {
        egui::PointerButton::Primary => PointerButton::Primary,
        egui::PointerButton::Secondary => PointerButton::Secondary,
        egui::PointerButton::Middle => PointerButton::Middle,
        _ => PointerButton::Other,
    }
}

fn tag_color(tag: DeltaTag) -> Color32 {
    match tag {
        DeltaTag::Improved => Color32::from_rgb(34, 197, 94),
        DeltaTag::Regressed => Color32::from_rgb(239, 68, 68),
        DeltaTag::Neutral | DeltaTag::NotApplicable => Color32::GRAY,
    }
}

pub fn update<S: ContentSource>(app: &mut DashboardApp<S>, ctx: &egui::Context) {
    top_bar(app, ctx);
    if app.show_side_panel {
        side_panel(app, ctx);
    }
    egui::CentralPanel::default().show(ctx, |ui| canvas(app, ui));
}

fn top_bar<S: ContentSource>(app: &mut DashboardApp<S>, ctx: &egui::Context) {
    let mut select: Option<String> = None;
    let mut toggle: Option<NodeType> = None;
    let mut refresh = false;

    egui::TopBottomPanel::top("top").show(ctx, |ui| {
        let canvas = app.session.canvas();
        let meta = &canvas.layout().meta;
        ui.horizontal(|ui| {
            ui.label(RichText::new(meta.title.as_deref().unwrap_or("Pipeline")).strong());
            if let Some(sub) = &meta.subtitle {
                ui.label(sub);
            }
            if let Some(date) = &meta.date {
                ui.weak(date);
            }
            ui.separator();
            if ui.button("⟳ Refresh").clicked() {
                refresh = true;
            }
            ui.checkbox(&mut app.show_side_panel, "Details");
        });
        ui.horizontal(|ui| {
            let active = canvas.view().id.clone();
            for v in &canvas.layout().views {
                if ui.selectable_label(v.id == active, &v.name).clicked() && v.id != active {
                    select = Some(v.id.clone());
                }
            }
            ui.separator();
            for t in NodeType::ALL {
                let style = node_type_style(t);
                let on = canvas.is_type_active(t);
                let text = RichText::new(style.legend).color(if on {
                    rgb_to_color32(style.accent)
                } else {
                    Color32::DARK_GRAY
                });
                if ui.selectable_label(on, text).clicked() {
                    toggle = Some(t);
                }
            }
            ui.separator();
            ui.weak(format!(
                "status: {}",
                canvas.runtime_availability().label()
            ));
        });
    });

    if let Some(id) = select {
        // Pointer releases are implicit in egui.
        if app.session.select_view(&id) {
            app.hovered = None;
        }
    }
    if let Some(t) = toggle {
        app.session.canvas_mut().toggle_type(t);
    }
    if refresh {
        app.refresh_all();
    }
}

fn side_panel<S: ContentSource>(app: &mut DashboardApp<S>, ctx: &egui::Context) {
    app.ensure_comparison();
    let mut baseline_key: Option<String> = None;

    egui::SidePanel::right("details").min_width(280.0).show(ctx, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| {
            if let Some(job) = app.session.job() {
                ui.heading("Job");
                ui.label(format!("{:?}", job.state));
                if let Some(p) = job.progress_label() {
                    ui.label(p);
                }
                if let Some(msg) = &job.message {
                    ui.weak(msg);
                }
                ui.separator();
            }

            ui.heading("Checklist");
            match app.session.canvas().runtime() {
                Some(rt) => {
                    let summary = ChecklistSummary::of(&rt.checklist);
                    ui.label(format!("{}/{} passed", summary.passed, summary.total));
                    for item in visible_checklist(&rt.checklist) {
                        let (mark, color) = if item.passed {
                            ("✔", Color32::from_rgb(34, 197, 94))
                        } else {
                            ("✘", Color32::from_rgb(239, 68, 68))
                        };
                        let resp = ui.colored_label(color, format!("{mark} {}", item.title));
                        if let Some(detail) = item.detail.as_deref().or(item.hint.as_deref()) {
                            resp.on_hover_text(detail);
                        }
                    }
                    let ready: Vec<&str> = rt.artifacts.ready_flags().collect();
                    if !ready.is_empty() {
                        ui.weak(format!("ready: {}", ready.join(", ")));
                    }
                }
                None => {
                    ui.weak(app.session.canvas().runtime_availability().label());
                }
            }
            ui.separator();

            ui.heading("Compare");
            let selected = app
                .session
                .comparison_selection()
                .baseline
                .as_ref()
                .map(|b| b.key().to_string());
            match app.session.history() {
                Some(history) => {
                    egui::ComboBox::from_label("Baseline")
                        .selected_text(selected.as_deref().unwrap_or("n/a"))
                        .show_ui(ui, |ui| {
                            if ui
                                .selectable_label(selected.as_deref() == Some(CURRENT_RUN_KEY), "current")
                                .clicked()
                            {
                                baseline_key = Some(CURRENT_RUN_KEY.to_string());
                            }
                            for run in &history.index().runs {
                                let is_sel = selected.as_deref() == Some(run.run_id.as_str());
                                if ui.selectable_label(is_sel, run.display_label()).clicked() {
                                    baseline_key = Some(run.run_id.clone());
                                }
                            }
                        });
                }
                None => {
                    ui.weak(app.session.history_availability().label());
                }
            }
            egui::Grid::new("delta").striped(true).show(ui, |ui| {
                for (name, value, tag) in app.delta.rows() {
                    ui.label(name);
                    ui.colored_label(tag_color(tag), value);
                    ui.end_row();
                }
            });
        });
    });

    if let Some(key) = baseline_key {
        app.session.select_baseline(&key);
        app.compare_dirty = true;
    }
}

fn canvas<S: ContentSource>(app: &mut DashboardApp<S>, ui: &mut egui::Ui) {
    let avail = ui.available_rect_before_wrap();
    let response = ui.interact(avail, ui.id().with("canvas"), Sense::click_and_drag());
    let origin = avail.min;
    let local = |p: egui::Pos2| Point::new((p.x - origin.x) as f64, (p.y - origin.y) as f64);

    let events = ui.input(|i| i.events.clone());
    for event in events {
        let input = match event {
            egui::Event::PointerButton {
                pos,
                button,
                pressed: true,
                ..
            } if avail.contains(pos) => {
                let position = local(pos);
                Some(InputEvent::PointerDown {
                    pointer: MOUSE,
                    position,
                    button: map_button(button),
                    device: PointerDevice::Mouse,
                    target: app.session.canvas().hit_test(position),
                })
            }
            egui::Event::PointerButton {
                pos,
                pressed: false,
                ..
            } => Some(InputEvent::PointerUp {
                pointer: MOUSE,
                position: local(pos),
            }),
            egui::Event::PointerMoved(pos) => Some(InputEvent::PointerMove {
                pointer: MOUSE,
                position: local(pos),
            }),
            egui::Event::PointerGone => Some(InputEvent::PointerCancel { pointer: MOUSE }),
            _ => None,
        };
        if let Some(input) = input {
            app.session.canvas_mut().handle_input(input);
        }
    }

    if let Some(hover) = response.hover_pos() {
        let scroll_y = ui.input(|i| i.raw_scroll_delta.y);
        if scroll_y != 0.0 {
            app.session.canvas_mut().handle_input(InputEvent::Wheel {
                position: local(hover),
                delta_y: -scroll_y as f64,
            });
        }
        app.hovered = match app.session.canvas().hit_test(local(hover)) {
            HitTarget::Node(id) => Some(id),
            HitTarget::Canvas => None,
        };
    } else {
        app.hovered = None;
    }

    let scene = build_scene(app.session.canvas());
    let painter = ui.painter_at(avail);
    render_scene(&mut EguiSceneRenderer::new(&painter, origin), &scene);

    let tooltip = app
        .hovered
        .as_deref()
        .and_then(|id| scene.node(id))
        .map(|card| format!("{}\n{}", card.label, card.tooltip));
    if let Some(text) = tooltip {
        response.on_hover_text(text);
    }
}
