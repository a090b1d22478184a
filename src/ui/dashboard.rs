use egui::{Align, Color32, CornerRadius, Frame, Layout, Margin, RichText, Ui};
use egui_dropdown::DropDownBox;
use log::{error, info};

use crate::{
    analysis::{self, AnalysisKind, AnalysisOutput, AnalysisRequest},
    config::AppConfig,
    controls::{self, SessionOption, Selection},
    laps::Compound,
    provider::FileCacheProvider,
};

use super::{PALETTE_BROWN, PALETTE_ORANGE, chart_view::show_chart, dark_visuals};

#[derive(Clone)]
enum UiState {
    /// Nothing fetched yet
    Loading,
    Error { message: String },
    Display { output: AnalysisOutput },
}

/// Selector option lists derived from the current [`Selection`]
#[derive(Default)]
struct DerivedOptions {
    years: Vec<i32>,
    events: Vec<String>,
    sessions: Vec<SessionOption>,
    drivers: Vec<String>,
}

pub struct DashboardApp {
    provider: FileCacheProvider,
    app_config: AppConfig,
    ui_state: UiState,
    selection: Selection,
    options: DerivedOptions,
    compounds: Vec<Compound>,
    drivers: Vec<String>,
    // text buffers backing the drop-down boxes
    year_text: String,
    event_text: String,
    session_text: String,
    analysis_text: String,
}

impl DashboardApp {
    pub fn new(
        provider: FileCacheProvider,
        app_config: AppConfig,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        cc.egui_ctx.set_visuals(dark_visuals());

        let analysis = AnalysisKind::from_id(&app_config.last_analysis)
            .unwrap_or(AnalysisKind::FastestLap);
        let selection = Selection::new(app_config.last_year, analysis.id());

        let mut app = Self {
            provider,
            app_config,
            ui_state: UiState::Loading,
            year_text: selection.year().map(|y| y.to_string()).unwrap_or_default(),
            analysis_text: analysis.label().to_string(),
            selection,
            options: DerivedOptions::default(),
            compounds: Vec::new(),
            drivers: Vec::new(),
            event_text: String::new(),
            session_text: String::new(),
        };
        app.refresh_options();
        app
    }

    fn refresh_options(&mut self) {
        let now = self.provider.now();
        let year = self.selection.year();
        let event = self.selection.event();
        let analysis = self.selection.analysis();

        self.options.years = controls::year_options(now);
        self.options.events = controls::event_options(&self.provider, year, now);
        self.options.sessions =
            controls::session_options(&self.provider, year, event, analysis, now);
        let (drivers, kept) = controls::driver_options(
            &self.provider,
            year,
            event,
            self.selection.session(),
            analysis,
            &self.drivers,
        );
        self.options.drivers = drivers;
        self.drivers = kept.unwrap_or_default();
    }

    /// Pushes the drop-down text buffers into the selection, applying resets.
    fn sync_selection(&mut self) {
        let before = self.selection.clone();

        let year = self.year_text.parse::<i32>().ok().filter(|y| self.options.years.contains(y));
        if year != self.selection.year() {
            self.selection.set_year(year);
            self.event_text.clear();
            self.session_text.clear();
        }

        let event = Some(self.event_text.clone()).filter(|e| self.options.events.contains(e));
        if event.as_deref() != self.selection.event() {
            self.selection.set_event(event);
            self.session_text.clear();
        }

        if let Some(kind) = AnalysisKind::from_label(&self.analysis_text)
            && kind.id() != self.selection.analysis()
        {
            self.selection.set_analysis(kind.id());
            self.session_text.clear();
        }

        let session = self
            .options
            .sessions
            .iter()
            .find(|o| o.enabled && o.label == self.session_text)
            .and_then(|o| o.value);
        self.selection.set_session(session);

        if self.selection != before {
            self.refresh_options();
        }
    }

    fn fetch(&mut self) {
        let request = AnalysisRequest {
            triggered: true,
            year: self.selection.year(),
            event: self.selection.event().map(str::to_string),
            session: self.selection.session(),
            analysis: self.selection.analysis().to_string(),
            compounds: self.compounds.clone(),
            drivers: self.drivers.clone(),
        };
        let output = analysis::run(&self.provider, &request);
        self.ui_state = UiState::Display { output };
    }

    fn pick_cache_dir(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_directory(self.provider.cache_dir())
            .pick_folder()
        else {
            return;
        };
        match FileCacheProvider::new(path.clone()) {
            Ok(provider) => {
                info!("Using lap cache at {:?}", path);
                self.provider = provider;
                self.app_config.cache_dir = Some(path);
                self.ui_state = UiState::Loading;
                self.refresh_options();
            }
            Err(e) => {
                self.ui_state = UiState::Error {
                    message: format!("Could not open cache directory: {}", e),
                };
            }
        }
    }

    fn show_selectors(&mut self, ui: &mut Ui) {
        ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
            ui.label(RichText::new("Year: ").color(Color32::WHITE));
            ui.add(
                DropDownBox::from_iter(
                    self.options.years.iter().map(|y| y.to_string()),
                    "year_dropbox",
                    &mut self.year_text,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );

            ui.separator();
            ui.label(RichText::new("Grand Prix: ").color(Color32::WHITE));
            ui.add(
                DropDownBox::from_iter(
                    &self.options.events,
                    "event_dropbox",
                    &mut self.event_text,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );

            ui.separator();
            ui.label(RichText::new("Session: ").color(Color32::WHITE));
            if self.options.sessions.iter().all(|o| !o.enabled) && !self.options.sessions.is_empty() {
                ui.add_enabled(false, egui::Button::new(controls::NOT_APPLICABLE));
            } else {
                ui.add(
                    DropDownBox::from_iter(
                        self.options.sessions.iter().map(|o| o.label.clone()),
                        "session_dropbox",
                        &mut self.session_text,
                        |ui, text| ui.selectable_label(false, text),
                    )
                    .filter_by_input(false),
                );
            }

            ui.separator();
            ui.label(RichText::new("Analysis: ").color(Color32::WHITE));
            ui.add(
                DropDownBox::from_iter(
                    AnalysisKind::ALL.iter().map(|k| k.label()),
                    "analysis_dropbox",
                    &mut self.analysis_text,
                    |ui, text| ui.selectable_label(false, text),
                )
                .filter_by_input(false),
            );
        });

        ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
            ui.menu_button(format!("🛞 Compounds ({})", self.compounds.len()), |ui| {
                for compound in Compound::DRY {
                    let mut selected = self.compounds.contains(&compound);
                    if ui.checkbox(&mut selected, compound.as_str()).changed() {
                        if selected {
                            self.compounds.push(compound);
                        } else {
                            self.compounds.retain(|c| *c != compound);
                        }
                    }
                }
            });

            let drivers_enabled = !self.options.drivers.is_empty();
            ui.add_enabled_ui(drivers_enabled, |ui| {
                ui.menu_button(format!("👤 Drivers ({})", self.drivers.len()), |ui| {
                    for driver in &self.options.drivers {
                        let mut selected = self.drivers.contains(driver);
                        if ui.checkbox(&mut selected, driver).changed() {
                            // selection order decides which two drivers a pace comparison shows
                            if selected {
                                self.drivers.push(driver.clone());
                            } else {
                                self.drivers.retain(|d| d != driver);
                            }
                        }
                    }
                });
            });

            ui.separator();
            if ui
                .button(RichText::new("🔍 Fetch").color(PALETTE_ORANGE).strong())
                .clicked()
            {
                self.fetch();
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if ui.button("📂 Cache folder").clicked() {
                    self.pick_cache_dir();
                }
                ui.label(
                    RichText::new(self.provider.cache_dir().display().to_string())
                        .small()
                        .color(Color32::GRAY),
                );
            });
        });
    }

    fn show_info_box(ui: &mut Ui, output: &AnalysisOutput) {
        let Some(info) = &output.info else {
            return;
        };
        Frame::default()
            .fill(PALETTE_BROWN)
            .inner_margin(Margin::same(8))
            .corner_radius(CornerRadius::same(6))
            .show(ui, |ui| {
                ui.label(
                    RichText::new("Best sectors of the session")
                        .color(Color32::WHITE)
                        .strong(),
                );
                ui.horizontal(|ui| {
                    for line in info.lines() {
                        ui.label(RichText::new(line).color(Color32::WHITE));
                        ui.separator();
                    }
                });
            });
        ui.add_space(8.);
    }
}

impl eframe::App for DashboardApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.app_config.last_year = self.selection.year();
        self.app_config.last_analysis = self.selection.analysis().to_string();
        if let Err(e) = self.app_config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("Selectors")
            .frame(
                Frame::default()
                    .fill(Color32::TRANSPARENT)
                    .inner_margin(Margin::same(5)),
            )
            .resizable(false)
            .show(ctx, |ui| {
                self.show_selectors(ui);
            });
        self.sync_selection();

        egui::CentralPanel::default()
            .frame(Frame::default().inner_margin(Margin::same(10)))
            .show(ctx, |ui| match &self.ui_state {
                UiState::Loading => {
                    show_chart(
                        ui,
                        &analysis::Chart::placeholder(analysis::PROMPT_SELECT_FILTERS),
                    );
                }
                UiState::Error { message } => {
                    ui.label(RichText::new(message).color(Color32::RED));
                }
                UiState::Display { output } => {
                    Self::show_info_box(ui, output);
                    show_chart(ui, &output.chart);
                }
            });
    }
}
