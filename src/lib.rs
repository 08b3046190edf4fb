#![warn(clippy::pedantic, clippy::nursery, clippy::cargo)]
#![deny(clippy::use_self, rust_2018_idioms)]
#![allow(clippy::multiple_crate_versions, clippy::module_name_repetitions)]

use std::path::PathBuf;

use alarm::{AlarmWidget, ArmError, LinkOpener};
use alarm_edit::FormAction;
use config::{Config, Theme};
use eframe::egui::{
    self, Button, CentralPanel, Layout, RichText, TextEdit, TopBottomPanel, Window,
};
use ticker::{LocalClock, TimeSource, Ticker};

pub mod alarm;
pub mod config;
pub mod media;
pub mod ticker;
pub mod widgets;

/// implementation of the alarm form for egui
pub mod alarm_edit;

/// opens links in the system browser through egui
pub struct BrowserOpener<'a>(&'a egui::Context);

impl LinkOpener for BrowserOpener<'_> {
    fn open(&mut self, link: &str) {
        // egui doesn't report back if the browser actually opened
        self.0.open_url(egui::OpenUrl::new_tab(link));
    }
}

pub struct MusicAlarm {
    config: Config,
    config_path: Option<PathBuf>,
    alarm: AlarmWidget,
    ticker: Ticker,
    in_config: bool,
    arm_error: Option<ArmError>,
}

impl MusicAlarm {
    /// starts the clock ticking, it stops when the app is dropped
    #[must_use]
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: Config,
        config_path: Option<PathBuf>,
        mut alarm: AlarmWidget,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        alarm.set_time_format(config.time_format.clone());
        // show the time right away instead of waiting for the first tick
        alarm.tick(LocalClock.now(), &mut BrowserOpener(&cc.egui_ctx));

        let ctx = cc.egui_ctx.clone();
        let ticker = Ticker::spawn(LocalClock, ticker::TICK_PERIOD, move || {
            ctx.request_repaint();
        });
        Self {
            config,
            config_path,
            alarm,
            ticker,
            in_config: false,
            arm_error: None,
        }
    }

    fn handle_ticks(&mut self, ctx: &egui::Context) {
        let mut opener = BrowserOpener(ctx);
        for tick in self.ticker.ticks() {
            self.alarm.tick(tick.now, &mut opener);
        }
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        Window::new("settings ⚙").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label("theme");
                ui.selectable_value(&mut self.config.theme, Theme::Dark, "dark");
                ui.selectable_value(&mut self.config.theme, Theme::Light, "light");
            });
            ui.horizontal(|ui| {
                ui.label("time format");
                if ui
                    .add(TextEdit::singleline(&mut self.config.time_format).desired_width(100.0))
                    .on_hover_text("chrono format, e.g. %H:%M:%S")
                    .changed()
                {
                    // half typed formats like "%" are kept out of the clock
                    self.alarm.set_time_format(self.config.time_format.clone());
                }
            });
            let format_ok = self.alarm.time_format() == self.config.time_format;
            if !format_ok {
                let warn = ui.visuals().warn_fg_color;
                ui.colored_label(
                    warn,
                    format!("not a usable format, showing {:?}", self.alarm.time_format()),
                );
            }
            ui.horizontal(|ui| {
                if ui.add_enabled(format_ok, Button::new("save")).clicked() {
                    self.save();
                }
                if ui.button("x").clicked() {
                    self.in_config = false;
                }
            });
        });
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("time_and_ctrl").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let theme_btn = ui.add(Button::new({
                    if self.config.theme == Theme::Dark {
                        "🌞"
                    } else {
                        "🌙"
                    }
                }));
                if theme_btn.clicked() {
                    self.config.theme = !self.config.theme;
                }
                ui.with_layout(Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("⚙").on_hover_text("settings").clicked() {
                        self.in_config = true;
                    }
                });
            });
        });
    }

    fn render_arm_error(&mut self, ctx: &egui::Context) {
        let Some(error) = &self.arm_error else {
            return;
        };
        let mut dismissed = false;
        Window::new("Can't set alarm")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(error.to_string());
                if ui.button("ok").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.arm_error = None;
        }
    }

    fn save(&self) {
        let Some(path) = &self.config_path else {
            log::warn!("no config path, not saving settings");
            return;
        };
        match self.config.save(path) {
            Ok(()) => log::info!("saved settings to {}", path.display()),
            Err(e) => log::error!("{e}"),
        }
    }
}

impl eframe::App for MusicAlarm {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_ticks(ctx);

        ctx.set_visuals(self.config.theme.into());
        if self.in_config {
            self.render_settings(ctx);
        }
        self.render_arm_error(ctx);
        self.render_header(ctx);

        CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("🎵 Music Alarm Clock");
                ui.label("Wake up with the music you love");
                ui.add_space(12.0);
                ui.label("Current Time");
                ui.label(RichText::new(self.alarm.wall_clock()).size(32.0).strong());
            });
            ui.add_space(12.0);

            // the form can't be used while the error is up
            let action = ui
                .add_enabled_ui(self.arm_error.is_none(), |ui| self.alarm.render_form(ui))
                .inner;
            match action {
                FormAction::Primary => {
                    if let Err(e) = self.alarm.press_primary() {
                        self.arm_error = Some(e);
                    }
                }
                FormAction::Reopen => {
                    self.alarm.reopen(&mut BrowserOpener(ctx));
                }
                FormAction::Nothing => {}
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.ticker.stop();
    }
}
