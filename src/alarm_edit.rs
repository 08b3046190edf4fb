use eframe::egui::{self, Button, Color32, Image, RichText, TextEdit};

use crate::{
    alarm::{AlarmConfig, AlarmState, AlarmWidget, PrimaryAction},
    widgets::TimePicker,
};

const ACCENT: Color32 = Color32::from_rgb(79, 70, 229);
const DANGER: Color32 = Color32::from_rgb(239, 68, 68);
const RINGING: Color32 = Color32::from_rgb(22, 163, 74);

/// what the user asked for while the form was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Nothing,
    Primary,
    Reopen,
}

impl AlarmWidget {
    pub(crate) fn render_form(&mut self, ui: &mut egui::Ui) -> FormAction {
        let mut action = FormAction::Nothing;

        // fields are shown greyed out (and edits thrown away) while an alarm is set
        let editable = self.draft_mut().is_some();
        let mut shown = self.config().clone();
        ui.add_enabled_ui(editable, |ui| Self::edit_fields(&mut shown, ui));
        if let Some(draft) = self.draft_mut() {
            *draft = shown;
        }

        if let Some(preview) = self.preview_url() {
            ui.add_space(8.0);
            ui.label(RichText::new("Video Preview").color(ACCENT));
            ui.add(
                Image::from_uri(preview)
                    .max_width(ui.available_width())
                    .show_loading_spinner(true),
            );
        }

        ui.add_space(8.0);
        if self.render_primary_button(ui) {
            action = FormAction::Primary;
        }

        if let Some(status) = self.status() {
            ui.add_space(4.0);
            match self.state() {
                AlarmState::Ringing(_) => {
                    ui.horizontal(|ui| {
                        ui.colored_label(RINGING, format!("↗ {status}"));
                        if ui
                            .button("Open again")
                            .on_hover_text("if no tab showed up, open the link again")
                            .clicked()
                        {
                            action = FormAction::Reopen;
                        }
                    });
                }
                _ => {
                    ui.colored_label(ACCENT, format!("🔔 {status}"));
                }
            }
        }
        action
    }

    fn edit_fields(config: &mut AlarmConfig, ui: &mut egui::Ui) {
        ui.label(RichText::new("Set Alarm Time").color(ACCENT));
        ui.add(TimePicker::new(&mut config.target_time));
        ui.add_space(8.0);
        ui.label(RichText::new("YouTube Video Link").color(ACCENT));
        ui.add(
            TextEdit::singleline(&mut config.media_link)
                .hint_text("https://www.youtube.com/watch?v=...")
                .desired_width(f32::INFINITY),
        );
    }

    // returns true if clicked
    fn render_primary_button(&self, ui: &mut egui::Ui) -> bool {
        let action = self.primary_action();
        let (icon, fill) = match action {
            PrimaryAction::SetAlarm => ("🔔", ACCENT),
            PrimaryAction::CancelAlarm => ("🕒", DANGER),
            PrimaryAction::StopAlarm => ("🔔", DANGER),
        };
        let button = Button::new(RichText::new(format!("{icon} {action}")).color(Color32::WHITE))
            .fill(fill);
        ui.add_sized([ui.available_width(), 36.0], button).clicked()
    }
}
