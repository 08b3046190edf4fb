use std::ops::{Add, Sub};

use chrono::{NaiveTime, Timelike};
use eframe::egui::{self, emath::Numeric, Color32, Sense, Stroke, TextEdit, Vec2, Widget};

use crate::alarm::TARGET_TIME_FORMAT;

const KNOB_RADIUS: f32 = 32.;

pub struct Knob<'a, N> {
    min: N,
    max: N,
    value: &'a mut N,
    hand_color: Option<Color32>,
    fill: Option<Color32>,
    stroke: Option<Stroke>,
    radius: Option<f32>,
}

impl<'a, N> Knob<'a, N> {
    pub const fn new(value: &'a mut N, min: N, max: N) -> Self {
        Self {
            min,
            max,
            value,
            hand_color: None,
            fill: None,
            stroke: None,
            radius: None,
        }
    }

    #[must_use]
    pub const fn radius(mut self, radius: f32) -> Self {
        self.radius = Some(radius);
        self
    }

    #[must_use]
    pub const fn hand_color(mut self, color: Color32) -> Self {
        self.hand_color = Some(color);
        self
    }
}

impl<N> Widget for Knob<'_, N>
where
    N: Sub<Output = N> + Add<Output = N> + Numeric,
    f32: From<N>,
{
    // partially from https://github.com/obsqrbtz/egui_knob and https://codeberg.org/pintariching/egui_timepicker
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let Self {
            min,
            max,
            value,
            hand_color,
            fill,
            stroke,
            radius,
        } = self;

        let desired_radius = radius.unwrap_or_else(|| ui.spacing().slider_width / 4.);
        let (rect, mut response) =
            ui.allocate_exact_size(Vec2::splat(desired_radius * 2.), Sense::click_and_drag());
        let span = f32::from(max - min);
        // the angle (degrees) covered by each value
        let part_angle = 360. / (span + 1.);
        if response.dragged() || response.clicked() {
            if let Some(pointer) = response.interact_pointer_pos() {
                let steps = steps_at_angle((pointer - rect.center()).angle().to_degrees(), span);
                let new_value = N::from_f64(f64::from(steps)) + min;
                if f32::from(new_value) != f32::from(*value) {
                    *value = new_value;
                    response.mark_changed();
                }
            }
        }
        let visuals = ui.style().interact(&response);
        ui.painter().circle_filled(
            rect.center(),
            desired_radius,
            fill.unwrap_or(visuals.bg_fill),
        );
        let border_stroke = stroke.unwrap_or(visuals.fg_stroke);
        ui.painter()
            .circle_stroke(rect.center(), desired_radius, border_stroke);
        // we subtract 90 so the first value sits at the top
        let angle = part_angle.mul_add(f32::from(*value - min), -90.);
        let tip = rect.center() + Vec2::angled(angle.to_radians()) * desired_radius;
        let mut hand_stroke = visuals.fg_stroke;
        if let Some(color) = hand_color {
            hand_stroke.color = color;
        }

        let dot = rect.center()
            + Vec2::angled(angle.to_radians()) * border_stroke.width.mul_add(-2., desired_radius);
        ui.painter().line_segment([rect.center(), tip], hand_stroke);
        ui.painter().circle_filled(
            dot,
            hand_stroke.width * 2.,
            hand_color.unwrap_or(visuals.fg_stroke.color),
        );
        response
    }
}

/// Inverse of drawing the hand: how many steps past `min` a pointer at `degrees` points to.
///
/// `degrees` is measured like [`Vec2::angle`], so straight up is -90.
fn steps_at_angle(degrees: f32, span: f32) -> f32 {
    let part_angle = 360. / (span + 1.);
    // rem_euclid can round up to exactly 360 just left of the top
    ((degrees + 90.).rem_euclid(360.) / part_angle)
        .floor()
        .min(span)
}

/// 24 hour time picker, a knob each for hours and minutes plus a text box
///
/// writes `HH:MM` into `target` when a knob is turned, and follows `target` when it is typed in
pub struct TimePicker<'a> {
    target: &'a mut String,
}

impl<'a> TimePicker<'a> {
    pub fn new(target: &'a mut String) -> Self {
        Self { target }
    }
}

impl Widget for TimePicker<'_> {
    fn ui(self, ui: &mut egui::Ui) -> egui::Response {
        let Self { target } = self;
        let (mut hour, mut minute) = NaiveTime::parse_from_str(target.trim(), TARGET_TIME_FORMAT)
            .map_or((0, 0), |time| (time.hour() as u8, time.minute() as u8));

        ui.horizontal(|ui| {
            let mut knobs_changed = false;
            ui.vertical(|ui| {
                ui.label("Hour");
                knobs_changed |= ui
                    .add(Knob::new(&mut hour, 0u8, 23).radius(KNOB_RADIUS))
                    .changed();
            });
            ui.vertical(|ui| {
                ui.label("Minute");
                let hand = ui.visuals().selection.bg_fill;
                knobs_changed |= ui
                    .add(Knob::new(&mut minute, 0u8, 59).radius(KNOB_RADIUS).hand_color(hand))
                    .changed();
            });
            if knobs_changed {
                *target = format!("{hour:02}:{minute:02}");
            }
            let mut response = TextEdit::singleline(target)
                .hint_text("HH:MM")
                .desired_width(50.0)
                .char_limit(5)
                .ui(ui);
            if knobs_changed {
                response.mark_changed();
            }
            response
        })
        .inner
    }
}
