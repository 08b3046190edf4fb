use std::fmt::{self, Write as _};

use chrono::{NaiveDateTime, NaiveTime, Timelike};
use thiserror::Error;

use crate::{
    config::{is_valid_time_format, DEFAULT_TIME_FORMAT},
    media,
};

pub const TARGET_TIME_FORMAT: &str = "%H:%M";

/// what the user typed in, only editable while no alarm is set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlarmConfig {
    /// `HH:MM`, empty until picked
    pub target_time: String,
    pub media_link: String,
}

impl AlarmConfig {
    #[must_use]
    pub fn new(target_time: impl Into<String>, media_link: impl Into<String>) -> Self {
        Self {
            target_time: target_time.into(),
            media_link: media_link.into(),
        }
    }

    #[must_use]
    pub fn media_id(&self) -> Option<String> {
        media::extract_media_id(&self.media_link)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingField {
    Time,
    Link,
    Both,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Time => "an alarm time",
            Self::Link => "a video link",
            Self::Both => "both an alarm time and a video link",
        })
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArmError {
    #[error("please set {0}")]
    IncompleteConfiguration(MissingField),
    #[error("alarm time {0:?} is not in HH:MM format")]
    InvalidTime(String),
    #[error("an alarm is already set")]
    AlreadyArmed,
}

/// the configuration an alarm was armed with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArmedAlarm {
    pub time: NaiveTime,
    pub link: String,
}

impl ArmedAlarm {
    /// any moment within the target minute matches
    #[must_use]
    pub fn matches(&self, now: NaiveTime) -> bool {
        now.hour() == self.time.hour() && now.minute() == self.time.minute()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AlarmState {
    #[default]
    Idle,
    Armed(ArmedAlarm),
    /// the link has been opened for this arming
    Ringing(ArmedAlarm),
}

impl AlarmState {
    /// the one-shot guard, only set once the alarm has gone off
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        matches!(self, Self::Ringing(_))
    }
}

/// where a ringing alarm sends its link
pub trait LinkOpener {
    /// fire and forget, there is nothing to wait on
    fn open(&mut self, link: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryAction {
    SetAlarm,
    CancelAlarm,
    StopAlarm,
}

impl fmt::Display for PrimaryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SetAlarm => "Set Alarm",
            Self::CancelAlarm => "Cancel Alarm",
            Self::StopAlarm => "Stop Alarm",
        })
    }
}

/// All of the alarm clock's state: the live clock, what the user entered and where the alarm is at.
///
/// Driven from the outside by [`AlarmWidget::tick`], which the app calls for every tick of its
/// [`Ticker`](crate::ticker::Ticker).
#[derive(Debug, Clone)]
pub struct AlarmWidget {
    draft: AlarmConfig,
    state: AlarmState,
    wall_clock: String,
    time_format: String,
}

impl AlarmWidget {
    /// an unusable `time_format` falls back to the default one
    #[must_use]
    pub fn new(time_format: impl Into<String>) -> Self {
        let mut widget = Self {
            draft: AlarmConfig::default(),
            state: AlarmState::Idle,
            wall_clock: String::new(),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        };
        widget.set_time_format(time_format);
        widget
    }

    #[must_use]
    pub fn with_config(mut self, config: AlarmConfig) -> Self {
        self.draft = config;
        self
    }

    #[must_use]
    pub const fn state(&self) -> &AlarmState {
        &self.state
    }

    #[must_use]
    pub const fn config(&self) -> &AlarmConfig {
        &self.draft
    }

    /// `None` once armed, the alarm can't be changed out from under itself
    pub fn draft_mut(&mut self) -> Option<&mut AlarmConfig> {
        match self.state {
            AlarmState::Idle => Some(&mut self.draft),
            AlarmState::Armed(_) | AlarmState::Ringing(_) => None,
        }
    }

    #[must_use]
    pub fn wall_clock(&self) -> &str {
        &self.wall_clock
    }

    /// Switches the clock format, keeping the current one if `time_format` can't be rendered.
    ///
    /// Returns whether the new format was taken.
    pub fn set_time_format(&mut self, time_format: impl Into<String>) -> bool {
        let time_format = time_format.into();
        if is_valid_time_format(&time_format) {
            self.time_format = time_format;
            true
        } else {
            log::warn!("ignoring clock format {time_format:?}, keeping {:?}", self.time_format);
            false
        }
    }

    #[must_use]
    pub fn time_format(&self) -> &str {
        &self.time_format
    }

    #[must_use]
    pub fn preview_url(&self) -> Option<String> {
        media::preview_url(&self.draft.media_link)
    }

    pub fn arm(&mut self) -> Result<(), ArmError> {
        if !matches!(self.state, AlarmState::Idle) {
            return Err(ArmError::AlreadyArmed);
        }
        let time = self.draft.target_time.trim();
        // the link is opened exactly as typed
        let link = self.draft.media_link.as_str();
        let missing = match (time.is_empty(), link.is_empty()) {
            (true, true) => Some(MissingField::Both),
            (true, false) => Some(MissingField::Time),
            (false, true) => Some(MissingField::Link),
            (false, false) => None,
        };
        if let Some(missing) = missing {
            log::warn!("refusing to set alarm, missing {missing}");
            return Err(ArmError::IncompleteConfiguration(missing));
        }
        let time = NaiveTime::parse_from_str(time, TARGET_TIME_FORMAT).map_err(|_| {
            log::warn!("refusing to set alarm, bad time {time:?}");
            ArmError::InvalidTime(time.to_string())
        })?;
        log::info!("alarm set for {} with {link}", time.format(TARGET_TIME_FORMAT));
        self.state = AlarmState::Armed(ArmedAlarm {
            time,
            link: link.to_string(),
        });
        Ok(())
    }

    /// cancels an armed alarm or stops a ringing one, either way back to idle
    pub fn dismiss(&mut self) {
        match std::mem::take(&mut self.state) {
            AlarmState::Idle => {}
            AlarmState::Armed(alarm) => {
                log::info!("alarm for {} cancelled", alarm.time.format(TARGET_TIME_FORMAT));
            }
            AlarmState::Ringing(alarm) => {
                log::info!("alarm for {} stopped", alarm.time.format(TARGET_TIME_FORMAT));
            }
        }
    }

    /// Updates the clock and rings the alarm if its minute has come.
    ///
    /// Returns `true` only on the tick that started ringing.
    pub fn tick(&mut self, now: NaiveDateTime, opener: &mut impl LinkOpener) -> bool {
        self.wall_clock.clear();
        if write!(self.wall_clock, "{}", now.format(&self.time_format)).is_err() {
            self.wall_clock = now.format(DEFAULT_TIME_FORMAT).to_string();
        }
        let alarm = match &self.state {
            AlarmState::Armed(alarm) if alarm.matches(now.time()) => alarm.clone(),
            _ => return false,
        };
        let link = alarm.link.clone();
        // flip to ringing before opening so no later tick can open it again
        self.state = AlarmState::Ringing(alarm);
        log::info!("alarm ringing, opening {link}");
        opener.open(&link);
        true
    }

    /// opens the link again for a ringing alarm, for when the first one didn't show up
    pub fn reopen(&self, opener: &mut impl LinkOpener) -> bool {
        if let AlarmState::Ringing(alarm) = &self.state {
            log::info!("reopening {}", alarm.link);
            opener.open(&alarm.link);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub const fn primary_action(&self) -> PrimaryAction {
        match self.state {
            AlarmState::Idle => PrimaryAction::SetAlarm,
            AlarmState::Armed(_) => PrimaryAction::CancelAlarm,
            AlarmState::Ringing(_) => PrimaryAction::StopAlarm,
        }
    }

    /// what the main button does right now
    pub fn press_primary(&mut self) -> Result<(), ArmError> {
        match self.primary_action() {
            PrimaryAction::SetAlarm => self.arm(),
            PrimaryAction::CancelAlarm | PrimaryAction::StopAlarm => {
                self.dismiss();
                Ok(())
            }
        }
    }

    #[must_use]
    pub fn status(&self) -> Option<String> {
        match &self.state {
            AlarmState::Idle => None,
            AlarmState::Armed(alarm) => Some(format!(
                "Alarm set for {}",
                alarm.time.format(TARGET_TIME_FORMAT)
            )),
            AlarmState::Ringing(_) => {
                Some("Alarm is ringing! Check your browser.".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const LINK: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    #[derive(Default)]
    struct RecordingOpener {
        opened: Vec<String>,
    }

    impl LinkOpener for RecordingOpener {
        fn open(&mut self, link: &str) {
            self.opened.push(link.to_string());
        }
    }

    fn at(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .expect("valid test time")
    }

    fn widget(time: &str, link: &str) -> AlarmWidget {
        AlarmWidget::new("%H:%M:%S").with_config(AlarmConfig::new(time, link))
    }

    #[test]
    fn arming_complete_config_succeeds() {
        let mut alarm = widget("08:00", LINK);
        alarm.arm().expect("complete config should arm");
        assert_eq!(
            alarm.state(),
            &AlarmState::Armed(ArmedAlarm {
                time: NaiveTime::from_hms_opt(8, 0, 0).expect("valid time"),
                link: LINK.to_string(),
            })
        );
        assert!(!alarm.state().is_triggered());
        assert_eq!(alarm.primary_action(), PrimaryAction::CancelAlarm);
        assert_eq!(alarm.status().as_deref(), Some("Alarm set for 08:00"));
    }

    #[test]
    fn arming_with_unparsable_link_still_succeeds() {
        let mut alarm = widget("08:00", "not a link");
        alarm.arm().expect("any non-empty link should arm");
        assert_eq!(alarm.preview_url(), None);
    }

    #[test]
    fn arming_incomplete_config_stays_idle() {
        let cases = [
            ("", LINK, MissingField::Time),
            ("08:00", "", MissingField::Link),
            ("", "", MissingField::Both),
            ("   ", LINK, MissingField::Time),
        ];
        for (time, link, missing) in cases {
            let mut alarm = widget(time, link);
            assert_eq!(
                alarm.arm(),
                Err(ArmError::IncompleteConfiguration(missing))
            );
            assert_eq!(alarm.state(), &AlarmState::Idle);
            assert_eq!(alarm.primary_action(), PrimaryAction::SetAlarm);
        }
    }

    #[test]
    fn blank_link_arms_and_opens_verbatim() {
        let mut alarm = widget(" 08:00 ", "   ");
        let mut opener = RecordingOpener::default();
        alarm.arm().expect("a non-empty link should arm");
        alarm.tick(at(1, 8, 0, 0), &mut opener);
        assert_eq!(opener.opened, vec!["   ".to_string()]);

        let padded = format!("  {LINK} ");
        let mut alarm = widget("08:00", &padded);
        let mut opener = RecordingOpener::default();
        alarm.arm().expect("arm");
        alarm.tick(at(1, 8, 0, 0), &mut opener);
        assert_eq!(opener.opened, vec![padded]);
    }

    #[test]
    fn bad_clock_formats_are_ignored() {
        let mut opener = RecordingOpener::default();
        for format in ["%", "%Q", "%H:%", "%Z"] {
            let mut alarm = AlarmWidget::new(format);
            assert_eq!(alarm.time_format(), DEFAULT_TIME_FORMAT, "{format}");
            alarm.tick(at(1, 8, 0, 3), &mut opener);
            assert_eq!(alarm.wall_clock(), " 8:00:03 AM");
        }

        let mut alarm = AlarmWidget::new("%H:%M:%S");
        assert!(!alarm.set_time_format("%"));
        assert!(!alarm.set_time_format("%Q"));
        alarm.tick(at(1, 8, 0, 3), &mut opener);
        assert_eq!(alarm.wall_clock(), "08:00:03");
        assert!(alarm.set_time_format("%H:%M"));
        alarm.tick(at(1, 8, 0, 3), &mut opener);
        assert_eq!(alarm.wall_clock(), "08:00");
    }

    #[test]
    fn arming_bad_time_is_rejected() {
        let mut alarm = widget("8 o'clock", LINK);
        assert_eq!(
            alarm.arm(),
            Err(ArmError::InvalidTime("8 o'clock".to_string()))
        );
        assert_eq!(alarm.state(), &AlarmState::Idle);
    }

    #[test]
    fn arming_twice_is_rejected() {
        let mut alarm = widget("08:00", LINK);
        alarm.arm().expect("first arm");
        assert_eq!(alarm.arm(), Err(ArmError::AlreadyArmed));
    }

    #[test]
    fn config_is_locked_while_armed() {
        let mut alarm = widget("08:00", LINK);
        assert!(alarm.draft_mut().is_some());
        alarm.arm().expect("arm");
        assert!(alarm.draft_mut().is_none());
        alarm.tick(at(1, 8, 0, 1), &mut RecordingOpener::default());
        assert!(alarm.draft_mut().is_none());
        alarm.dismiss();
        assert!(alarm.draft_mut().is_some());
    }

    #[test]
    fn ticks_update_wall_clock_without_an_alarm() {
        let mut alarm = widget("", "");
        let mut opener = RecordingOpener::default();
        assert!(!alarm.tick(at(1, 7, 59, 58), &mut opener));
        assert_eq!(alarm.wall_clock(), "07:59:58");
        assert!(opener.opened.is_empty());
    }

    #[test]
    fn rings_once_across_the_matching_minute() {
        let mut alarm = widget("08:00", LINK);
        let mut opener = RecordingOpener::default();
        alarm.arm().expect("arm");

        assert!(!alarm.tick(at(1, 7, 59, 59), &mut opener));
        assert!(alarm.tick(at(1, 8, 0, 0), &mut opener));
        for s in 1..60 {
            assert!(!alarm.tick(at(1, 8, 0, s), &mut opener));
        }
        assert_eq!(opener.opened, vec![LINK.to_string()]);
        assert!(alarm.state().is_triggered());
    }

    #[test]
    fn does_not_ring_outside_the_minute() {
        let mut alarm = widget("08:00", LINK);
        let mut opener = RecordingOpener::default();
        alarm.arm().expect("arm");
        alarm.tick(at(1, 8, 1, 0), &mut opener);
        alarm.tick(at(1, 20, 0, 0), &mut opener);
        assert!(opener.opened.is_empty());
        assert_eq!(alarm.primary_action(), PrimaryAction::CancelAlarm);
    }

    #[test]
    fn cancelling_before_ringing_never_opens() {
        let mut alarm = widget("08:00", LINK);
        let mut opener = RecordingOpener::default();
        alarm.arm().expect("arm");
        alarm.press_primary().expect("cancel");
        assert_eq!(alarm.state(), &AlarmState::Idle);
        alarm.tick(at(1, 8, 0, 0), &mut opener);
        assert!(opener.opened.is_empty());
    }

    #[test]
    fn dismissal_resets_and_rearming_rings_again() {
        let mut alarm = widget("08:00", LINK);
        let mut opener = RecordingOpener::default();
        alarm.arm().expect("arm");
        alarm.tick(at(1, 8, 0, 3), &mut opener);
        assert_eq!(alarm.primary_action(), PrimaryAction::StopAlarm);

        alarm.press_primary().expect("stop");
        assert_eq!(alarm.state(), &AlarmState::Idle);
        assert!(!alarm.state().is_triggered());

        // not re-armed, nothing happens the next day
        alarm.tick(at(2, 8, 0, 3), &mut opener);
        assert_eq!(opener.opened.len(), 1);

        alarm.arm().expect("re-arm");
        alarm.tick(at(3, 8, 0, 3), &mut opener);
        alarm.tick(at(3, 8, 0, 4), &mut opener);
        assert_eq!(opener.opened.len(), 2);
    }

    #[test]
    fn reopen_only_while_ringing() {
        let mut alarm = widget("08:00", LINK);
        let mut opener = RecordingOpener::default();
        assert!(!alarm.reopen(&mut opener));
        alarm.arm().expect("arm");
        assert!(!alarm.reopen(&mut opener));
        alarm.tick(at(1, 8, 0, 0), &mut opener);
        assert!(alarm.reopen(&mut opener));
        assert_eq!(opener.opened.len(), 2);
    }

    #[test]
    fn wakes_up_at_eight() {
        let mut alarm = AlarmWidget::new("%H:%M:%S");
        let mut opener = RecordingOpener::default();
        if let Some(draft) = alarm.draft_mut() {
            draft.target_time = "08:00".to_string();
            draft.media_link = LINK.to_string();
        }
        assert_eq!(
            alarm.preview_url().as_deref(),
            Some("https://img.youtube.com/vi/dQw4w9WgXcQ/0.jpg")
        );
        alarm.press_primary().expect("arm");

        assert!(alarm.tick(at(1, 8, 0, 3), &mut opener));
        assert_eq!(alarm.wall_clock(), "08:00:03");
        assert!(matches!(alarm.state(), AlarmState::Ringing(_)));
        assert_eq!(opener.opened, vec![LINK.to_string()]);
        assert_eq!(
            alarm.status().as_deref(),
            Some("Alarm is ringing! Check your browser.")
        );
    }
}
