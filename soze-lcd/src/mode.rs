//! LED and LCD modes.
//!
//! A mode is picked by name from the command line and built by a plain
//! factory; there is no registry.

use std::time::Duration;

use anyhow::bail;
use chrono::{NaiveTime, Timelike};
use clap::ValueEnum;
use log::error;

use soze_core::color::BLACK;
use soze_core::{render_big_text, Color, FadeSequencer};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LedModeName {
    Off,
    Static,
    Fade,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LcdModeName {
    Off,
    Clock,
}

/// Inputs the LED modes draw on.
#[derive(Clone, Debug, PartialEq)]
pub struct LedSettings {
    pub static_color: Color,
    pub fade_colors: Vec<Color>,
    pub fade_time: Duration,
}

/// Inputs the LCD modes draw on.
#[derive(Clone, Debug, PartialEq)]
pub struct LcdSettings {
    pub color: Color,
}

pub enum LedMode {
    Off,
    Static(Color),
    Fade {
        colors: Vec<Color>,
        step: Duration,
        sequencer: FadeSequencer,
    },
}

impl LedMode {
    pub fn from_name(name: LedModeName, settings: &LedSettings) -> anyhow::Result<Self> {
        let mode = match name {
            LedModeName::Off => LedMode::Off,
            LedModeName::Static => LedMode::Static(settings.static_color),
            LedModeName::Fade => {
                if settings.fade_time.is_zero() {
                    bail!("fade time must be greater than zero");
                }
                LedMode::Fade {
                    colors: settings.fade_colors.clone(),
                    step: settings.fade_time,
                    sequencer: FadeSequencer::new(),
                }
            }
        };
        Ok(mode)
    }

    /// LED color at `now`, measured from any fixed starting point.
    pub fn color(&mut self, now: Duration) -> Color {
        match self {
            LedMode::Off => BLACK,
            LedMode::Static(color) => *color,
            LedMode::Fade {
                colors,
                step,
                sequencer,
            } => sequencer.current_color(colors, *step, now),
        }
    }
}

pub enum LcdMode {
    Off,
    Clock { color: Color },
}

impl LcdMode {
    pub fn from_name(name: LcdModeName, settings: &LcdSettings) -> Self {
        match name {
            LcdModeName::Off => LcdMode::Off,
            LcdModeName::Clock => LcdMode::Clock {
                color: settings.color,
            },
        }
    }

    pub fn color(&self) -> Color {
        match self {
            LcdMode::Off => BLACK,
            LcdMode::Clock { color } => *color,
        }
    }

    /// Display lines for local time `time`.
    pub fn text(&self, time: NaiveTime) -> Vec<String> {
        match self {
            LcdMode::Off => Vec::new(),
            LcdMode::Clock { .. } => {
                let clock = format!("{:02}:{:02}", time.hour(), time.minute());
                match render_big_text(&clock) {
                    Ok(blocks) => blocks.into_iter().flatten().collect(),
                    Err(e) => {
                        error!("clock: {e}");
                        Vec::new()
                    }
                }
            }
        }
    }
}
