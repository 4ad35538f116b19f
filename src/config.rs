use serde::{Deserialize, Serialize};

/// What a tap in the middle zone does when nothing else claims it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MiddleTapAction {
    /// Reserved for the host UI (menu toggle etc.); the engine stays quiet.
    #[default]
    None,
    NextPage,
}

/// Tunables for gesture recognition and rendering. Serialized alongside the
/// host app's settings file; every field has a default so partial configs
/// deserialize cleanly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Press duration that starts a selection, in ms.
    pub long_press_ms: u64,
    /// Max pointer travel for a press to still count as a tap/long-press, px.
    pub tap_slop: f32,
    /// Grab radius around a selection handle, px.
    pub handle_hit_radius: f32,
    /// Dwell at a page edge during a selection drag before the page turns, ms.
    pub edge_hold_ms: u64,
    /// Fraction of the viewport width forming each tap-to-turn side zone.
    pub tap_zone_fraction: f32,
    pub middle_tap: MiddleTapAction,
    pub magnifier_scale: f32,
    pub magnifier_radius: f32,
    /// Vertical gap between the touch point and the magnifier center, px.
    pub magnifier_offset: f32,
    pub font_size: f32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            long_press_ms: 500,
            tap_slop: 12.0,
            handle_hit_radius: 24.0,
            edge_hold_ms: 2000,
            tap_zone_fraction: 0.3,
            middle_tap: MiddleTapAction::None,
            magnifier_scale: 1.5,
            magnifier_radius: 150.0,
            magnifier_offset: 100.0,
            font_size: 16.0,
        }
    }
}
