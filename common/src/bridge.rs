use serde::Serialize;
use serde_json::json;

use crate::calibration::round_display;
use crate::state::ControlState;

/// Setpoint drift past which the companion unit's power is forced off,
/// guarding against a stuck or runaway unit.
const RUNAWAY_MARGIN: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AcMode {
    #[serde(rename = "H")]
    Heat,
    #[serde(rename = "C")]
    Cool,
    #[serde(rename = "A")]
    Auto,
}

/// Per-tick companion-unit control message; derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcControlMessage {
    pub mode: AcMode,
    pub power: bool,
    pub auto_power: bool,
    pub target_temp: f32,
    /// 1 (quiet) to 4 (full) by distance from target.
    pub fan_speed: u8,
    pub env: f32,
    pub band: (f32, f32),
}

/// Derives the companion AC message from the current control state, the
/// hysteresis band and an optional outside-temperature reading.
pub fn derive_message(
    state: &ControlState,
    hysteresis: f32,
    summer_threshold: f32,
    outside_temp: Option<f32>,
) -> AcControlMessage {
    let mode = if state.heat {
        AcMode::Heat
    } else if state.cool {
        AcMode::Cool
    } else {
        AcMode::Auto
    };

    let auto_power = match mode {
        AcMode::Auto => false,
        // No heating call while it is summer outside.
        AcMode::Heat => !outside_temp.is_some_and(|outside| outside > summer_threshold),
        AcMode::Cool => true,
    };

    // Push one band harder the further the room is from target.
    let target_temp = if state.current_temp < state.set_temp {
        state.set_temp + hysteresis
    } else if state.current_temp > state.set_temp {
        state.set_temp - hysteresis
    } else {
        state.set_temp
    };

    let rounded = round_display(state.current_temp);
    let runaway = match mode {
        AcMode::Heat => rounded >= state.set_temp + RUNAWAY_MARGIN,
        AcMode::Cool => rounded <= state.set_temp - RUNAWAY_MARGIN,
        AcMode::Auto => false,
    };
    let power = (state.heat || state.cool) && !runaway;

    let gap = (target_temp - state.current_temp).abs();
    let fan_speed = if gap <= 1.0 {
        1
    } else if gap <= 2.0 {
        2
    } else if gap <= 4.0 {
        3
    } else {
        4
    };

    AcControlMessage {
        mode,
        power,
        auto_power,
        target_temp,
        fan_speed,
        env: state.current_temp,
        band: (state.set_temp - hysteresis, state.set_temp + hysteresis),
    }
}

impl AcControlMessage {
    /// State payload published on `command/<name>`.
    pub fn state_payload(&self) -> serde_json::Value {
        json!({
            "heat": self.mode == AcMode::Heat,
            "mode": self.mode,
            "power": self.power,
            "autop": self.auto_power,
            "autot": self.target_temp,
            "fan": self.fan_speed,
        })
    }

    /// Control envelope published on `command/<name>/control`.
    pub fn control_payload(&self) -> serde_json::Value {
        json!({
            "env": self.env,
            "target": [self.band.0, self.band.1],
        })
    }
}
