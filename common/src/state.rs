use serde::{Deserialize, Serialize};

/// Mutable, persisted control record: desired setpoint, the four mode flags
/// and the last-commanded relay outputs.
///
/// Mode flags are written only by the command synchronizer (which enforces
/// heat/cool mutual exclusion); relay fields only by the relay controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub set_temp: f32,
    pub current_temp: f32,
    pub heat: bool,
    pub cool: bool,
    pub fan: bool,
    pub hold: bool,
    pub relay_heat: bool,
    pub relay_cool: bool,
    pub relay_fan: bool,
}

impl ControlState {
    pub fn new(set_temp: f32, current_temp: f32) -> Self {
        Self {
            set_temp,
            current_temp,
            heat: false,
            cool: false,
            fan: false,
            hold: false,
            relay_heat: false,
            relay_cool: false,
            relay_fan: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeFlag {
    Heat,
    Cool,
    Fan,
    Hold,
}

/// Discrete state-change events, reported separately from the continuous
/// temperature/relay logs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StateEvent {
    SetpointChanged(f32),
    ScheduleSetpoint(f32),
    FlagChanged { flag: ModeFlag, on: bool },
    TemperatureChanged(f32),
}

/// Persisted wire form of the control state. The original storage document
/// records toggle positions as `"down"`/`"normal"`, so that mapping is kept.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersistedState {
    #[serde(rename = "setTemp")]
    pub set_temp: f32,
    #[serde(rename = "heatControl")]
    pub heat_control: String,
    #[serde(rename = "coolControl")]
    pub cool_control: String,
    #[serde(rename = "fanControl")]
    pub fan_control: String,
    #[serde(rename = "holdControl")]
    pub hold_control: String,
}

fn flag_str(on: bool) -> String {
    if on { "down" } else { "normal" }.to_string()
}

fn flag_on(value: &str) -> bool {
    value == "down"
}

impl PersistedState {
    pub fn from_control(state: &ControlState) -> Self {
        Self {
            set_temp: state.set_temp,
            heat_control: flag_str(state.heat),
            cool_control: flag_str(state.cool),
            fan_control: flag_str(state.fan),
            hold_control: flag_str(state.hold),
        }
    }

    pub fn into_control(self, current_temp: f32) -> ControlState {
        let mut state = ControlState::new(self.set_temp, current_temp);
        state.heat = flag_on(&self.heat_control);
        state.cool = flag_on(&self.cool_control);
        state.fan = flag_on(&self.fan_control);
        state.hold = flag_on(&self.hold_control);
        // A corrupt document must not violate the mode invariant.
        if state.heat && state.cool {
            state.cool = false;
        }
        state
    }
}

/// Human-readable status answered to the command surface and the
/// full-state MQTT query.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusView {
    pub heat: &'static str,
    pub cool: &'static str,
    pub fan: &'static str,
    pub sched: &'static str,
    #[serde(rename = "setTemp")]
    pub set_temp: f32,
    #[serde(rename = "currentTemp")]
    pub current_temp: f32,
}

impl StatusView {
    pub fn from_control(state: &ControlState, test_schedule: bool) -> Self {
        let sched = if state.hold {
            "Hold"
        } else if test_schedule {
            "Test"
        } else if state.heat {
            "Heat"
        } else if state.cool {
            "Cool"
        } else {
            "None"
        };

        Self {
            heat: if state.relay_heat { "On" } else { "Off" },
            cool: if state.relay_cool { "On" } else { "Off" },
            fan: if state.relay_fan { "On" } else { "Auto" },
            sched,
            set_temp: state.set_temp,
            current_temp: state.current_temp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn persisted_round_trip() {
        let mut state = ControlState::new(21.5, 20.9);
        state.heat = true;
        state.fan = true;

        let doc = PersistedState::from_control(&state);
        assert_eq!(doc.heat_control, "down");
        assert_eq!(doc.cool_control, "normal");

        let restored = doc.into_control(20.9);
        assert_eq!(restored, state);
    }

    #[test]
    fn persisted_json_uses_textual_toggles() {
        let state = ControlState::new(22.0, 22.0);
        let json = serde_json::to_value(PersistedState::from_control(&state)).unwrap();
        assert_eq!(json["setTemp"], 22.0);
        assert_eq!(json["heatControl"], "normal");
        assert_eq!(json["holdControl"], "normal");
    }

    #[test]
    fn corrupt_document_cannot_set_both_modes() {
        let doc = PersistedState {
            set_temp: 22.0,
            heat_control: "down".to_string(),
            cool_control: "down".to_string(),
            fan_control: "normal".to_string(),
            hold_control: "normal".to_string(),
        };
        let state = doc.into_control(22.0);
        assert!(state.heat && !state.cool);
    }

    #[test]
    fn status_strings_follow_relays_and_flags() {
        let mut state = ControlState::new(22.0, 21.0);
        state.heat = true;
        state.relay_heat = true;
        state.relay_fan = true;

        let status = StatusView::from_control(&state, false);
        assert_eq!(status.heat, "On");
        assert_eq!(status.cool, "Off");
        assert_eq!(status.fan, "On");
        assert_eq!(status.sched, "Heat");

        state.hold = true;
        assert_eq!(StatusView::from_control(&state, false).sched, "Hold");
    }
}
