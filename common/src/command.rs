use serde::Deserialize;

use crate::config::SetpointLimits;
use crate::error::ControlError;
use crate::state::{ControlState, ModeFlag, StateEvent};

/// An external command against the control state, from whichever surface
/// produced it (touch UI, web form, message bus). Absent fields leave the
/// corresponding state untouched.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Command {
    #[serde(rename = "setTemp", default)]
    pub set_temp: Option<f32>,
    #[serde(default)]
    pub heat: Option<bool>,
    #[serde(default)]
    pub cool: Option<bool>,
    #[serde(default)]
    pub fan: Option<bool>,
    #[serde(default)]
    pub hold: Option<bool>,
}

#[derive(Debug, Default, PartialEq)]
pub struct CommandOutcome {
    pub events: Vec<StateEvent>,
    /// True when a heat/cool/hold change requires re-deriving the active
    /// schedule.
    pub reload_schedule: bool,
}

/// Snaps a requested setpoint to the configured step, rejecting values
/// outside the slider range.
pub fn validate_setpoint(value: f32, limits: &SetpointLimits) -> Result<f32, ControlError> {
    if !value.is_finite() {
        return Err(ControlError::validation(format!(
            "setpoint {value} is not a finite temperature"
        )));
    }
    let snapped = (value / limits.temp_step).round() * limits.temp_step;
    // Tolerate float noise right at the bounds.
    if snapped < limits.min_temp - 1e-4 || snapped > limits.max_temp + 1e-4 {
        return Err(ControlError::validation(format!(
            "setpoint {value} outside [{}, {}]",
            limits.min_temp, limits.max_temp
        )));
    }
    Ok(snapped)
}

/// Applies a command to the control state. This is the only place mode flags
/// are written from external input: heat and cool are mutually exclusive,
/// and repeated identical commands produce no events.
///
/// Validation happens before any mutation, so a rejected command leaves the
/// state exactly as it was.
pub fn apply(
    state: &mut ControlState,
    limits: &SetpointLimits,
    command: Command,
) -> Result<CommandOutcome, ControlError> {
    let set_temp = command
        .set_temp
        .map(|value| validate_setpoint(value, limits))
        .transpose()?;

    let mut outcome = CommandOutcome::default();

    if let Some(set_temp) = set_temp {
        if state.set_temp != set_temp {
            state.set_temp = set_temp;
            outcome.events.push(StateEvent::SetpointChanged(set_temp));
        }
    }

    let mut set_flag = |state: &mut bool, flag: ModeFlag, on: bool| {
        if *state != on {
            *state = on;
            outcome.events.push(StateEvent::FlagChanged { flag, on });
            if flag != ModeFlag::Fan {
                outcome.reload_schedule = true;
            }
        }
    };

    if let Some(on) = command.heat {
        set_flag(&mut state.heat, ModeFlag::Heat, on);
        if on && state.cool {
            set_flag(&mut state.cool, ModeFlag::Cool, false);
        }
    }
    if let Some(on) = command.cool {
        set_flag(&mut state.cool, ModeFlag::Cool, on);
        if on && state.heat {
            set_flag(&mut state.heat, ModeFlag::Heat, false);
        }
    }
    if let Some(on) = command.fan {
        set_flag(&mut state.fan, ModeFlag::Fan, on);
    }
    if let Some(on) = command.hold {
        set_flag(&mut state.hold, ModeFlag::Hold, on);
    }

    debug_assert!(!(state.heat && state.cool));
    Ok(outcome)
}
