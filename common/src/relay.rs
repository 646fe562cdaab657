use crate::state::ControlState;

/// Logical relay outputs. Active-low inversion for the physical pins is the
/// hardware layer's business, not the state machine's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RelayOutputs {
    pub heat: bool,
    pub cool: bool,
    pub fan: bool,
}

impl RelayOutputs {
    pub fn from_state(state: &ControlState) -> Self {
        Self {
            heat: state.relay_heat,
            cool: state.relay_cool,
            fan: state.relay_fan,
        }
    }
}

/// An edge transition on one relay output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEvent {
    Heat(bool),
    Cool(bool),
    Fan(bool),
}

/// One evaluation of the hysteresis state machine.
///
/// `current_temp` is the unrounded corrected temperature. The previous relay
/// outputs in `state` carry the hysteresis memory: inside the dead band the
/// energized relay stays energized. Re-evaluating with unchanged inputs
/// yields unchanged outputs.
pub fn evaluate(state: &ControlState, current_temp: f32, hysteresis: f32) -> RelayOutputs {
    let set = state.set_temp;
    let mut heat = state.relay_heat;
    let mut cool = state.relay_cool;

    if state.heat {
        cool = false;
        if set >= current_temp + hysteresis {
            heat = true;
        } else if set <= current_temp {
            heat = false;
        }
    } else if state.cool {
        heat = false;
        if set <= current_temp - hysteresis {
            cool = true;
        } else if set >= current_temp {
            cool = false;
        }
    } else {
        heat = false;
        cool = false;
    }

    // Explicit circulate request wins; otherwise the fan follows whichever
    // primary relay is energized and drops only when both are off.
    let fan = state.fan || heat || cool;

    RelayOutputs { heat, cool, fan }
}

pub fn transitions(prev: RelayOutputs, next: RelayOutputs) -> Vec<RelayEvent> {
    let mut events = Vec::new();
    if prev.heat != next.heat {
        events.push(RelayEvent::Heat(next.heat));
    }
    if prev.cool != next.cool {
        events.push(RelayEvent::Cool(next.cool));
    }
    if prev.fan != next.fan {
        events.push(RelayEvent::Fan(next.fan));
    }
    events
}
