pub mod bridge;
pub mod calibration;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod relay;
pub mod schedule;
pub mod state;
pub mod topics;

pub use bridge::{AcControlMessage, AcMode};
pub use calibration::CalibrationProfile;
pub use command::{Command, CommandOutcome};
pub use config::{SetpointLimits, Settings, TempScale};
pub use engine::ControlEngine;
pub use error::ControlError;
pub use relay::{RelayEvent, RelayOutputs};
pub use schedule::{ScheduleDoc, ScheduleMode, ScheduleRunner, ScheduleTable, Weekday};
pub use state::{ControlState, ModeFlag, PersistedState, StateEvent, StatusView};
pub use topics::*;
