//! The fixed set of paths the device understands.

use std::fmt;
use std::str::FromStr;

use crate::error::DeviceError;

/// A device command. Each maps to exactly one GET path on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Root path, answered with a greeting when the device is up
    Root,
    On,
    Off,
    Forward,
    Backward,
    Stop,
    SpeedUp,
    SpeedDown,
    Max,
    Medium,
}

impl Command {
    pub const ALL: [Command; 10] = [
        Command::Root,
        Command::On,
        Command::Off,
        Command::Forward,
        Command::Backward,
        Command::Stop,
        Command::SpeedUp,
        Command::SpeedDown,
        Command::Max,
        Command::Medium,
    ];

    /// Best-effort motion and speed commands whose replies are ignored.
    pub const MOTION: [Command; 7] = [
        Command::Forward,
        Command::Backward,
        Command::Stop,
        Command::SpeedUp,
        Command::SpeedDown,
        Command::Max,
        Command::Medium,
    ];

    /// Path appended to the device base address. Case matters to the device.
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::On => "/On",
            Self::Off => "/Off",
            Self::Forward => "/forward",
            Self::Backward => "/backward",
            Self::Stop => "/stop",
            Self::SpeedUp => "/speedup",
            Self::SpeedDown => "/speeddown",
            Self::Max => "/max",
            Self::Medium => "/medium",
        }
    }

    pub fn is_motion(self) -> bool {
        Self::MOTION.contains(&self)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Command {
    type Err = DeviceError;

    /// Accepts the bare name (`forward`, `ON`) or the path itself (`/forward`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name == "/" {
            return Ok(Self::Root);
        }
        let name = name.trim_start_matches('/');

        Self::ALL
            .into_iter()
            .find(|c| *c != Self::Root && c.path()[1..].eq_ignore_ascii_case(name))
            .or_else(|| match name.to_ascii_lowercase().as_str() {
                "root" | "ping" => Some(Self::Root),
                "up" => Some(Self::Forward),
                "down" => Some(Self::Backward),
                _ => None,
            })
            .ok_or_else(|| DeviceError::UnknownCommand(s.to_string()))
    }
}
