//! Textual control commands for fault injection.
//!
//! ```text
//! break hardware|network|module
//! break storage access|room
//! break eval acceptance|scale
//! seed silver
//! seed fineness <millesimal>
//! delay [multiplier]
//! heal
//! reset
//! status
//! ```
//!
//! `break` and `seed silver` toggle; issuing the same command again undoes it.

use crate::controller::FaultFlag;
use crate::error::control::ControlError;
use crate::rpc::RpcAdapter;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;

use log::Level;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlCommand {
    Break(FaultFlag),
    SeedSilver,
    SeedFineness(u32),
    Delay(f64),
    Heal,
    Reset,
    Status,
}

/// Result of a command, for the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlReport {
    pub level: Level,
    pub message: String,
}

impl ControlReport {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            level: Level::Warn,
            message: message.into(),
        }
    }
}

impl Display for ControlReport {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(&self.message)
    }
}

impl FromStr for ControlCommand {
    type Err = ControlError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let words: Vec<String> = line
            .split_whitespace()
            .map(|word| word.to_ascii_lowercase())
            .collect();
        let words: Vec<&str> = words.iter().map(String::as_str).collect();

        match words.as_slice() {
            ["break", "hardware"] => Ok(ControlCommand::Break(FaultFlag::HardwareFailure)),
            ["break", "network"] => Ok(ControlCommand::Break(FaultFlag::NetworkFailure)),
            ["break", "module"] => Ok(ControlCommand::Break(FaultFlag::ModuleBroken)),
            ["break", "storage", "access"] => {
                Ok(ControlCommand::Break(FaultFlag::StorageAccessForbidden))
            }
            ["break", "storage", "room"] => Ok(ControlCommand::Break(FaultFlag::StorageNoRoom)),
            ["break", "eval", "acceptance"] => Ok(ControlCommand::Break(FaultFlag::EvalRejection)),
            ["break", "eval", "scale"] => Ok(ControlCommand::Break(FaultFlag::UnstableScale)),
            ["seed", "silver"] => Ok(ControlCommand::SeedSilver),
            ["seed", "fineness", value] => value
                .parse()
                .map(ControlCommand::SeedFineness)
                .map_err(|_| ControlError::invalid_argument(format!("not a fineness: {value}"))),
            ["delay"] => Ok(ControlCommand::Delay(1.0)),
            ["delay", value] => value
                .parse()
                .map(ControlCommand::Delay)
                .map_err(|_| ControlError::invalid_argument(format!("not a multiplier: {value}"))),
            ["heal"] => Ok(ControlCommand::Heal),
            ["reset"] => Ok(ControlCommand::Reset),
            ["status"] => Ok(ControlCommand::Status),
            [] => Err(ControlError::unknown_command("empty command")),
            _ => Err(ControlError::unknown_command(line.trim().to_string())),
        }
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "ON" } else { "OFF" }
}

impl ControlCommand {
    /// Applies the command to the terminal behind `adapter`.
    pub fn apply(&self, adapter: &RpcAdapter) -> ControlReport {
        let controller = adapter.controller();

        match *self {
            ControlCommand::Break(flag) => {
                let enabled = controller.toggle(flag);
                let message = format!("{flag}: {}", on_off(enabled));
                if enabled {
                    ControlReport::warn(message)
                } else {
                    ControlReport::info(message)
                }
            }
            ControlCommand::SeedSilver => {
                let silver = controller.seed().toggle_silver();
                ControlReport::info(format!("silver alloy: {}", on_off(silver)))
            }
            ControlCommand::SeedFineness(millesimal) => {
                if controller.seed().set_target_millesimal(millesimal) {
                    ControlReport::info(match millesimal {
                        0 => "target fineness: random".to_string(),
                        _ => format!("target fineness: {millesimal}"),
                    })
                } else {
                    ControlReport::warn(format!(
                        "unknown fineness {millesimal} (use 9999, 999, 925, 750, 585, 375 or 0)"
                    ))
                }
            }
            ControlCommand::Delay(multiplier) => {
                let stored = controller.set_hardware_business_mult(multiplier);
                ControlReport::info(format!("hardware delay multiplier: {stored}"))
            }
            ControlCommand::Heal => {
                controller.heal_api();
                ControlReport::info("all fault flags cleared")
            }
            ControlCommand::Reset => {
                if adapter.reset() {
                    ControlReport::info(format!(
                        "api reset (generation {})",
                        adapter.generation()
                    ))
                } else {
                    ControlReport::warn(format!(
                        "reset refused: {} call(s) in flight, try again",
                        adapter.pending_requests()
                    ))
                }
            }
            ControlCommand::Status => {
                let flags: Vec<String> = controller
                    .faults()
                    .snapshot()
                    .into_iter()
                    .filter(|(_, enabled)| *enabled)
                    .map(|(flag, _)| flag.to_string())
                    .collect();
                let seed = controller.seed();
                ControlReport::info(format!(
                    "faults: [{}], alloy: {}, fineness: {}, delay: {}, pending: {}, generation: {}",
                    flags.join(", "),
                    seed.alloy(),
                    seed.target_millesimal(),
                    controller.hardware_business_mult(),
                    adapter.pending_requests(),
                    adapter.generation(),
                ))
            }
        }
    }
}
