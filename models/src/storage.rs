//! Storage cell addressing.
//!
//! The terminal's storage is a fixed grid `A1`..`J9`. Cells are assigned in
//! the order of [`STORAGE_CELL_ORDER`]; occupancy itself is owned by the
//! backend and reported per domain.

use crate::error::model_error::ModelError;

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FormatResult};
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

const CELL_ADDRESS_PATTERN: &str = r"^[A-J][1-9]$";

static CELL_ADDRESS_REGEX: OnceLock<Regex> = OnceLock::new();

fn cell_address_regex() -> &'static Regex {
    CELL_ADDRESS_REGEX.get_or_init(|| Regex::new(CELL_ADDRESS_PATTERN).expect("valid regex pattern"))
}

/// Every storage address, in assignment order.
pub const STORAGE_CELL_ORDER: [&str; 90] = [
    "A1", "A2", "A3", "A4", "A5", "A6", "A7", "A8", "A9", //
    "B1", "B2", "B3", "B4", "B5", "B6", "B7", "B8", "B9", //
    "C1", "C2", "C3", "C4", "C5", "C6", "C7", "C8", "C9", //
    "D1", "D2", "D3", "D4", "D5", "D6", "D7", "D8", "D9", //
    "E1", "E2", "E3", "E4", "E5", "E6", "E7", "E8", "E9", //
    "F1", "F2", "F3", "F4", "F5", "F6", "F7", "F8", "F9", //
    "G1", "G2", "G3", "G4", "G5", "G6", "G7", "G8", "G9", //
    "H1", "H2", "H3", "H4", "H5", "H6", "H7", "H8", "H9", //
    "I1", "I2", "I3", "I4", "I5", "I6", "I7", "I8", "I9", //
    "J1", "J2", "J3", "J4", "J5", "J6", "J7", "J8", "J9", //
];

/// Occupied cells keyed by the domain that holds them.
pub type OccupiedCells = HashMap<String, Vec<String>>;

/// A validated storage address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorageCell(String);

impl StorageCell {
    #[track_caller]
    pub fn parse(address: &str) -> Result<Self, ModelError> {
        if cell_address_regex().is_match(address) {
            Ok(Self(address.to_string()))
        } else {
            Err(ModelError::validation(format!(
                "Invalid storage cell address '{address}' (expected A1-J9)"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for StorageCell {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        formatter.write_str(&self.0)
    }
}

impl FromStr for StorageCell {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StorageCell::parse(s)
    }
}

impl TryFrom<String> for StorageCell {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        StorageCell::parse(&value)
    }
}

impl From<StorageCell> for String {
    fn from(cell: StorageCell) -> Self {
        cell.0
    }
}

/// First address in assignment order that no domain currently occupies.
pub fn first_free_cell(occupied: &OccupiedCells) -> Option<StorageCell> {
    STORAGE_CELL_ORDER
        .iter()
        .find(|address| {
            !occupied
                .values()
                .any(|cells| cells.iter().any(|cell| cell == *address))
        })
        .map(|address| StorageCell(address.to_string()))
}
