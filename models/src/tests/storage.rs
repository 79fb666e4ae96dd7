use crate::storage::{STORAGE_CELL_ORDER, first_free_cell};
use crate::{ModelError, OccupiedCells, StorageCell};

#[test]
fn given_valid_addresses_when_parsing_then_accepts_grid_bounds() {
    assert_eq!(StorageCell::parse("A1").unwrap().as_str(), "A1");
    assert_eq!(StorageCell::parse("J9").unwrap().as_str(), "J9");
}

#[test]
fn given_addresses_outside_grid_when_parsing_then_returns_validation_error() {
    for address in ["K1", "A0", "a1", "A10", "", " A1"] {
        let result = StorageCell::parse(address);
        assert!(
            matches!(result, Err(ModelError::Validation { .. })),
            "{address:?} should be rejected"
        );
    }
}

/// **VALUE**: Verifies that cells deserialize through the same validation as `parse`.
///
/// **BUG THIS CATCHES**: Would catch a JSONRPC client smuggling `"Z99"` into
/// `storage.extract` because serde bypassed the address check.
#[test]
fn given_invalid_cell_in_json_when_deserializing_then_fails() {
    let valid: StorageCell = serde_json::from_str("\"C4\"").unwrap();
    assert_eq!(valid.to_string(), "C4");

    let invalid = serde_json::from_str::<StorageCell>("\"Z99\"");
    assert!(invalid.is_err());
}

/// **VALUE**: Verifies the assignment order for an empty store starts at `A1`.
///
/// **WHY THIS MATTERS**: Staff physically load the store in this order. Handing out cells
/// out of order would scatter items across the grid.
#[test]
fn given_empty_occupancy_when_picking_cell_then_returns_a1() {
    let occupied = OccupiedCells::new();

    let cell = first_free_cell(&occupied).unwrap();

    assert_eq!(cell.as_str(), "A1");
}

#[test]
fn given_cells_occupied_across_domains_when_picking_then_skips_all_of_them() {
    // GIVEN: A1 held by one domain, A2 by another
    let mut occupied = OccupiedCells::new();
    occupied.insert("shop".to_string(), vec!["A1".to_string()]);
    occupied.insert("pawnshop".to_string(), vec!["A2".to_string()]);

    // WHEN: Picking the next free cell
    let cell = first_free_cell(&occupied).unwrap();

    // THEN: The first address no domain holds
    assert_eq!(cell.as_str(), "A3");
}

#[test]
fn given_every_cell_occupied_when_picking_then_returns_none() {
    let mut occupied = OccupiedCells::new();
    occupied.insert(
        "other".to_string(),
        STORAGE_CELL_ORDER.iter().map(|c| c.to_string()).collect(),
    );

    assert!(first_free_cell(&occupied).is_none());
}
