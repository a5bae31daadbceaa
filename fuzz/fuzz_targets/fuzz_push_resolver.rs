#![no_main]

use libfuzzer_sys::fuzz_target;
use shelfgrid_layout::{
    Cell, HorizontalBias, ItemId, Placement, PushRequest, VacatedCell, resolve_push,
};

fuzz_target!(|data: &[u8]| {
    // Header: cols (1..=16), target col, bias/vacated flags, mover origin col.
    if data.len() < 4 {
        return;
    }
    let cols = u16::from(data[0] % 16) + 1;
    let target = Cell::new(0, u16::from(data[1]) % cols);
    let bias = if data[2] & 1 == 0 {
        HorizontalBias::Right
    } else {
        HorizontalBias::Left
    };
    let vacated = if data[2] & 2 == 0 {
        VacatedCell::Pinned
    } else {
        VacatedCell::Reusable
    };
    let origin = Cell::new(u16::from(data[2] >> 7), u16::from(data[3]) % cols);

    // One payload bit per column decides whether the row slot is filled.
    let mut placement = Placement::new();
    let mover = ItemId::from("mover");
    placement.insert(mover.clone(), origin);
    for (col, byte) in data[4..].iter().take(usize::from(cols)).enumerate() {
        let cell = Cell::new(0, col as u16);
        if byte & 1 == 1 && cell != origin {
            placement.insert(ItemId::new(format!("i{col}")), cell);
        }
    }

    let request = PushRequest::new(&mover, target, bias, cols).with_origin(origin, vacated);
    match resolve_push(&placement, &request) {
        Ok(resolution) => {
            let after = resolution.working();
            assert!(after.is_conflict_free(), "resolution produced overlap");
            assert_eq!(after.get(&mover), Some(target), "mover not at target");
            assert_eq!(after.len(), placement.len(), "items lost or duplicated");
            for (id, cell) in after.iter() {
                assert!(cell.col < cols, "{id} pushed off the row");
                if id != &mover {
                    assert_eq!(placement.get(id).map(|c| c.row), Some(cell.row), "{id} changed rows");
                }
            }
        }
        Err(blocked) => {
            assert_eq!(blocked.target, target);
        }
    }
});
