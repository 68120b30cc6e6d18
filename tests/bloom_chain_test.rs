use ember_ngin::pipelines::bloom::mip_chain_extents;
use ember_ngin::slots::{MAX_SLOTS, SlotId, SlotTable};

#[test]
fn every_mip_is_the_surface_halved_once_more() {
    let (width, height) = (1920u32, 1080u32);
    let extents = mip_chain_extents(width, height, 5);

    let (mut w, mut h) = (width, height);
    for (i, &(mip_w, mip_h)) in extents.iter().enumerate() {
        w /= 2;
        h /= 2;
        assert_eq!((mip_w, mip_h), (w, h), "mip {i}");
    }
}

#[test]
fn upsample_visits_the_same_extents_in_reverse() {
    let extents = mip_chain_extents(640, 480, 5);
    // Coarsest mip is read-only during upsample; destinations walk back up.
    let destinations: Vec<_> = extents.iter().rev().skip(1).copied().collect();
    assert_eq!(
        destinations,
        vec![(40, 30), (80, 60), (160, 120), (320, 240)]
    );
}

#[test]
fn chain_slots_fit_the_table() {
    let table = SlotTable::new(MAX_SLOTS - 3);
    assert!(table.needs_configure(SlotId::BloomMip(MAX_SLOTS - 4), false));
}

#[test]
#[should_panic(expected = "exceeds slot capacity")]
fn oversized_chain_is_rejected_at_construction() {
    SlotTable::new(MAX_SLOTS - 2);
}

#[test]
fn fresh_table_wants_to_configure_every_pipeline_slot() {
    let table = SlotTable::new(5);
    for id in [
        SlotId::HdrColor,
        SlotId::HdrBright,
        SlotId::HdrDepth,
        SlotId::BloomMip(0),
        SlotId::BloomMip(4),
    ] {
        assert!(table.needs_configure(id, false), "{id:?}");
    }
}
