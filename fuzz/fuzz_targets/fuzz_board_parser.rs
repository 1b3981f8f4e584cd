#![no_main]

use libfuzzer_sys::fuzz_target;

// Parser und Spatial-Index dürfen bei beliebiger Eingabe nicht paniken.
fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(board) = ecad_viewer::parser::parse_board("fuzz.kicad_pcb", text) {
            let index = ecad_viewer::SpatialIndex::from_board(&board);
            let _ = index.pick_first(&board, glam::Vec2::ZERO, 0.5);
        }
    }
});
