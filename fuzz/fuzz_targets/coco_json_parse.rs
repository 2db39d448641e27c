//! Fuzz target for reading COCO documents back in.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use towerlabel::ir::io_coco_json::{from_coco_slice, to_coco_string};
use towerlabel::validation::{validate_dataset, ValidateOptions};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    // Parse errors are fine; panics are not.
    if let Ok(dataset) = from_coco_slice(data) {
        let _ = validate_dataset(&dataset, &ValidateOptions::default());
        let _ = to_coco_string(&dataset);
    }
});
