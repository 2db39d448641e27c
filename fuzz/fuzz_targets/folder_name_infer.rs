//! Fuzz target for tower-type inference and label parsing on arbitrary names.

#![no_main]

use libfuzzer_sys::fuzz_target;
use towerlabel::labels::{infer_tower_type, section_from_relative_path, Section, TowerType};

fuzz_target!(|data: &[u8]| {
    let Ok(name) = std::str::from_utf8(data) else {
        return;
    };

    let _ = infer_tower_type(name);
    let _ = name.parse::<TowerType>();
    let _ = name.parse::<Section>();
    let _ = section_from_relative_path(std::path::Path::new(name));
});
