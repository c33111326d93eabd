#![no_main]
use libfuzzer_sys::fuzz_target;
use octoheat::octoprint::api::{parse_bed_state, parse_job_info, parse_version_supported};

fuzz_target!(|data: &[u8]| {
    // Only well-formed JSON reaches the parsers in practice
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    // None of these may panic, whatever shape the printer answers with
    let _ = parse_version_supported(&value);
    let _ = parse_bed_state(&value);
    let _ = parse_job_info(value);
});
