#![no_main]
use gtfs_feed_core::tokenizer::split_record;
use gtfs_feed_core::{read_table, Feed};
use gtfs_feed_model::StopTime;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        for line in text.lines() {
            let fields = split_record(line, true);
            assert!(!fields.is_empty());
            assert!(fields.iter().all(|field| !field.ends_with(' ')));
        }
    }

    let mut feed = Feed::new();
    let _ = read_table::<StopTime, _>("stop_times", data, &mut feed);
});
