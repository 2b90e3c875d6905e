#![no_main]
use arbitrary::Arbitrary;
use gtfs_feed_model::{parse_coordinates, GtfsDate, GtfsEnum, GtfsTime, RouteType};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Values {
    time: String,
    date: String,
    latitude: String,
    longitude: String,
    route_type: String,
    hours: u16,
    minutes: u16,
    seconds: u16,
}

fuzz_target!(|values: Values| {
    if let Ok(time) = GtfsTime::parse(&values.time) {
        if time.is_provided() {
            let (h, m, s) = time.hh_mm_ss();
            assert_eq!(time.total_seconds(), h as u32 * 3600 + m as u32 * 60 + s as u32);
            assert_eq!(GtfsTime::parse(&time.to_string()).ok(), Some(time));
        }
    }

    if let Ok(mut time) = GtfsTime::from_hms(values.hours, values.minutes, values.seconds) {
        time.reduce_to_24h();
        assert!(time.hours() < 24);
    }

    if let Ok(date) = GtfsDate::parse(&values.date) {
        if date.is_provided() {
            assert_eq!(date.to_string(), values.date);
            assert!(date.to_naive_date().is_some());
        }
    }

    if let Ok((lat, lon)) = parse_coordinates(&values.latitude, &values.longitude) {
        assert!((-90.0..=90.0).contains(&lat));
        assert!((-180.0..=180.0).contains(&lon));
    }

    if let Ok(route_type) = RouteType::parse_code(&values.route_type) {
        assert_eq!(
            RouteType::parse_code(&route_type.to_string()).ok(),
            Some(route_type)
        );
    }
});
