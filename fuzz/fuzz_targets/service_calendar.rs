#![no_main]
use arbitrary::Arbitrary;
use gtfs_feed_core::Feed;
use gtfs_feed_model::{
    Calendar, CalendarDate, ExceptionType, GtfsDate, ServiceAvailability,
};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzData {
    calendars: Vec<CalendarData>,
    calendar_dates: Vec<CalendarDateData>,
    query_service: u8,
    query_date: u32,
}

#[derive(Debug, Arbitrary)]
struct CalendarData {
    service: u8,
    weekdays: [bool; 7],
    start_date: u32, // yyyymmdd
    end_date: u32,
}

#[derive(Debug, Arbitrary)]
struct CalendarDateData {
    service: u8,
    date: u32,
    removed: bool,
}

fn to_date(value: u32) -> Option<GtfsDate> {
    GtfsDate::parse(&format!("{:08}", value)).ok()
}

fn availability(flag: bool) -> ServiceAvailability {
    if flag {
        ServiceAvailability::Available
    } else {
        ServiceAvailability::Unavailable
    }
}

fuzz_target!(|data: FuzzData| {
    let mut feed = Feed::new();

    for item in data.calendars.iter().take(32) {
        let (Some(start_date), Some(end_date)) = (to_date(item.start_date), to_date(item.end_date))
        else {
            continue;
        };
        let [mon, tue, wed, thu, fri, sat, sun] = item.weekdays;
        feed.add_calendar(Calendar {
            service_id: format!("S{}", item.service % 8),
            monday: availability(mon),
            tuesday: availability(tue),
            wednesday: availability(wed),
            thursday: availability(thu),
            friday: availability(fri),
            saturday: availability(sat),
            sunday: availability(sun),
            start_date,
            end_date,
        });
    }

    for item in data.calendar_dates.iter().take(64) {
        let Some(date) = to_date(item.date) else {
            continue;
        };
        feed.add_calendar_date(CalendarDate {
            service_id: format!("S{}", item.service % 8),
            date,
            exception_type: if item.removed {
                ExceptionType::Removed
            } else {
                ExceptionType::Added
            },
        });
    }

    let Some(query) = to_date(data.query_date).and_then(|date| date.to_naive_date()) else {
        return;
    };
    let service_id = format!("S{}", data.query_service % 8);
    let runs = feed.service_runs_on(&service_id, query);

    let Ok(day) = GtfsDate::try_from(query) else {
        assert!(!runs);
        return;
    };
    let exception = feed
        .get_calendar_dates(&service_id, false)
        .into_iter()
        .find(|item| item.date == day);
    if let Some(exception) = exception {
        assert_eq!(runs, exception.exception_type == ExceptionType::Added);
    } else if feed.get_calendar(&service_id).is_none() {
        assert!(!runs);
    }
});
