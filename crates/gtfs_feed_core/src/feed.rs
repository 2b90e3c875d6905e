use chrono::{Datelike, NaiveDate};
use gtfs_feed_model::{
    Agency, Attribution, Calendar, CalendarDate, ExceptionType, FareAttribute, FareRule,
    FeedInfo, Frequency, GtfsDate, Level, Pathway, Route, ShapePoint, Stop, StopTime, Transfer,
    Translation, TranslationTable, Trip,
};

use crate::CsvTable;

pub const AGENCY_TABLE: &str = "agency";
pub const STOPS_TABLE: &str = "stops";
pub const ROUTES_TABLE: &str = "routes";
pub const TRIPS_TABLE: &str = "trips";
pub const STOP_TIMES_TABLE: &str = "stop_times";
pub const CALENDAR_TABLE: &str = "calendar";
pub const CALENDAR_DATES_TABLE: &str = "calendar_dates";
pub const SHAPES_TABLE: &str = "shapes";
pub const TRANSFERS_TABLE: &str = "transfers";
pub const FREQUENCIES_TABLE: &str = "frequencies";
pub const FARE_ATTRIBUTES_TABLE: &str = "fare_attributes";
pub const FARE_RULES_TABLE: &str = "fare_rules";
pub const LEVELS_TABLE: &str = "levels";
pub const PATHWAYS_TABLE: &str = "pathways";
pub const TRANSLATIONS_TABLE: &str = "translations";
pub const ATTRIBUTIONS_TABLE: &str = "attributions";
pub const FEED_INFO_TABLE: &str = "feed_info";

/// Tables a feed cannot be loaded without, in load order.
pub const REQUIRED_TABLES: &[&str] = &[
    AGENCY_TABLE,
    STOPS_TABLE,
    ROUTES_TABLE,
    TRIPS_TABLE,
    STOP_TIMES_TABLE,
];

pub const OPTIONAL_TABLES: &[&str] = &[
    CALENDAR_TABLE,
    CALENDAR_DATES_TABLE,
    SHAPES_TABLE,
    TRANSFERS_TABLE,
    FREQUENCIES_TABLE,
    FARE_ATTRIBUTES_TABLE,
    FARE_RULES_TABLE,
    LEVELS_TABLE,
    PATHWAYS_TABLE,
    TRANSLATIONS_TABLE,
    ATTRIBUTIONS_TABLE,
    FEED_INFO_TABLE,
];

/// In-memory GTFS feed.
///
/// Tables keep file order and accept duplicates. Lookups scan linearly and
/// return the first match; multi-result queries return a new vector and never
/// reorder the stored rows.
#[derive(Debug, Clone, Default)]
pub struct Feed {
    pub(crate) agency: CsvTable<Agency>,
    pub(crate) stops: CsvTable<Stop>,
    pub(crate) routes: CsvTable<Route>,
    pub(crate) trips: CsvTable<Trip>,
    pub(crate) stop_times: CsvTable<StopTime>,
    pub(crate) calendar: CsvTable<Calendar>,
    pub(crate) calendar_dates: CsvTable<CalendarDate>,
    pub(crate) fare_attributes: CsvTable<FareAttribute>,
    pub(crate) fare_rules: CsvTable<FareRule>,
    pub(crate) shapes: CsvTable<ShapePoint>,
    pub(crate) frequencies: CsvTable<Frequency>,
    pub(crate) transfers: CsvTable<Transfer>,
    pub(crate) pathways: CsvTable<Pathway>,
    pub(crate) levels: CsvTable<Level>,
    pub(crate) translations: CsvTable<Translation>,
    pub(crate) attributions: CsvTable<Attribution>,
    pub(crate) feed_info: Option<FeedInfo>,
}

impl Feed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_agency(&mut self, agency: Agency) {
        self.agency.push(agency, None);
    }

    pub fn add_stop(&mut self, stop: Stop) {
        self.stops.push(stop, None);
    }

    pub fn add_route(&mut self, route: Route) {
        self.routes.push(route, None);
    }

    pub fn add_trip(&mut self, trip: Trip) {
        self.trips.push(trip, None);
    }

    pub fn add_stop_time(&mut self, stop_time: StopTime) {
        self.stop_times.push(stop_time, None);
    }

    pub fn add_calendar(&mut self, calendar: Calendar) {
        self.calendar.push(calendar, None);
    }

    pub fn add_calendar_date(&mut self, calendar_date: CalendarDate) {
        self.calendar_dates.push(calendar_date, None);
    }

    pub fn add_fare_attribute(&mut self, fare_attribute: FareAttribute) {
        self.fare_attributes.push(fare_attribute, None);
    }

    pub fn add_fare_rule(&mut self, fare_rule: FareRule) {
        self.fare_rules.push(fare_rule, None);
    }

    pub fn add_shape_point(&mut self, shape_point: ShapePoint) {
        self.shapes.push(shape_point, None);
    }

    pub fn add_frequency(&mut self, frequency: Frequency) {
        self.frequencies.push(frequency, None);
    }

    pub fn add_transfer(&mut self, transfer: Transfer) {
        self.transfers.push(transfer, None);
    }

    pub fn add_pathway(&mut self, pathway: Pathway) {
        self.pathways.push(pathway, None);
    }

    pub fn add_level(&mut self, level: Level) {
        self.levels.push(level, None);
    }

    pub fn add_translation(&mut self, translation: Translation) {
        self.translations.push(translation, None);
    }

    pub fn add_attribution(&mut self, attribution: Attribution) {
        self.attributions.push(attribution, None);
    }

    /// Replaces the feed info; the last row of `feed_info.txt` wins.
    pub fn set_feed_info(&mut self, feed_info: FeedInfo) {
        if self.feed_info.is_some() {
            tracing::warn!(
                publisher = %feed_info.feed_publisher_name,
                "feed_info already set, replacing it"
            );
        }
        self.feed_info = Some(feed_info);
    }

    pub fn feed_info(&self) -> Option<&FeedInfo> {
        self.feed_info.as_ref()
    }

    pub fn agencies(&self) -> &[Agency] {
        &self.agency.rows
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops.rows
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes.rows
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips.rows
    }

    pub fn stop_times(&self) -> &[StopTime] {
        &self.stop_times.rows
    }

    pub fn calendars(&self) -> &[Calendar] {
        &self.calendar.rows
    }

    pub fn calendar_dates(&self) -> &[CalendarDate] {
        &self.calendar_dates.rows
    }

    pub fn fare_attributes(&self) -> &[FareAttribute] {
        &self.fare_attributes.rows
    }

    pub fn fare_rules(&self) -> &[FareRule] {
        &self.fare_rules.rows
    }

    pub fn shapes(&self) -> &[ShapePoint] {
        &self.shapes.rows
    }

    pub fn frequencies(&self) -> &[Frequency] {
        &self.frequencies.rows
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers.rows
    }

    pub fn pathways(&self) -> &[Pathway] {
        &self.pathways.rows
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels.rows
    }

    pub fn translations(&self) -> &[Translation] {
        &self.translations.rows
    }

    pub fn attributions(&self) -> &[Attribution] {
        &self.attributions.rows
    }

    pub fn agency_table(&self) -> &CsvTable<Agency> {
        &self.agency
    }

    pub fn stop_table(&self) -> &CsvTable<Stop> {
        &self.stops
    }

    pub fn stop_time_table(&self) -> &CsvTable<StopTime> {
        &self.stop_times
    }

    /// Looks up an agency by id.
    ///
    /// An empty id resolves to the only agency of a single-agency feed, whose
    /// routes may omit `agency_id`.
    pub fn get_agency(&self, agency_id: &str) -> Option<&Agency> {
        if agency_id.is_empty() && self.agency.len() == 1 {
            return self.agency.rows.first();
        }
        self.agency
            .iter()
            .find(|agency| agency.agency_id.as_deref().unwrap_or("") == agency_id)
    }

    pub fn get_stop(&self, stop_id: &str) -> Option<&Stop> {
        self.stops.iter().find(|stop| stop.stop_id == stop_id)
    }

    pub fn get_route(&self, route_id: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.route_id == route_id)
    }

    pub fn get_trip(&self, trip_id: &str) -> Option<&Trip> {
        self.trips.iter().find(|trip| trip.trip_id == trip_id)
    }

    pub fn get_stop_times_for_trip(&self, trip_id: &str, sort_by_sequence: bool) -> Vec<&StopTime> {
        let mut stop_times: Vec<&StopTime> = self
            .stop_times
            .iter()
            .filter(|stop_time| stop_time.trip_id == trip_id)
            .collect();
        if sort_by_sequence {
            stop_times.sort_by_key(|stop_time| stop_time.stop_sequence);
        }
        stop_times
    }

    pub fn get_stop_times_for_stop(&self, stop_id: &str) -> Vec<&StopTime> {
        self.stop_times
            .iter()
            .filter(|stop_time| stop_time.stop_id == stop_id)
            .collect()
    }

    pub fn get_calendar(&self, service_id: &str) -> Option<&Calendar> {
        self.calendar
            .iter()
            .find(|calendar| calendar.service_id == service_id)
    }

    pub fn get_calendar_dates(&self, service_id: &str, sort_by_date: bool) -> Vec<&CalendarDate> {
        let mut dates: Vec<&CalendarDate> = self
            .calendar_dates
            .iter()
            .filter(|date| date.service_id == service_id)
            .collect();
        if sort_by_date {
            dates.sort_by_key(|date| date.date);
        }
        dates
    }

    pub fn get_fare_attribute(&self, fare_id: &str) -> Option<&FareAttribute> {
        self.fare_attributes
            .iter()
            .find(|fare| fare.fare_id == fare_id)
    }

    pub fn get_fare_rule(&self, fare_id: &str) -> Option<&FareRule> {
        self.fare_rules.iter().find(|rule| rule.fare_id == fare_id)
    }

    pub fn get_fare_rules_for_fare(&self, fare_id: &str) -> Vec<&FareRule> {
        self.fare_rules
            .iter()
            .filter(|rule| rule.fare_id == fare_id)
            .collect()
    }

    pub fn get_shape(&self, shape_id: &str, sort_by_sequence: bool) -> Vec<&ShapePoint> {
        let mut points: Vec<&ShapePoint> = self
            .shapes
            .iter()
            .filter(|point| point.shape_id == shape_id)
            .collect();
        if sort_by_sequence {
            points.sort_by_key(|point| point.shape_pt_sequence);
        }
        points
    }

    pub fn get_frequencies(&self, trip_id: &str) -> Vec<&Frequency> {
        self.frequencies
            .iter()
            .filter(|frequency| frequency.trip_id == trip_id)
            .collect()
    }

    pub fn get_transfer(&self, from_stop_id: &str, to_stop_id: &str) -> Option<&Transfer> {
        self.transfers.iter().find(|transfer| {
            transfer.from_stop_id == from_stop_id && transfer.to_stop_id == to_stop_id
        })
    }

    pub fn get_pathway(&self, pathway_id: &str) -> Option<&Pathway> {
        self.pathways
            .iter()
            .find(|pathway| pathway.pathway_id == pathway_id)
    }

    pub fn get_pathway_between(&self, from_stop_id: &str, to_stop_id: &str) -> Option<&Pathway> {
        self.pathways.iter().find(|pathway| {
            pathway.from_stop_id == from_stop_id && pathway.to_stop_id == to_stop_id
        })
    }

    pub fn get_level(&self, level_id: &str) -> Option<&Level> {
        self.levels.iter().find(|level| level.level_id == level_id)
    }

    pub fn get_translation(&self, table: TranslationTable) -> Option<&Translation> {
        self.translations
            .iter()
            .find(|translation| translation.table_name == table)
    }

    pub fn get_attributions_for_agency(&self, agency_id: &str) -> Vec<&Attribution> {
        self.attributions
            .iter()
            .filter(|attribution| attribution.agency_id.as_deref() == Some(agency_id))
            .collect()
    }

    /// Whether `service_id` operates on `date`.
    ///
    /// A `calendar_dates` exception for the date decides on its own; otherwise
    /// the weekly pattern of `calendar` within its date range applies. Dates
    /// a feed cannot spell (years outside 1000..=9999) never run.
    pub fn service_runs_on(&self, service_id: &str, date: NaiveDate) -> bool {
        let Ok(day) = GtfsDate::try_from(date) else {
            return false;
        };
        if let Some(exception) = self
            .calendar_dates
            .iter()
            .find(|exception| exception.service_id == service_id && exception.date == day)
        {
            return exception.exception_type == ExceptionType::Added;
        }
        self.get_calendar(service_id)
            .map(|calendar| calendar.covers(day) && calendar.runs_on_weekday(date.weekday()))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gtfs_feed_model::{ServiceAvailability, TransferType};

    fn agency(id: Option<&str>, name: &str) -> Agency {
        Agency {
            agency_id: id.map(str::to_string),
            agency_name: name.to_string(),
            agency_url: "https://example.com".to_string(),
            agency_timezone: "America/Los_Angeles".to_string(),
            ..Agency::default()
        }
    }

    fn stop_time(trip_id: &str, stop_id: &str, sequence: u32) -> StopTime {
        StopTime {
            trip_id: trip_id.to_string(),
            stop_id: stop_id.to_string(),
            stop_sequence: sequence,
            ..StopTime::default()
        }
    }

    fn date(raw: &str) -> GtfsDate {
        GtfsDate::parse(raw).expect("date")
    }

    #[test]
    fn empty_agency_id_resolves_single_agency() {
        let mut feed = Feed::new();
        feed.add_agency(agency(Some("DTA"), "Demo Transit Authority"));

        assert_eq!(
            feed.get_agency("").map(|agency| agency.agency_name.as_str()),
            Some("Demo Transit Authority")
        );
        assert!(feed.get_agency("DTA").is_some());
        assert!(feed.get_agency("OTHER").is_none());

        feed.add_agency(agency(Some("XTA"), "Other"));
        assert!(feed.get_agency("").is_none());
    }

    #[test]
    fn duplicate_ids_return_first_match() {
        let mut feed = Feed::new();
        feed.add_agency(agency(Some("A"), "First"));
        feed.add_agency(agency(Some("A"), "Second"));
        assert_eq!(feed.agencies().len(), 2);
        assert_eq!(feed.get_agency("A").unwrap().agency_name, "First");
    }

    #[test]
    fn sorted_stop_times_leave_storage_untouched() {
        let mut feed = Feed::new();
        feed.add_stop_time(stop_time("T1", "C", 3));
        feed.add_stop_time(stop_time("T2", "A", 1));
        feed.add_stop_time(stop_time("T1", "A", 1));
        feed.add_stop_time(stop_time("T1", "B", 2));

        let first: Vec<u32> = feed
            .get_stop_times_for_trip("T1", true)
            .iter()
            .map(|stop_time| stop_time.stop_sequence)
            .collect();
        let second: Vec<u32> = feed
            .get_stop_times_for_trip("T1", true)
            .iter()
            .map(|stop_time| stop_time.stop_sequence)
            .collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(first, second);

        let unsorted: Vec<&str> = feed
            .get_stop_times_for_trip("T1", false)
            .iter()
            .map(|stop_time| stop_time.stop_id.as_str())
            .collect();
        assert_eq!(unsorted, vec!["C", "A", "B"]);
        assert_eq!(feed.stop_times()[0].stop_sequence, 3);
        assert_eq!(feed.get_stop_times_for_stop("A").len(), 2);
    }

    #[test]
    fn shape_and_calendar_dates_sort_on_request() {
        let mut feed = Feed::new();
        for sequence in [2, 0, 1] {
            feed.add_shape_point(ShapePoint {
                shape_id: "SH".to_string(),
                shape_pt_sequence: sequence,
                ..ShapePoint::default()
            });
        }
        let sequences: Vec<u32> = feed
            .get_shape("SH", true)
            .iter()
            .map(|point| point.shape_pt_sequence)
            .collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        assert!(feed.get_shape("NONE", true).is_empty());

        for raw in ["20080102", "20071225"] {
            feed.add_calendar_date(CalendarDate {
                service_id: "WE".to_string(),
                date: date(raw),
                exception_type: ExceptionType::Removed,
            });
        }
        let dates: Vec<String> = feed
            .get_calendar_dates("WE", true)
            .iter()
            .map(|item| item.date.to_string())
            .collect();
        assert_eq!(dates, vec!["20071225", "20080102"]);
    }

    #[test]
    fn composite_lookups_match_both_ends() {
        let mut feed = Feed::new();
        feed.add_transfer(Transfer {
            from_stop_id: "A".to_string(),
            to_stop_id: "B".to_string(),
            transfer_type: TransferType::MinimumTime,
            min_transfer_time: Some(120),
        });
        feed.add_pathway(Pathway {
            pathway_id: "P1".to_string(),
            from_stop_id: "A".to_string(),
            to_stop_id: "B".to_string(),
            ..Pathway::default()
        });

        assert_eq!(
            feed.get_transfer("A", "B").and_then(|t| t.min_transfer_time),
            Some(120)
        );
        assert!(feed.get_transfer("B", "A").is_none());
        assert!(feed.get_pathway("P1").is_some());
        assert!(feed.get_pathway_between("A", "B").is_some());
        assert!(feed.get_pathway_between("B", "A").is_none());
    }

    #[test]
    fn feed_info_is_replaced() {
        let mut feed = Feed::new();
        assert!(feed.feed_info().is_none());
        feed.set_feed_info(FeedInfo {
            feed_publisher_name: "First".to_string(),
            ..FeedInfo::default()
        });
        feed.set_feed_info(FeedInfo {
            feed_publisher_name: "Second".to_string(),
            ..FeedInfo::default()
        });
        assert_eq!(feed.feed_info().unwrap().feed_publisher_name, "Second");
    }

    #[test]
    fn service_calendar_applies_exceptions() {
        let mut feed = Feed::new();
        feed.add_calendar(Calendar {
            service_id: "WE".to_string(),
            saturday: ServiceAvailability::Available,
            sunday: ServiceAvailability::Available,
            start_date: date("20070101"),
            end_date: date("20101231"),
            ..Calendar::default()
        });
        feed.add_calendar_date(CalendarDate {
            service_id: "WE".to_string(),
            date: date("20070106"),
            exception_type: ExceptionType::Removed,
        });
        feed.add_calendar_date(CalendarDate {
            service_id: "WE".to_string(),
            date: date("20070604"),
            exception_type: ExceptionType::Added,
        });

        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        assert!(feed.service_runs_on("WE", day(2007, 1, 7)));
        assert!(!feed.service_runs_on("WE", day(2007, 1, 6)));
        assert!(!feed.service_runs_on("WE", day(2007, 1, 8)));
        assert!(feed.service_runs_on("WE", day(2007, 6, 4)));
        assert!(!feed.service_runs_on("WE", day(2011, 1, 1)));
        assert!(!feed.service_runs_on("UNKNOWN", day(2007, 1, 7)));
    }

    #[test]
    fn service_never_runs_outside_four_digit_years() {
        let mut feed = Feed::new();
        feed.add_calendar(Calendar {
            service_id: "ALWAYS".to_string(),
            monday: ServiceAvailability::Available,
            tuesday: ServiceAvailability::Available,
            wednesday: ServiceAvailability::Available,
            thursday: ServiceAvailability::Available,
            friday: ServiceAvailability::Available,
            saturday: ServiceAvailability::Available,
            sunday: ServiceAvailability::Available,
            start_date: date("10000101"),
            end_date: date("99991231"),
        });

        let day = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid date");
        assert!(feed.service_runs_on("ALWAYS", day(4464, 3, 15)));
        assert!(!feed.service_runs_on("ALWAYS", day(70000, 3, 15)));
        assert!(!feed.service_runs_on("ALWAYS", day(500, 3, 15)));
    }
}
