use gtfs_feed_model::{
    check_coordinates, Agency, Attribution, Calendar, CalendarDate, FareAttribute, FareRule,
    FareTransfers, FeedInfo, Frequency, GtfsEnum, Level, Pathway, Route, ShapePoint, Stop,
    StopTime, Transfer, Translation, Trip,
};

use crate::feed::*;
use crate::{CsvRow, CsvTable, Feed, FeedError};

/// Builds a record from one header-keyed row.
pub trait FromCsvRow: Sized {
    /// Table name the record is read from, without the `.txt` extension.
    const TABLE: &'static str;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError>;
}

/// A record that knows which table of a [`Feed`] it belongs to.
pub trait GtfsRecord: FromCsvRow {
    fn store(self, feed: &mut Feed, row_number: Option<usize>);

    /// Keeps the header the table was read with.
    fn set_headers(_feed: &mut Feed, _headers: &[String]) {}
}

macro_rules! table_record {
    ($record:ty, $field:ident) => {
        impl GtfsRecord for $record {
            fn store(self, feed: &mut Feed, row_number: Option<usize>) {
                feed.$field.push(self, row_number);
            }

            fn set_headers(feed: &mut Feed, headers: &[String]) {
                let table: &mut CsvTable<$record> = &mut feed.$field;
                table.headers = headers.to_vec();
            }
        }
    };
}

table_record!(Agency, agency);
table_record!(Stop, stops);
table_record!(Route, routes);
table_record!(Trip, trips);
table_record!(StopTime, stop_times);
table_record!(Calendar, calendar);
table_record!(CalendarDate, calendar_dates);
table_record!(FareAttribute, fare_attributes);
table_record!(FareRule, fare_rules);
table_record!(ShapePoint, shapes);
table_record!(Frequency, frequencies);
table_record!(Transfer, transfers);
table_record!(Pathway, pathways);
table_record!(Level, levels);
table_record!(Translation, translations);
table_record!(Attribution, attributions);

impl GtfsRecord for FeedInfo {
    fn store(self, feed: &mut Feed, _row_number: Option<usize>) {
        feed.set_feed_info(self);
    }
}

impl FromCsvRow for Agency {
    const TABLE: &'static str = AGENCY_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            agency_id: row.conditional_str("agency_id"),
            agency_name: row.required_str("agency_name")?,
            agency_url: row.required_str("agency_url")?,
            agency_timezone: row.required_str("agency_timezone")?,
            agency_lang: row.optional_str("agency_lang"),
            agency_phone: row.optional_str("agency_phone"),
            agency_fare_url: row.optional_str("agency_fare_url"),
            agency_email: row.optional_str("agency_email"),
        })
    }
}

impl FromCsvRow for Stop {
    const TABLE: &'static str = STOPS_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        let stop_lat = row.conditional_f64("stop_lat")?;
        let stop_lon = row.conditional_f64("stop_lon")?;
        if let (Some(lat), Some(lon)) = (stop_lat, stop_lon) {
            check_coordinates(lat, lon)
                .map_err(|err| FeedError::InvalidFormat(format!("stop_lat/stop_lon: {}", err)))?;
        }

        Ok(Self {
            stop_id: row.required_str("stop_id")?,
            stop_code: row.optional_str("stop_code"),
            stop_name: row.conditional_str("stop_name"),
            stop_desc: row.optional_str("stop_desc"),
            stop_lat,
            stop_lon,
            zone_id: row.conditional_str("zone_id"),
            stop_url: row.optional_str("stop_url"),
            location_type: row.optional_enum("location_type")?,
            parent_station: row.conditional_str("parent_station"),
            stop_timezone: row.optional_str("stop_timezone"),
            wheelchair_boarding: row.optional_enum("wheelchair_boarding")?,
            level_id: row.optional_str("level_id"),
            platform_code: row.optional_str("platform_code"),
        })
    }
}

impl FromCsvRow for Route {
    const TABLE: &'static str = ROUTES_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        let route_id = row.required_str("route_id")?;
        let route_short_name = row.conditional_str("route_short_name");
        let route_long_name = row.conditional_str("route_long_name");
        if route_short_name.is_none() && route_long_name.is_none() {
            return Err(FeedError::RequiredFieldAbsent(format!(
                "route_short_name or route_long_name for route {}",
                route_id
            )));
        }

        Ok(Self {
            route_id,
            agency_id: row.conditional_str("agency_id"),
            route_short_name,
            route_long_name,
            route_desc: row.optional_str("route_desc"),
            route_type: row.required_enum("route_type")?,
            route_url: row.optional_str("route_url"),
            route_color: row.optional_str("route_color"),
            route_text_color: row.optional_str("route_text_color"),
            route_sort_order: row.optional_u32("route_sort_order")?,
        })
    }
}

impl FromCsvRow for Trip {
    const TABLE: &'static str = TRIPS_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            route_id: row.required_str("route_id")?,
            service_id: row.required_str("service_id")?,
            trip_id: row.required_str("trip_id")?,
            trip_headsign: row.optional_str("trip_headsign"),
            trip_short_name: row.optional_str("trip_short_name"),
            direction_id: row.optional_enum("direction_id")?,
            block_id: row.optional_str("block_id"),
            shape_id: row.optional_str("shape_id"),
            wheelchair_accessible: row.optional_enum("wheelchair_accessible")?,
            bikes_allowed: row.optional_enum("bikes_allowed")?,
        })
    }
}

impl FromCsvRow for StopTime {
    const TABLE: &'static str = STOP_TIMES_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            trip_id: row.required_str("trip_id")?,
            arrival_time: row.conditional_time("arrival_time")?,
            departure_time: row.conditional_time("departure_time")?,
            stop_id: row.required_str("stop_id")?,
            stop_sequence: row.required_u32("stop_sequence")?,
            stop_headsign: row.optional_str("stop_headsign"),
            pickup_type: row.optional_enum("pickup_type")?,
            drop_off_type: row.optional_enum("drop_off_type")?,
            shape_dist_traveled: row.optional_distance("shape_dist_traveled")?,
            timepoint: row.optional_enum("timepoint")?,
        })
    }
}

impl FromCsvRow for Calendar {
    const TABLE: &'static str = CALENDAR_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            service_id: row.required_str("service_id")?,
            monday: row.required_enum("monday")?,
            tuesday: row.required_enum("tuesday")?,
            wednesday: row.required_enum("wednesday")?,
            thursday: row.required_enum("thursday")?,
            friday: row.required_enum("friday")?,
            saturday: row.required_enum("saturday")?,
            sunday: row.required_enum("sunday")?,
            start_date: row.required_date("start_date")?,
            end_date: row.required_date("end_date")?,
        })
    }
}

impl FromCsvRow for CalendarDate {
    const TABLE: &'static str = CALENDAR_DATES_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            service_id: row.required_str("service_id")?,
            date: row.required_date("date")?,
            exception_type: row.required_enum("exception_type")?,
        })
    }
}

impl FromCsvRow for FareAttribute {
    const TABLE: &'static str = FARE_ATTRIBUTES_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        // The column is required but an empty value means unlimited transfers.
        let transfers = match row.get("transfers") {
            None => return Err(FeedError::RequiredFieldAbsent("transfers".to_string())),
            Some("") => FareTransfers::Unlimited,
            Some(value) => FareTransfers::parse_code(value)
                .map_err(|err| FeedError::InvalidFormat(format!("transfers: {}", err)))?,
        };

        Ok(Self {
            fare_id: row.required_str("fare_id")?,
            price: row.required_f64("price")?,
            currency_type: row.required_str("currency_type")?,
            payment_method: row.required_enum("payment_method")?,
            transfers,
            agency_id: row.conditional_str("agency_id"),
            transfer_duration: row.optional_u32("transfer_duration")?,
        })
    }
}

impl FromCsvRow for FareRule {
    const TABLE: &'static str = FARE_RULES_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            fare_id: row.required_str("fare_id")?,
            route_id: row.optional_str("route_id"),
            origin_id: row.optional_str("origin_id"),
            destination_id: row.optional_str("destination_id"),
            contains_id: row.optional_str("contains_id"),
        })
    }
}

impl FromCsvRow for ShapePoint {
    const TABLE: &'static str = SHAPES_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        let shape_id = row.required_str("shape_id")?;
        let shape_pt_lat = row.required_f64("shape_pt_lat")?;
        let shape_pt_lon = row.required_f64("shape_pt_lon")?;
        check_coordinates(shape_pt_lat, shape_pt_lon).map_err(|err| {
            FeedError::InvalidFormat(format!("shape_pt_lat/shape_pt_lon: {}", err))
        })?;

        Ok(Self {
            shape_id,
            shape_pt_lat,
            shape_pt_lon,
            shape_pt_sequence: row.required_u32("shape_pt_sequence")?,
            shape_dist_traveled: row.optional_distance("shape_dist_traveled")?,
        })
    }
}

impl FromCsvRow for Frequency {
    const TABLE: &'static str = FREQUENCIES_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            trip_id: row.required_str("trip_id")?,
            start_time: row.required_time("start_time")?,
            end_time: row.required_time("end_time")?,
            headway_secs: row.required_u32("headway_secs")?,
            exact_times: row.optional_enum("exact_times")?,
        })
    }
}

impl FromCsvRow for Transfer {
    const TABLE: &'static str = TRANSFERS_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            from_stop_id: row.required_str("from_stop_id")?,
            to_stop_id: row.required_str("to_stop_id")?,
            transfer_type: row.required_enum("transfer_type")?,
            min_transfer_time: row.optional_u32("min_transfer_time")?,
        })
    }
}

impl FromCsvRow for Pathway {
    const TABLE: &'static str = PATHWAYS_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            pathway_id: row.required_str("pathway_id")?,
            from_stop_id: row.required_str("from_stop_id")?,
            to_stop_id: row.required_str("to_stop_id")?,
            pathway_mode: row.required_enum("pathway_mode")?,
            is_bidirectional: row.required_enum("is_bidirectional")?,
            length: row.optional_f64("length")?,
            traversal_time: row.optional_u32("traversal_time")?,
            stair_count: row.optional_u32("stair_count")?,
            max_slope: row.optional_f64("max_slope")?,
            min_width: row.optional_f64("min_width")?,
            signposted_as: row.optional_str("signposted_as"),
            reversed_signposted_as: row.optional_str("reversed_signposted_as"),
        })
    }
}

impl FromCsvRow for Level {
    const TABLE: &'static str = LEVELS_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            level_id: row.required_str("level_id")?,
            level_index: row.required_f64("level_index")?,
            level_name: row.optional_str("level_name"),
        })
    }
}

impl FromCsvRow for FeedInfo {
    const TABLE: &'static str = FEED_INFO_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            feed_publisher_name: row.required_str("feed_publisher_name")?,
            feed_publisher_url: row.required_str("feed_publisher_url")?,
            feed_lang: row.required_str("feed_lang")?,
            feed_start_date: row.optional_date("feed_start_date")?,
            feed_end_date: row.optional_date("feed_end_date")?,
            feed_version: row.optional_str("feed_version"),
            feed_contact_email: row.optional_str("feed_contact_email"),
            feed_contact_url: row.optional_str("feed_contact_url"),
        })
    }
}

impl FromCsvRow for Translation {
    const TABLE: &'static str = TRANSLATIONS_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            table_name: row.required_enum("table_name")?,
            field_name: row.required_str("field_name")?,
            language: row.required_str("language")?,
            translation: row.required_str("translation")?,
            record_id: row.conditional_str("record_id"),
            record_sub_id: row.conditional_str("record_sub_id"),
            field_value: row.conditional_str("field_value"),
        })
    }
}

impl FromCsvRow for Attribution {
    const TABLE: &'static str = ATTRIBUTIONS_TABLE;

    fn from_row(row: &CsvRow<'_>) -> Result<Self, FeedError> {
        Ok(Self {
            attribution_id: row.optional_str("attribution_id"),
            agency_id: row.optional_str("agency_id"),
            route_id: row.optional_str("route_id"),
            trip_id: row.optional_str("trip_id"),
            organization_name: row.required_str("organization_name")?,
            is_producer: row.optional_enum("is_producer")?,
            is_operator: row.optional_enum("is_operator")?,
            is_authority: row.optional_enum("is_authority")?,
            attribution_url: row.optional_str("attribution_url"),
            attribution_email: row.optional_str("attribution_email"),
            attribution_phone: row.optional_str("attribution_phone"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use gtfs_feed_model::{
        Accessibility, AttributionRole, LocationType, PathwayDirection, PathwayMode,
        PickupDropOffType, RouteType, Timepoint, TransferType, TranslationTable,
    };

    fn parse<T: FromCsvRow>(headers: &[&str], values: &[&str]) -> Result<T, FeedError> {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let values: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        T::from_row(&CsvRow::new(&headers, &values))
    }

    #[test]
    fn maps_stop_with_defaults() {
        let stop: Stop = parse(
            &["stop_id", "stop_name", "stop_lat", "stop_lon"],
            &["FUR_CREEK_RES", "Furnace Creek Resort (Demo)", "36.425288", "-117.133162"],
        )
        .unwrap();
        assert_eq!(stop.stop_id, "FUR_CREEK_RES");
        assert_eq!(stop.stop_lat, Some(36.425288));
        assert_eq!(stop.location_type, LocationType::GenericNode);
        assert!(stop.has_coordinates());
    }

    #[test]
    fn keeps_unlisted_accessibility_code() {
        let stop: Stop = parse(&["stop_id", "wheelchair_boarding"], &["S1", "3"]).unwrap();
        assert_eq!(stop.wheelchair_boarding, Accessibility::Unknown(3));

        let err = parse::<Stop>(&["stop_id", "wheelchair_boarding"], &["S1", "yes"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn rejects_stop_outside_coordinate_range() {
        let err = parse::<Stop>(
            &["stop_id", "stop_lat", "stop_lon"],
            &["S1", "95.0", "10.0"],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn route_requires_one_name() {
        let err = parse::<Route>(
            &["route_id", "route_short_name", "route_long_name", "route_type"],
            &["AB", "", "", "3"],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequiredFieldAbsent);

        let route: Route = parse(
            &["route_id", "route_short_name", "route_long_name", "route_type"],
            &["AB", "10", "", "3"],
        )
        .unwrap();
        assert_eq!(route.route_type, RouteType::Bus);
        assert_eq!(route.route_long_name, None);
    }

    #[test]
    fn stop_time_times_are_conditional() {
        let stop_time: StopTime = parse(
            &["trip_id", "arrival_time", "departure_time", "stop_id", "stop_sequence"],
            &["AB1", "", "", "BEATTY_AIRPORT", "2"],
        )
        .unwrap();
        assert!(!stop_time.arrival_time.is_provided());
        assert!(!stop_time.departure_time.is_provided());
        assert_eq!(stop_time.pickup_type, PickupDropOffType::Regular);
        assert_eq!(stop_time.timepoint, Timepoint::Exact);

        let err = parse::<StopTime>(
            &["trip_id", "arrival_time", "stop_id", "stop_sequence"],
            &["AB1", "6:00", "S", "1"],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
        assert!(err.to_string().contains("arrival_time"));
    }

    #[test]
    fn fare_transfers_empty_means_unlimited() {
        let headers = [
            "fare_id",
            "price",
            "currency_type",
            "payment_method",
            "transfers",
        ];
        let fare: FareAttribute = parse(&headers, &["p", "1.25", "USD", "0", ""]).unwrap();
        assert_eq!(fare.transfers, FareTransfers::Unlimited);

        let err = parse::<FareAttribute>(&headers[..4], &["p", "1.25", "USD", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequiredFieldAbsent);
    }

    #[test]
    fn frequency_times_are_required() {
        let err = parse::<Frequency>(
            &["trip_id", "start_time", "end_time", "headway_secs"],
            &["STBA", "", "22:00:00", "1800"],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequiredFieldAbsent);
    }

    #[test]
    fn shape_distance_must_not_be_negative() {
        let err = parse::<ShapePoint>(
            &["shape_id", "shape_pt_lat", "shape_pt_lon", "shape_pt_sequence", "shape_dist_traveled"],
            &["SH1", "36.4", "-117.1", "1", "-3"],
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidFormat);
    }

    #[test]
    fn translation_accepts_table_names() {
        let translation: Translation = parse(
            &["table_name", "field_name", "language", "translation", "record_id"],
            &["stops", "stop_name", "fr", "Gare", "S1"],
        )
        .unwrap();
        assert_eq!(translation.table_name, TranslationTable::Stops);
        assert_eq!(translation.record_id.as_deref(), Some("S1"));
        assert_eq!(translation.field_value, None);
    }

    #[test]
    fn transfer_minimum_time_is_optional() {
        let headers = ["from_stop_id", "to_stop_id", "transfer_type", "min_transfer_time"];
        let transfer: Transfer = parse(&headers, &["S1", "S2", "2", "180"]).unwrap();
        assert_eq!(transfer.transfer_type, TransferType::MinimumTime);
        assert_eq!(transfer.min_transfer_time, Some(180));

        let transfer: Transfer = parse(&headers, &["S1", "S2", "0", ""]).unwrap();
        assert_eq!(transfer.transfer_type, TransferType::Recommended);
        assert_eq!(transfer.min_transfer_time, None);

        let err = parse::<Transfer>(&headers, &["S1", "S2", "", "180"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequiredFieldAbsent);
    }

    #[test]
    fn pathway_direction_is_required() {
        let headers = [
            "pathway_id",
            "from_stop_id",
            "to_stop_id",
            "pathway_mode",
            "is_bidirectional",
            "stair_count",
        ];
        let pathway: Pathway = parse(&headers, &["P1", "E1", "PL1", "2", "1", "24"]).unwrap();
        assert_eq!(pathway.pathway_mode, PathwayMode::Stairs);
        assert_eq!(pathway.is_bidirectional, PathwayDirection::Bidirectional);
        assert_eq!(pathway.stair_count, Some(24));
        assert_eq!(pathway.length, None);

        let err = parse::<Pathway>(&headers, &["P1", "E1", "PL1", "2", "", "24"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequiredFieldAbsent);
        assert!(err.to_string().contains("is_bidirectional"));
    }

    #[test]
    fn level_index_may_be_negative() {
        let level: Level = parse(
            &["level_id", "level_index", "level_name"],
            &["L-1", "-1.5", "Mezzanine"],
        )
        .unwrap();
        assert_eq!(level.level_index, -1.5);
        assert_eq!(level.level_name.as_deref(), Some("Mezzanine"));

        let err = parse::<Level>(&["level_id", "level_index"], &["L0", ""]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequiredFieldAbsent);
    }

    #[test]
    fn attribution_roles_default_to_no() {
        let attribution: Attribution = parse(
            &["attribution_id", "agency_id", "organization_name", "is_producer"],
            &["A1", "DTA", "Demo Data Co", "1"],
        )
        .unwrap();
        assert_eq!(attribution.agency_id.as_deref(), Some("DTA"));
        assert_eq!(attribution.is_producer, AttributionRole::Yes);
        assert_eq!(attribution.is_operator, AttributionRole::No);
        assert_eq!(attribution.is_authority, AttributionRole::No);

        let err = parse::<Attribution>(&["attribution_id"], &["A1"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequiredFieldAbsent);
    }
}
