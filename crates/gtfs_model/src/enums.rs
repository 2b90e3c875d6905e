use std::fmt;

use serde::{Serialize, Serializer};

use crate::GtfsParseError;

/// Integer-backed GTFS vocabulary.
///
/// Numeric codes outside the known table are kept as an `Unknown` variant;
/// only non-numeric text is rejected.
pub trait GtfsEnum: Sized + Copy + Default {
    const NAME: &'static str;

    /// Known variant for `code`, or `None` when the code is not listed.
    fn from_code(code: u16) -> Option<Self>;

    fn unknown(code: u16) -> Self;

    fn code(self) -> u16;

    fn parse_code(value: &str) -> Result<Self, GtfsParseError> {
        let code = parse_numeric_code(value).ok_or_else(|| GtfsParseError::InvalidEnumCode {
            type_name: Self::NAME,
            value: value.to_string(),
        })?;
        Ok(Self::from_code(code).unwrap_or_else(|| Self::unknown(code)))
    }
}

fn parse_numeric_code(value: &str) -> Option<u16> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

macro_rules! gtfs_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            #[default]
            $default:ident = $default_code:literal,
            $($variant:ident = $code:literal),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub enum $name {
            #[default]
            $default,
            $($variant,)*
            Unknown(u16),
        }

        impl GtfsEnum for $name {
            const NAME: &'static str = stringify!($name);

            fn from_code(code: u16) -> Option<Self> {
                match code {
                    $default_code => Some($name::$default),
                    $($code => Some($name::$variant),)*
                    _ => None,
                }
            }

            fn unknown(code: u16) -> Self {
                $name::Unknown(code)
            }

            fn code(self) -> u16 {
                match self {
                    $name::$default => $default_code,
                    $($name::$variant => $code,)*
                    $name::Unknown(code) => code,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_u16(self.code())
            }
        }
    };
}

gtfs_enum! {
    /// `stops.location_type`. Absent means a generic node.
    LocationType {
        #[default]
        GenericNode = 3,
        StopOrPlatform = 0,
        Station = 1,
        EntranceOrExit = 2,
        BoardingArea = 4,
    }
}

gtfs_enum! {
    /// Shared by `wheelchair_boarding`, `wheelchair_accessible` and `bikes_allowed`.
    Accessibility {
        #[default]
        NoInfo = 0,
        Yes = 1,
        No = 2,
    }
}

gtfs_enum! {
    DirectionId {
        #[default]
        DefaultDirection = 0,
        OppositeDirection = 1,
    }
}

gtfs_enum! {
    PickupDropOffType {
        #[default]
        Regular = 0,
        NotAvailable = 1,
        MustPhone = 2,
        MustCoordinateWithDriver = 3,
    }
}

gtfs_enum! {
    Timepoint {
        #[default]
        Exact = 1,
        Approximate = 0,
    }
}

gtfs_enum! {
    /// Weekday columns of `calendar.txt`.
    ServiceAvailability {
        #[default]
        Unavailable = 0,
        Available = 1,
    }
}

gtfs_enum! {
    ExceptionType {
        #[default]
        Added = 1,
        Removed = 2,
    }
}

gtfs_enum! {
    PaymentMethod {
        #[default]
        BeforeBoarding = 1,
        OnBoard = 0,
    }
}

gtfs_enum! {
    /// `fare_attributes.transfers`. An empty value means unlimited transfers.
    FareTransfers {
        #[default]
        Unlimited = 3,
        No = 0,
        Once = 1,
        Twice = 2,
    }
}

gtfs_enum! {
    ExactTimes {
        #[default]
        FrequencyBased = 0,
        ScheduleBased = 1,
    }
}

gtfs_enum! {
    TransferType {
        #[default]
        Recommended = 0,
        Timed = 1,
        MinimumTime = 2,
        NotPossible = 3,
        InSeat = 4,
        InSeatNotAllowed = 5,
    }
}

gtfs_enum! {
    PathwayMode {
        #[default]
        Walkway = 1,
        Stairs = 2,
        MovingSidewalk = 3,
        Escalator = 4,
        Elevator = 5,
        FareGate = 6,
        ExitGate = 7,
    }
}

gtfs_enum! {
    PathwayDirection {
        #[default]
        Unidirectional = 0,
        Bidirectional = 1,
    }
}

gtfs_enum! {
    /// `is_producer`, `is_operator` and `is_authority` of `attributions.txt`.
    AttributionRole {
        #[default]
        No = 0,
        Yes = 1,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RouteType {
    #[default]
    Tram,
    Subway,
    Rail,
    Bus,
    Ferry,
    CableTram,
    AerialLift,
    Funicular,
    Trolleybus,
    Monorail,
    /// Extended route types (100..=1702).
    Extended(u16),
    Unknown(u16),
}

impl GtfsEnum for RouteType {
    const NAME: &'static str = "RouteType";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(RouteType::Tram),
            1 => Some(RouteType::Subway),
            2 => Some(RouteType::Rail),
            3 => Some(RouteType::Bus),
            4 => Some(RouteType::Ferry),
            5 => Some(RouteType::CableTram),
            6 => Some(RouteType::AerialLift),
            7 => Some(RouteType::Funicular),
            11 => Some(RouteType::Trolleybus),
            12 => Some(RouteType::Monorail),
            100..=1702 => Some(RouteType::Extended(code)),
            _ => None,
        }
    }

    fn unknown(code: u16) -> Self {
        RouteType::Unknown(code)
    }

    fn code(self) -> u16 {
        match self {
            RouteType::Tram => 0,
            RouteType::Subway => 1,
            RouteType::Rail => 2,
            RouteType::Bus => 3,
            RouteType::Ferry => 4,
            RouteType::CableTram => 5,
            RouteType::AerialLift => 6,
            RouteType::Funicular => 7,
            RouteType::Trolleybus => 11,
            RouteType::Monorail => 12,
            RouteType::Extended(code) | RouteType::Unknown(code) => code,
        }
    }
}

impl fmt::Display for RouteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for RouteType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.code())
    }
}

/// Target table of a `translations.txt` row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TranslationTable {
    #[default]
    Agency,
    Stops,
    Routes,
    Trips,
    StopTimes,
    FeedInfo,
    Unknown(u16),
}

impl TranslationTable {
    /// File name of the target table; `None` for unknown codes.
    pub fn table_name(self) -> Option<&'static str> {
        let name = match self {
            TranslationTable::Agency => "agency",
            TranslationTable::Stops => "stops",
            TranslationTable::Routes => "routes",
            TranslationTable::Trips => "trips",
            TranslationTable::StopTimes => "stop_times",
            TranslationTable::FeedInfo => "feed_info",
            TranslationTable::Unknown(_) => return None,
        };
        Some(name)
    }

    fn from_table_name(value: &str) -> Option<Self> {
        match value {
            "agency" => Some(TranslationTable::Agency),
            "stops" => Some(TranslationTable::Stops),
            "routes" => Some(TranslationTable::Routes),
            "trips" => Some(TranslationTable::Trips),
            "stop_times" => Some(TranslationTable::StopTimes),
            "feed_info" => Some(TranslationTable::FeedInfo),
            _ => None,
        }
    }
}

impl GtfsEnum for TranslationTable {
    const NAME: &'static str = "TranslationTable";

    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(TranslationTable::Agency),
            1 => Some(TranslationTable::Stops),
            2 => Some(TranslationTable::Routes),
            3 => Some(TranslationTable::Trips),
            4 => Some(TranslationTable::StopTimes),
            5 => Some(TranslationTable::FeedInfo),
            _ => None,
        }
    }

    fn unknown(code: u16) -> Self {
        TranslationTable::Unknown(code)
    }

    fn code(self) -> u16 {
        match self {
            TranslationTable::Agency => 0,
            TranslationTable::Stops => 1,
            TranslationTable::Routes => 2,
            TranslationTable::Trips => 3,
            TranslationTable::StopTimes => 4,
            TranslationTable::FeedInfo => 5,
            TranslationTable::Unknown(code) => code,
        }
    }

    /// Accepts both the numeric code and the file name spelling (`stop_times`).
    fn parse_code(value: &str) -> Result<Self, GtfsParseError> {
        if let Some(table) = Self::from_table_name(value) {
            return Ok(table);
        }
        parse_numeric_code(value)
            .map(|code| Self::from_code(code).unwrap_or(TranslationTable::Unknown(code)))
            .ok_or_else(|| GtfsParseError::InvalidEnumCode {
                type_name: Self::NAME,
                value: value.to_string(),
            })
    }
}

impl fmt::Display for TranslationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table_name() {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.code()),
        }
    }
}

impl Serialize for TranslationTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_codes() {
        assert_eq!(
            LocationType::parse_code("1").unwrap(),
            LocationType::Station
        );
        assert_eq!(Timepoint::parse_code("0").unwrap(), Timepoint::Approximate);
        assert_eq!(
            PathwayMode::parse_code("7").unwrap(),
            PathwayMode::ExitGate
        );
        assert_eq!(PathwayMode::ExitGate.code(), 7);
    }

    #[test]
    fn defaults_follow_gtfs_semantics() {
        assert_eq!(LocationType::default(), LocationType::GenericNode);
        assert_eq!(Timepoint::default(), Timepoint::Exact);
        assert_eq!(FareTransfers::default(), FareTransfers::Unlimited);
        assert_eq!(PaymentMethod::default(), PaymentMethod::BeforeBoarding);
        assert_eq!(ExceptionType::default(), ExceptionType::Added);
        assert_eq!(PathwayMode::default(), PathwayMode::Walkway);
    }

    #[test]
    fn keeps_unlisted_numeric_codes() {
        assert_eq!(
            LocationType::parse_code("9").unwrap(),
            LocationType::Unknown(9)
        );
        assert_eq!(LocationType::Unknown(9).code(), 9);
        assert_eq!(LocationType::Unknown(9).to_string(), "9");
        assert_eq!(
            Accessibility::parse_code("3").unwrap(),
            Accessibility::Unknown(3)
        );
    }

    #[test]
    fn rejects_non_numeric_codes() {
        assert!(matches!(
            LocationType::parse_code("station"),
            Err(GtfsParseError::InvalidEnumCode {
                type_name: "LocationType",
                ..
            })
        ));
        assert!(DirectionId::parse_code("70000").is_err());
        assert!(DirectionId::parse_code("-1").is_err());
        assert!(DirectionId::parse_code("one").is_err());
        assert!(DirectionId::parse_code("").is_err());
    }

    #[test]
    fn parses_extended_route_types() {
        assert_eq!(RouteType::parse_code("3").unwrap(), RouteType::Bus);
        assert_eq!(RouteType::parse_code("11").unwrap(), RouteType::Trolleybus);
        assert_eq!(
            RouteType::parse_code("700").unwrap(),
            RouteType::Extended(700)
        );
        assert_eq!(RouteType::Extended(1702).code(), 1702);
        assert_eq!(RouteType::parse_code("8").unwrap(), RouteType::Unknown(8));
        assert_eq!(
            RouteType::parse_code("1703").unwrap(),
            RouteType::Unknown(1703)
        );
        assert_eq!(RouteType::Unknown(1703).code(), 1703);
    }

    #[test]
    fn parses_translation_table_names_and_codes() {
        assert_eq!(
            TranslationTable::parse_code("stop_times").unwrap(),
            TranslationTable::StopTimes
        );
        assert_eq!(
            TranslationTable::parse_code("2").unwrap(),
            TranslationTable::Routes
        );
        assert_eq!(TranslationTable::FeedInfo.to_string(), "feed_info");
        assert_eq!(
            TranslationTable::parse_code("9").unwrap(),
            TranslationTable::Unknown(9)
        );
        assert_eq!(TranslationTable::Unknown(9).table_name(), None);
        assert_eq!(TranslationTable::Unknown(9).to_string(), "9");
        assert!(TranslationTable::parse_code("calendar").is_err());
        assert!(TranslationTable::parse_code("+1").is_err());
    }
}
