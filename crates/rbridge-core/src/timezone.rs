//! Timezones of datetime columns

use chrono::{FixedOffset, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use serde::{Serialize, Serializer};

/// A column timezone: a fixed offset or a named zone with its own rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timezone {
    Fixed(FixedOffset),
    Named(Tz),
}

impl Timezone {
    /// Parse a `tzone` attribute
    ///
    /// Understands `UTC`/`GMT`, explicit `±HH:MM` or `±HHMM` offsets and
    /// IANA zone names such as `America/New_York`.
    pub fn parse(zone: &str) -> Option<Self> {
        let zone = zone.trim();
        match zone {
            "UTC" | "GMT" | "Z" => return FixedOffset::east_opt(0).map(Self::Fixed),
            _ => {}
        }
        if zone.starts_with('+') || zone.starts_with('-') {
            return parse_offset(zone).map(Self::Fixed);
        }
        zone.parse::<Tz>().ok().map(Self::Named)
    }

    /// Offset in effect at a UTC instant
    pub fn offset_at(&self, utc: &NaiveDateTime) -> FixedOffset {
        match self {
            Self::Fixed(offset) => *offset,
            Self::Named(tz) => tz.offset_from_utc_datetime(utc).fix(),
        }
    }

    /// Local wall-clock time of a UTC instant
    pub fn to_local(&self, utc: &NaiveDateTime) -> Option<NaiveDateTime> {
        let offset = self.offset_at(utc);
        utc.checked_add_signed(chrono::Duration::seconds(i64::from(
            offset.local_minus_utc(),
        )))
    }

    /// Whether this zone is always UTC
    pub fn is_utc(&self) -> bool {
        match self {
            Self::Fixed(offset) => offset.local_minus_utc() == 0,
            Self::Named(tz) => matches!(tz.name(), "UTC" | "Etc/UTC" | "GMT" | "Etc/GMT"),
        }
    }

    /// Name as the foreign runtime writes it
    pub fn name(&self) -> String {
        match self {
            Self::Fixed(offset) => offset.to_string(),
            Self::Named(tz) => tz.name().to_string(),
        }
    }
}

impl From<FixedOffset> for Timezone {
    fn from(offset: FixedOffset) -> Self {
        Self::Fixed(offset)
    }
}

impl From<Tz> for Timezone {
    fn from(tz: Tz) -> Self {
        Self::Named(tz)
    }
}

impl std::fmt::Display for Timezone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for Timezone {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

fn parse_offset(zone: &str) -> Option<FixedOffset> {
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let digits: String = zone[1..].chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn utc(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_offsets_and_names() {
        assert_eq!(Timezone::parse("UTC"), Some(Timezone::Fixed(FixedOffset::east_opt(0).unwrap())));
        assert_eq!(
            Timezone::parse("-0530"),
            Some(Timezone::Fixed(FixedOffset::west_opt(5 * 3600 + 30 * 60).unwrap()))
        );
        assert_eq!(
            Timezone::parse("Europe/Paris"),
            Some(Timezone::Named(chrono_tz::Europe::Paris))
        );
        assert_eq!(Timezone::parse("+5"), None);
        assert_eq!(Timezone::parse("Mars/Olympus_Mons"), None);
    }

    #[test]
    fn named_zone_follows_daylight_saving() {
        let tz = Timezone::parse("America/New_York").unwrap();

        assert_eq!(tz.to_local(&utc(2024, 1, 15, 17)), Some(utc(2024, 1, 15, 12)));
        assert_eq!(tz.to_local(&utc(2024, 7, 15, 16)), Some(utc(2024, 7, 15, 12)));
    }

    #[test]
    fn names_and_serialization() {
        let fixed = Timezone::from(FixedOffset::east_opt(3600).unwrap());
        assert_eq!(fixed.name(), "+01:00");
        assert!(!fixed.is_utc());
        assert!(Timezone::parse("GMT").unwrap().is_utc());
        assert_eq!(
            serde_json::to_string(&Timezone::parse("Asia/Tokyo").unwrap()).unwrap(),
            "\"Asia/Tokyo\""
        );
    }
}
