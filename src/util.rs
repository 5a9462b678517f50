use std::time::Duration;

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use time::OffsetDateTime;

/// Current time in the representation the entities store.
pub(crate) fn now_db() -> DateTimeWithTimeZone {
    convert_time_to_datetime(OffsetDateTime::now_utc())
}

/// The instant `ttl` from now, saturating instead of overflowing.
pub(crate) fn expiry_after(ttl: Duration) -> DateTimeWithTimeZone {
    let now = OffsetDateTime::now_utc();
    match time::Duration::try_from(ttl)
        .ok()
        .and_then(|ttl| now.checked_add(ttl))
    {
        Some(expiry) => convert_time_to_datetime(expiry),
        None => DateTime::<Utc>::MAX_UTC.into(),
    }
}

// time::OffsetDateTime -> sea_orm::prelude::DateTimeWithTimeZone (chrono).
// Timestamps chrono cannot represent saturate to its upper bound.
pub(crate) fn convert_time_to_datetime(time: OffsetDateTime) -> DateTimeWithTimeZone {
    DateTime::from_timestamp(time.unix_timestamp(), time.nanosecond())
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversion_keeps_the_instant() {
        let instant = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
            + time::Duration::nanoseconds(123);
        let converted = convert_time_to_datetime(instant);

        assert_eq!(converted.timestamp(), 1_700_000_000);
        assert_eq!(converted.timestamp_subsec_nanos(), 123);
        assert_eq!(converted.offset().local_minus_utc(), 0);
    }

    #[test]
    fn expiry_is_in_the_future() {
        let before = now_db();
        let expiry = expiry_after(Duration::from_secs(300));

        assert!(expiry > before);
        assert!(expiry - before >= chrono::TimeDelta::seconds(299));
    }

    #[test]
    fn huge_ttl_saturates() {
        assert_eq!(expiry_after(Duration::MAX), DateTime::<Utc>::MAX_UTC);
    }
}
