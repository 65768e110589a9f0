use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeDelta, Utc};

/// Label for anything younger than a minute, and for local comments.
pub const JUST_NOW: &str = "hace un momento";

const MONTHS_ES: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Renders a remote creation timestamp relative to `now`.
///
/// Under a week old the result is a single-unit relative label (minutes,
/// hours or days, always floored); older timestamps become an absolute
/// Spanish date such as `10 ene 2024`. Timestamps without an offset are
/// read as UTC. Unparseable input never fails: a leading `YYYY-MM-DD` is
/// rendered as `d/m/yyyy`, anything else is returned verbatim.
pub fn humanize_date(raw: &str, now: DateTime<Utc>) -> String {
    let Some(created) = parse_timestamp(raw) else {
        tracing::debug!(raw, "unparseable comment timestamp");
        return plain_date(raw);
    };

    let delta = now.signed_duration_since(created);
    if delta < TimeDelta::minutes(1) {
        return JUST_NOW.to_string();
    }

    let hours = delta.num_hours();
    if hours < 1 {
        format!("hace {} minutos", delta.num_minutes())
    } else if hours < 24 {
        format!("hace {hours} horas")
    } else if hours < 24 * 7 {
        format!("hace {} días", hours / 24)
    } else {
        absolute_date(created.date_naive())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

fn absolute_date(date: NaiveDate) -> String {
    format!(
        "{} {} {}",
        date.day(),
        MONTHS_ES[date.month0() as usize],
        date.year()
    )
}

fn plain_date(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| format!("{}/{}/{}", date.day(), date.month(), date.year()))
        .unwrap_or_else(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    fn ago(delta: TimeDelta) -> String {
        (now() - delta).format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }

    #[test]
    fn test_thirty_seconds_is_just_now() {
        assert_eq!(humanize_date(&ago(TimeDelta::seconds(30)), now()), JUST_NOW);
    }

    #[test]
    fn test_minutes() {
        assert_eq!(
            humanize_date(&ago(TimeDelta::seconds(61)), now()),
            "hace 1 minutos"
        );
        assert_eq!(
            humanize_date(&ago(TimeDelta::minutes(59)), now()),
            "hace 59 minutos"
        );
    }

    #[test]
    fn test_ninety_minutes_is_one_hour() {
        assert_eq!(
            humanize_date(&ago(TimeDelta::minutes(90)), now()),
            "hace 1 horas"
        );
    }

    #[test]
    fn test_days_are_floored() {
        assert_eq!(
            humanize_date(&ago(TimeDelta::hours(24)), now()),
            "hace 1 días"
        );
        assert_eq!(
            humanize_date(&ago(TimeDelta::hours(24 * 7 - 1)), now()),
            "hace 6 días"
        );
    }

    #[test]
    fn test_ten_days_is_absolute() {
        assert_eq!(
            humanize_date(&ago(TimeDelta::days(10)), now()),
            "10 mar 2024"
        );
        assert_eq!(
            humanize_date("2023-09-02T08:00:00", now()),
            "2 sept 2023"
        );
    }

    #[test]
    fn test_rfc3339_with_offset() {
        assert_eq!(
            humanize_date("2024-03-20T13:30:00+02:00", now()),
            "hace 30 minutos"
        );
    }

    #[test]
    fn test_space_separated_and_date_only() {
        assert_eq!(humanize_date("2024-03-20 09:00:00", now()), "hace 3 horas");
        assert_eq!(humanize_date("2024-03-18", now()), "hace 2 días");
    }

    #[test]
    fn test_future_timestamp_is_just_now() {
        assert_eq!(humanize_date(&ago(TimeDelta::hours(-2)), now()), JUST_NOW);
    }

    #[test]
    fn test_malformed_input_falls_back() {
        assert_eq!(humanize_date("2024-01-05 at noon", now()), "5/1/2024");
        assert_eq!(humanize_date("not a date", now()), "not a date");
        assert_eq!(humanize_date("", now()), "");
    }
}
