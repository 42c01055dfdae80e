// The eight time tools. Each operation is a pure function of its typed
// arguments plus the injected zone database; payload fields mirror what
// callers see as the tool result text.
use std::fmt::{self, Write as _};

use chrono::{
    DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeDelta, TimeZone, Utc,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::TimeError;
use crate::tzdb::ZoneDb;

const LONG_FORMAT: &str = "%A, %B %d, %Y at %I:%M:%S %p";
const ISO_NAIVE: &str = "%Y-%m-%dT%H:%M:%S";

fn default_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

#[derive(Deserialize, Debug)]
pub struct CurrentTimeArgs {
    #[serde(default)]
    pub tz: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct TimezoneInfoArgs {
    pub tz: String,
}

#[derive(Deserialize, Debug)]
pub struct ListTimezonesArgs {
    #[serde(default)]
    pub filter_text: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct ParseDatetimeArgs {
    pub date_string: String,
    #[serde(default = "default_format")]
    pub format_string: String,
}

#[derive(Deserialize, Debug)]
pub struct CompareTimesArgs {
    pub time1: String,
    pub time2: String,
    #[serde(default = "default_format")]
    pub format_string: String,
}

#[derive(Deserialize, Debug)]
pub struct AddTimeDeltaArgs {
    pub base_time: String,
    #[serde(default)]
    pub days: i64,
    #[serde(default)]
    pub hours: i64,
    #[serde(default)]
    pub minutes: i64,
    #[serde(default)]
    pub seconds: i64,
    #[serde(default = "default_format")]
    pub format_string: String,
}

#[derive(Deserialize, Debug)]
pub struct IsValidDatetimeArgs {
    pub date_string: String,
    #[serde(default = "default_format")]
    pub format_string: String,
}

#[derive(Deserialize, Debug)]
pub struct UnixToDatetimeArgs {
    pub timestamp: i64,
    #[serde(default)]
    pub tz: Option<String>,
}

/// strptime-compatible parse: date-only formats get midnight, time-only
/// formats get 1900-01-01.
fn parse_naive(input: &str, format: &str) -> Result<NaiveDateTime, TimeError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
        return Ok(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, format) {
        return Ok(NaiveDateTime::new(date, NaiveTime::MIN));
    }
    if let Ok(time) = NaiveTime::parse_from_str(input, format) {
        let date = NaiveDate::from_ymd_opt(1900, 1, 1).unwrap_or_default();
        return Ok(NaiveDateTime::new(date, time));
    }
    Err(TimeError::parse(input, format))
}

/// Renders a naive datetime with a caller-supplied format string without
/// panicking on unknown directives or ones that need an offset (%z, %Z).
fn format_naive(dt: &NaiveDateTime, format: &str) -> Result<String, TimeError> {
    let mut out = String::new();
    write!(out, "{}", dt.format(format)).map_err(|_| {
        TimeError::InvalidArgument(format!(
            "format string {format:?} cannot render this datetime"
        ))
    })?;
    Ok(out)
}

fn iso_naive(dt: &NaiveDateTime) -> String {
    dt.format(ISO_NAIVE).to_string()
}

fn now_payload<T: TimeZone>(now: &DateTime<T>, label: &str) -> Value
where
    T::Offset: fmt::Display,
{
    json!({
        "datetime": now.to_rfc3339(),
        "date": now.format("%Y-%m-%d").to_string(),
        "time": now.format("%H:%M:%S").to_string(),
        "time_12h": now.format("%I:%M:%S %p").to_string(),
        "timezone": label,
        "timezone_offset": now.format("%z").to_string(),
        "day_of_week": now.format("%A").to_string(),
        "unix_timestamp": now.timestamp(),
        "formatted": now.format(LONG_FORMAT).to_string(),
    })
}

fn stamp_payload<T: TimeZone>(timestamp: i64, dt: &DateTime<T>, label: &str) -> Value
where
    T::Offset: fmt::Display,
{
    json!({
        "unix_timestamp": timestamp,
        "datetime": dt.to_rfc3339(),
        "date": dt.format("%Y-%m-%d").to_string(),
        "time": dt.format("%H:%M:%S").to_string(),
        "formatted": dt.format(LONG_FORMAT).to_string(),
        "timezone": label,
    })
}

pub fn get_current_time(zones: &ZoneDb, args: CurrentTimeArgs) -> Result<Value, TimeError> {
    match args.tz {
        Some(name) => {
            let tz = zones.resolve(&name)?;
            Ok(now_payload(&Utc::now().with_timezone(&tz), &name))
        }
        None => Ok(now_payload(&Local::now(), "local")),
    }
}

pub fn get_timezone_info(zones: &ZoneDb, args: TimezoneInfoArgs) -> Result<Value, TimeError> {
    let tz = zones.resolve(&args.tz)?;
    let now = Utc::now().with_timezone(&tz);
    let offset_seconds = now.offset().fix().local_minus_utc();
    Ok(json!({
        "timezone": args.tz,
        "current_time": now.to_rfc3339(),
        "offset": now.format("%z").to_string(),
        "offset_hours": f64::from(offset_seconds) / 3600.0,
        "abbreviation": now.format("%Z").to_string(),
    }))
}

pub fn list_timezones(zones: &ZoneDb, args: ListTimezonesArgs) -> Result<Value, TimeError> {
    let names = zones.names(args.filter_text.as_deref());
    Ok(json!({
        "count": names.len(),
        "timezones": names,
    }))
}

pub fn parse_datetime(args: ParseDatetimeArgs) -> Result<Value, TimeError> {
    let dt = parse_naive(&args.date_string, &args.format_string)?;
    let now = Local::now().naive_local();
    Ok(json!({
        "original": args.date_string,
        "parsed": iso_naive(&dt),
        "date": dt.format("%Y-%m-%d").to_string(),
        "time": dt.format("%H:%M:%S").to_string(),
        "day_of_week": dt.format("%A").to_string(),
        "unix_timestamp": dt.and_utc().timestamp(),
        "is_past": dt < now,
        "is_future": dt > now,
    }))
}

pub fn compare_times(args: CompareTimesArgs) -> Result<Value, TimeError> {
    let dt1 = parse_naive(&args.time1, &args.format_string)?;
    let dt2 = parse_naive(&args.time2, &args.format_string)?;
    let diff = dt2 - dt1;
    let abs = diff.abs();
    Ok(json!({
        "time1": iso_naive(&dt1),
        "time2": iso_naive(&dt2),
        "difference_seconds": diff.num_seconds(),
        "difference_days": diff.num_days(),
        "difference_formatted": {
            "days": abs.num_days(),
            "hours": abs.num_hours() % 24,
            "minutes": abs.num_minutes() % 60,
            "seconds": abs.num_seconds() % 60,
        },
        "time1_is_before_time2": dt1 < dt2,
        "time1_is_after_time2": dt1 > dt2,
        "times_are_equal": dt1 == dt2,
    }))
}

pub fn add_time_delta(args: AddTimeDeltaArgs) -> Result<Value, TimeError> {
    let dt = parse_naive(&args.base_time, &args.format_string)?;
    let delta = TimeDelta::try_days(args.days)
        .and_then(|acc| TimeDelta::try_hours(args.hours).and_then(|d| acc.checked_add(&d)))
        .and_then(|acc| TimeDelta::try_minutes(args.minutes).and_then(|d| acc.checked_add(&d)))
        .and_then(|acc| TimeDelta::try_seconds(args.seconds).and_then(|d| acc.checked_add(&d)))
        .ok_or_else(|| TimeError::Range("requested time delta overflows".to_string()))?;
    let shifted = dt.checked_add_signed(delta).ok_or_else(|| {
        TimeError::Range(format!(
            "{} shifted by the delta leaves the representable date range",
            args.base_time
        ))
    })?;
    let rendered = format_naive(&shifted, &args.format_string)?;
    Ok(json!({
        "original": iso_naive(&dt),
        "delta_applied": {
            "days": args.days,
            "hours": args.hours,
            "minutes": args.minutes,
            "seconds": args.seconds,
        },
        "result": rendered,
        "result_iso": iso_naive(&shifted),
        "formatted": shifted.format(LONG_FORMAT).to_string(),
        "unix_timestamp": shifted.and_utc().timestamp(),
    }))
}

pub fn is_valid_datetime(args: IsValidDatetimeArgs) -> Result<Value, TimeError> {
    match parse_naive(&args.date_string, &args.format_string) {
        Ok(dt) => Ok(json!({
            "valid": true,
            "parsed": iso_naive(&dt),
            "message": "Successfully parsed datetime",
        })),
        Err(e) => Ok(json!({
            "valid": false,
            "error": e.to_string(),
            "message": "Failed to parse datetime with given format",
        })),
    }
}

pub fn unix_to_datetime(zones: &ZoneDb, args: UnixToDatetimeArgs) -> Result<Value, TimeError> {
    let utc = DateTime::from_timestamp(args.timestamp, 0).ok_or_else(|| {
        TimeError::Range(format!(
            "timestamp {} is outside the representable date range",
            args.timestamp
        ))
    })?;
    match args.tz {
        Some(name) => {
            let tz = zones.resolve(&name)?;
            Ok(stamp_payload(args.timestamp, &utc.with_timezone(&tz), &name))
        }
        None => Ok(stamp_payload(
            args.timestamp,
            &utc.with_timezone(&Local),
            "local",
        )),
    }
}
