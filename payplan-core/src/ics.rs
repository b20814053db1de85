//! ICS (RFC 5545) calendar export.
//!
//! One VEVENT per installment with a 24-hour-prior display alarm. Due dates
//! have no inherent time of day; 09:00 local in the request timezone is the
//! fixed convention, with a one-hour block so the event stays visible.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{PlanError, Result};
use crate::holidays::HolidayCalendar;
use crate::installment::NormalizedInstallment;
use crate::shift::ShiftReason;

/// Serialize the schedule to an ICS calendar, base64-encoded so it can ride
/// inside a JSON response body.
pub fn build_calendar(
    normalized: &[NormalizedInstallment],
    tz: Tz,
    calendar: &HolidayCalendar,
) -> Result<String> {
    let ics = render_ics(normalized, tz, calendar)?;
    Ok(BASE64.encode(ics.as_bytes()))
}

fn render_ics(
    normalized: &[NormalizedInstallment],
    tz: Tz,
    calendar: &HolidayCalendar,
) -> Result<String> {
    let mut s = String::new();
    s.push_str("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//PayPlan//EN\r\nCALSCALE:GREGORIAN\r\n");

    for (i, n) in normalized.iter().enumerate() {
        let dtstart = utc_stamp(n.due_date, 9, tz)?;
        let dtend = utc_stamp(n.due_date, 10, tz)?;

        let mut summary = format!("{} ${:.2}", n.provider, n.amount);
        if n.was_shifted {
            summary.push_str(" (shifted)");
        }

        s.push_str("BEGIN:VEVENT\r\n");
        s.push_str(&format!("UID:payplan-{i}@payplan\r\n"));
        s.push_str(&format!("DTSTART:{dtstart}\r\n"));
        s.push_str(&format!("DTEND:{dtend}\r\n"));
        s.push_str(&format!("SUMMARY:{}\r\n", escape_ics(&summary)));

        if n.was_shifted {
            if let Some(original) = n.original_due_date {
                let reason = match (n.shift_reason, calendar.holiday_name(original)) {
                    (Some(ShiftReason::UsFederalHoliday), Some(name)) => name.to_string(),
                    (Some(r), _) => r.label().to_string(),
                    (None, _) => "non-business day".to_string(),
                };
                let description = format!("Originally due {original}; moved for {reason}.");
                s.push_str(&format!("DESCRIPTION:{}\r\n", escape_ics(&description)));
            }
        }

        s.push_str("BEGIN:VALARM\r\n");
        s.push_str("TRIGGER:-PT24H\r\n");
        s.push_str("ACTION:DISPLAY\r\n");
        s.push_str("DESCRIPTION:Payment due tomorrow\r\n");
        s.push_str("END:VALARM\r\n");
        s.push_str("END:VEVENT\r\n");
    }

    s.push_str("END:VCALENDAR\r\n");
    Ok(s)
}

/// Anchor `date` at `hour`:00 local and format as a UTC basic timestamp.
fn utc_stamp(date: NaiveDate, hour: u32, tz: Tz) -> Result<String> {
    let local = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| PlanError::Internal(format!("invalid time {hour}:00 on {date}")))?;
    // DST transitions happen in the small hours; 09:00 always resolves, but
    // `earliest` keeps the ambiguous fall-back case total.
    let anchored = tz
        .from_local_datetime(&local)
        .earliest()
        .ok_or_else(|| PlanError::Internal(format!("cannot anchor {date} in {tz}")))?;
    Ok(anchored
        .with_timezone(&Utc)
        .format("%Y%m%dT%H%M%SZ")
        .to_string())
}

fn escape_ics(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace(',', "\\,")
        .replace(';', "\\;")
}
