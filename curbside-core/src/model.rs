//! Domain data structures for locations, upstream events, and pickup occurrences.

use std::fmt;

use chrono::{Months, NaiveDate};
use serde::Deserialize;

use crate::ports::PortError;

/// Date format used by the upstream API for event days and query windows.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Rendering used when a pickup day is spoken back, e.g. "Tuesday, June 22, 2021".
const DISPLAY_DAY_FORMAT: &str = "%A, %B %-d, %Y";

/// Service category tag carried by flags that describe a curbside collection.
const WASTE_SERVICE: &str = "waste";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Upstream identifier resolved from a free-text street address.
pub struct LocationId(pub String);

impl fmt::Display for LocationId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Start/end window for requested schedules.
pub struct DateRange {
    /// Lower bound, sent upstream as `after`.
    pub start: NaiveDate,
    /// Upper bound, sent upstream as `before`.
    pub end: NaiveDate,
}

impl DateRange {
    /// Window from `today` to the same day of the following month.
    ///
    /// Days that do not exist in the following month are clamped to its last day,
    /// so January 31 maps to the end of February.
    #[must_use]
    pub fn month_from(today: NaiveDate) -> Self {
        let end = today
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        Self { start: today, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// One tag attached to an upstream event.
pub struct RawFlag {
    /// Service code, e.g. `garbage` or `yardwaste`.
    #[serde(default)]
    pub name: String,
    /// Service category; only `waste` flags describe a pickup.
    #[serde(default)]
    pub service_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Event as returned by the upstream events endpoint.
pub struct RawEvent {
    /// Event day in `YYYY-MM-DD` form.
    pub day: String,
    /// Tags describing what happens on that day.
    #[serde(default)]
    pub flags: Vec<RawFlag>,
}

impl RawEvent {
    /// First waste flag of the event, if any.
    fn waste_flag(&self) -> Option<&RawFlag> {
        self.flags
            .iter()
            .find(|flag| flag.service_name == WASTE_SERVICE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A single waste-collection service scheduled on one calendar day.
pub struct PickupOccurrence {
    day: NaiveDate,
    service_code: String,
}

impl PickupOccurrence {
    /// Construct an occurrence from an already parsed day.
    #[must_use]
    pub fn new<S: Into<String>>(day: NaiveDate, service_code: S) -> Self {
        Self {
            day,
            service_code: service_code.into(),
        }
    }

    /// Calendar day of the pickup.
    #[must_use]
    pub fn day(&self) -> NaiveDate {
        self.day
    }

    /// Raw service code as reported upstream.
    #[must_use]
    pub fn service_code(&self) -> &str {
        &self.service_code
    }

    /// Friendly name of the service.
    #[must_use]
    pub fn display_name(&self) -> &str {
        display_name(&self.service_code)
    }

    /// Pickup day rendered as `<Weekday>, <Month> <Day>, <Year>`.
    #[must_use]
    pub fn display_day(&self) -> String {
        self.day.format(DISPLAY_DAY_FORMAT).to_string()
    }
}

/// Map an upstream service code to the name spoken to the user.
#[must_use]
pub fn display_name(service_code: &str) -> &str {
    match service_code {
        "yardwaste" => "Yard Waste",
        "looseleaf" => "Leaf Collection",
        other => other,
    }
}

/// Turn upstream events into pickup occurrences.
///
/// Only the first `waste` flag of each event is kept and events without one are
/// dropped. Upstream order is preserved: the result is ascending by day and
/// same-day occurrences are adjacent exactly when the upstream list is, which
/// the next-pickup query relies on.
///
/// # Errors
///
/// Returns [`PortError::ScheduleParse`] when a kept event carries a day that is
/// not a `YYYY-MM-DD` date.
pub fn occurrences_from_events(events: &[RawEvent]) -> Result<Vec<PickupOccurrence>, PortError> {
    events
        .iter()
        .filter_map(|event| event.waste_flag().map(|flag| (event, flag)))
        .map(|(event, flag)| {
            let day = NaiveDate::parse_from_str(&event.day, DATE_FORMAT).map_err(|err| {
                PortError::ScheduleParse(format!("invalid event day {:?}: {err}", event.day))
            })?;
            Ok(PickupOccurrence::new(day, flag.name.clone()))
        })
        .collect()
}
