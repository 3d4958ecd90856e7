//! Query handlers answering pickup questions for a street address.

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::info;

use crate::model::{DateRange, PickupOccurrence, occurrences_from_events};
use crate::ports::{AddressPort, PortError, SchedulePort};

/// Spoken answer together with the card title shown alongside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// Short card title.
    pub title: String,
    /// Sentence read back to the user.
    pub text: String,
}

impl Answer {
    /// Build an answer from a title and its text.
    #[must_use]
    pub fn new<T: Into<String>, S: Into<String>>(title: T, text: S) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Public entry point for resolving an address and answering schedule queries.
pub struct CurbsideService {
    address_port: Arc<dyn AddressPort>,
    schedule_port: Arc<dyn SchedulePort>,
}

impl CurbsideService {
    /// Create a new service bound to the provided ports.
    #[must_use]
    pub fn new(address_port: Arc<dyn AddressPort>, schedule_port: Arc<dyn SchedulePort>) -> Self {
        Self {
            address_port,
            schedule_port,
        }
    }

    /// Load the pickups of the coming month for an address.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the address cannot be resolved or the schedule
    /// cannot be fetched or decoded.
    pub async fn upcoming(&self, address: &str) -> Result<Vec<PickupOccurrence>, PortError> {
        self.upcoming_from(address, Local::now().date_naive()).await
    }

    /// Load the pickups of the month starting at `today` for an address.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the address cannot be resolved or the schedule
    /// cannot be fetched or decoded.
    pub async fn upcoming_from(
        &self,
        address: &str,
        today: NaiveDate,
    ) -> Result<Vec<PickupOccurrence>, PortError> {
        let location = self.address_port.resolve(address).await?;
        let events = self
            .schedule_port
            .events(&location, DateRange::month_from(today))
            .await?;
        occurrences_from_events(&events)
    }

    /// Answer when the given service is picked up next.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the schedule cannot be loaded.
    pub async fn get_schedule(&self, address: &str, service_type: &str) -> Result<Answer, PortError> {
        let occurrences = self.upcoming(address).await?;
        Ok(schedule_answer(&occurrences, service_type))
    }

    /// Answer which services are collected on the next pickup day.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the schedule cannot be loaded.
    pub async fn what_is_next(&self, address: &str) -> Result<Answer, PortError> {
        let occurrences = self.upcoming(address).await?;
        Ok(next_pickup_answer(&occurrences))
    }
}

/// Build the answer for a single service type.
///
/// Matching is case-insensitive against the display name of each occurrence;
/// the first match wins.
#[must_use]
pub fn schedule_answer(occurrences: &[PickupOccurrence], service_type: &str) -> Answer {
    let service_type_lower = service_type.to_lowercase();

    if let Some(occurrence) = occurrences
        .iter()
        .find(|occurrence| occurrence.display_name().to_lowercase() == service_type_lower)
    {
        return Answer::new(
            format!("{} Curbside Pick Up", occurrence.display_name()),
            format!(
                "Curbside pick up for {service_type_lower} is on {}.",
                occurrence.display_day()
            ),
        );
    }

    Answer::new(
        format!("{service_type} Curbside Pick Up"),
        format!("Curbside pick up for {service_type} is not scheduled in the next 30 days."),
    )
}

/// Build the answer listing every service on the next pickup day.
///
/// Occurrences must be grouped by ascending day; collection stops at the first
/// occurrence that falls on a different day than the first one.
#[must_use]
pub fn next_pickup_answer(occurrences: &[PickupOccurrence]) -> Answer {
    let Some(first) = occurrences.first() else {
        info!("no curbside pick up is scheduled in the next 30 days");
        return Answer::new(
            "No Curbside Pick Up",
            "No curbside pick up is scheduled in the next 30 days.",
        );
    };

    let pickup_day = first.display_day();
    let mut codes: Vec<&str> = occurrences
        .iter()
        .take_while(|occurrence| occurrence.day() == first.day())
        .map(PickupOccurrence::service_code)
        .collect();
    codes.sort_unstable();

    info!(services = codes.len(), day = %pickup_day, "found services on next pickup day");

    let names: Vec<String> = codes.into_iter().map(str::to_lowercase).collect();
    Answer::new(
        "Curbside Pick Up Schedule",
        format!(
            "On {pickup_day}, there will be curb side pick up for: {}",
            join_services(&names)
        ),
    )
}

/// Join service names into a spoken list ending with a period.
fn join_services(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => format!("{only}."),
        [init @ .., last] => format!("{}, and {last}.", init.join(", ")),
    }
}
