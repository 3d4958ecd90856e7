//! Routing of voice intents to the query handlers.

use tracing::info;

use crate::config::Config;
use crate::ports::PortError;
use crate::service::{Answer, CurbsideService};

/// Intent name asking for the next pickup of one service.
pub const GET_SCHEDULE_INTENT: &str = "GetSchedule";
/// Intent name asking for everything collected on the next pickup day.
pub const WHAT_IS_NEXT_INTENT: &str = "WhatIsNext";
/// Built-in help intent of the voice platform.
pub const HELP_INTENT: &str = "AMAZON.HelpIntent";
/// Slot carrying the requested service type for [`GET_SCHEDULE_INTENT`].
pub const COLLECTION_TYPE_SLOT: &str = "collectionType";

const HELP_TEXT: &str = "You can say things like what's next or when's recycling. \
     The four supported collection types are: garbage, recycling, yard waste, and leaf collection.";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Requests understood by the dispatcher.
pub enum Intent {
    /// When is the given service picked up next.
    GetSchedule {
        /// Service type as spoken by the user.
        collection_type: String,
    },
    /// Which services are collected on the next pickup day.
    WhatIsNext,
    /// Usage help.
    Help,
    /// Anything else, carrying the original intent name.
    Unknown(String),
}

impl Intent {
    /// Classify an inbound intent by name.
    ///
    /// A missing collection type slot is treated as an empty service type.
    #[must_use]
    pub fn from_request(name: &str, collection_type: Option<&str>) -> Self {
        match name {
            GET_SCHEDULE_INTENT => Self::GetSchedule {
                collection_type: collection_type.unwrap_or_default().to_owned(),
            },
            WHAT_IS_NEXT_INTENT => Self::WhatIsNext,
            HELP_INTENT => Self::Help,
            other => Self::Unknown(other.to_owned()),
        }
    }
}

/// Routes intents for the configured address to the query handlers.
pub struct Dispatcher {
    config: Config,
    service: CurbsideService,
}

impl Dispatcher {
    /// Create a dispatcher answering for the configured address.
    #[must_use]
    pub fn new(config: Config, service: CurbsideService) -> Self {
        Self { config, service }
    }

    /// Answer a single intent.
    ///
    /// # Errors
    ///
    /// Returns the [`PortError`] of the selected handler unchanged.
    pub async fn dispatch(&self, intent: &Intent) -> Result<Answer, PortError> {
        let address = self.config.street_address();
        info!(address, ?intent, "dispatching intent");

        match intent {
            Intent::GetSchedule { collection_type } => {
                self.service.get_schedule(address, collection_type).await
            }
            Intent::WhatIsNext => self.service.what_is_next(address).await,
            Intent::Help => Ok(Answer::new("Help", HELP_TEXT)),
            Intent::Unknown(name) => {
                info!(intent = %name, "the intent was unrecognized");
                Ok(Answer::new("Unknown Request", "The intent was unrecognized"))
            }
        }
    }
}
