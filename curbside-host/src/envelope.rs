use std::collections::HashMap;

use curbside_core::{COLLECTION_TYPE_SLOT, Answer, Intent};
use serde::{Deserialize, Serialize};

const RESPONSE_VERSION: &str = "1.0";

/// Inbound voice-platform request. Only the fields needed for routing are modelled.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RequestEnvelope {
    #[serde(default)]
    request: RequestBody,
}

#[derive(Debug, Default, Deserialize)]
struct RequestBody {
    #[serde(default)]
    intent: IntentBody,
}

#[derive(Debug, Default, Deserialize)]
struct IntentBody {
    #[serde(default)]
    name: String,
    #[serde(default)]
    slots: HashMap<String, Slot>,
}

#[derive(Debug, Default, Deserialize)]
struct Slot {
    #[serde(default)]
    value: Option<String>,
}

impl RequestEnvelope {
    pub(crate) fn intent(&self) -> Intent {
        let intent = &self.request.intent;
        let collection_type = intent
            .slots
            .get(COLLECTION_TYPE_SLOT)
            .and_then(|slot| slot.value.as_deref());
        Intent::from_request(&intent.name, collection_type)
    }
}

/// Outbound response with plain speech and a simple card.
#[derive(Debug, Serialize)]
pub(crate) struct ResponseEnvelope {
    version: &'static str,
    response: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ResponseBody {
    output_speech: OutputSpeech,
    card: Card,
    should_end_session: bool,
}

#[derive(Debug, Serialize)]
struct OutputSpeech {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

#[derive(Debug, Serialize)]
struct Card {
    #[serde(rename = "type")]
    kind: &'static str,
    title: String,
    content: String,
}

impl ResponseEnvelope {
    pub(crate) fn simple(answer: Answer) -> Self {
        Self {
            version: RESPONSE_VERSION,
            response: ResponseBody {
                output_speech: OutputSpeech {
                    kind: "PlainText",
                    text: answer.text.clone(),
                },
                card: Card {
                    kind: "Simple",
                    title: answer.title,
                    content: answer.text,
                },
                should_end_session: true,
            },
        }
    }
}
