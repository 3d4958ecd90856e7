//! Contract tests for the `ReCollect` provider against a local mock server.

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use curbside_core::model::{DateRange, LocationId, RawEvent, RawFlag};
use curbside_core::ports::{AddressPort, PortError, SchedulePort, UpstreamFailure};
use curbside_provider_recollect::{
    RecollectAddressPort, RecollectConfig, RecollectSchedulePort, client, service,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ADDRESS: &str = "1260 NW Maynard Rd";
const SUGGEST_PATH: &str = "/areas/CaryNC/services/1087/address-suggest";
const EVENTS_PATH: &str = "/places/place-42/services/1087/events";

fn config(server: &MockServer) -> RecollectConfig {
    RecollectConfig::default().with_base_url(server.uri())
}

fn address_port(config: RecollectConfig) -> RecollectAddressPort {
    let client = client(&config).expect("client builds");
    RecollectAddressPort::new(client, Arc::new(config))
}

fn schedule_port(config: RecollectConfig) -> RecollectSchedulePort {
    let client = client(&config).expect("client builds");
    RecollectSchedulePort::new(client, Arc::new(config))
}

// Base URL of a port nothing listens on any more.
fn closed_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let addr = listener.local_addr().expect("listener address");
    drop(listener);
    format!("http://{addr}/api")
}

fn march_window() -> DateRange {
    DateRange::month_from(NaiveDate::from_ymd_opt(2025, 3, 9).expect("valid date"))
}

fn location() -> LocationId {
    LocationId("place-42".to_owned())
}

async fn mount_suggestions(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(SUGGEST_PATH))
        .and(query_param("q", ADDRESS))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_events(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(query_param("nomerge", "1"))
        .and(query_param("hide", "reminder_only"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

// ────────────────────────────────────────────────────────────────────────────
// Address resolution
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_picks_first_suggestion() {
    let server = MockServer::start().await;
    mount_suggestions(
        &server,
        json!([
            {"place_id": "place-42", "name": "1260 NW Maynard Rd, Cary"},
            {"place_id": "place-43", "name": "1260 NW Maynard Rd Unit B, Cary"}
        ]),
    )
    .await;

    let location = address_port(config(&server))
        .resolve(ADDRESS)
        .await
        .expect("address resolves");

    assert_eq!(location, LocationId("place-42".to_owned()), "first candidate wins");
}

#[tokio::test]
async fn resolve_without_suggestions_is_not_found() {
    let server = MockServer::start().await;
    mount_suggestions(&server, json!([])).await;

    let result = address_port(config(&server)).resolve(ADDRESS).await;

    assert!(
        matches!(result, Err(PortError::AddressNotFound)),
        "empty suggestion list"
    );
}

#[tokio::test]
async fn resolve_maps_error_status_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SUGGEST_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let result = address_port(config(&server)).resolve(ADDRESS).await;

    assert!(
        matches!(result, Err(PortError::UpstreamUnavailable(_))),
        "server error"
    );
}

#[tokio::test]
async fn resolve_rejects_success_other_than_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SUGGEST_PATH))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!([{"place_id": "place-42"}])))
        .mount(&server)
        .await;

    let result = address_port(config(&server)).resolve(ADDRESS).await;

    assert!(
        matches!(
            result,
            Err(PortError::UpstreamUnavailable(UpstreamFailure::Status(status))) if status.as_u16() == 202
        ),
        "202 with a valid body is still unavailable"
    );
}

#[tokio::test]
async fn resolve_maps_garbled_body_to_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SUGGEST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let result = address_port(config(&server)).resolve(ADDRESS).await;

    assert!(
        matches!(result, Err(PortError::UpstreamUnavailable(_))),
        "undecodable suggestions"
    );
}

#[tokio::test]
async fn resolve_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(SUGGEST_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"place_id": "place-42"}]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let result = address_port(config(&server).with_timeout(Duration::from_millis(100)))
        .resolve(ADDRESS)
        .await;

    assert!(
        matches!(
            result,
            Err(PortError::UpstreamUnavailable(UpstreamFailure::Transport(ref err))) if err.is_timeout()
        ),
        "slow upstream hits the timeout"
    );
}

#[tokio::test]
async fn resolve_connection_refused_is_unavailable() {
    let result = address_port(RecollectConfig::default().with_base_url(closed_base_url()))
        .resolve(ADDRESS)
        .await;

    assert!(
        matches!(
            result,
            Err(PortError::UpstreamUnavailable(UpstreamFailure::Transport(ref err))) if err.is_connect()
        ),
        "nothing listening"
    );
}

// ────────────────────────────────────────────────────────────────────────────
// Schedule fetch
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn events_request_month_window() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .and(query_param("nomerge", "1"))
        .and(query_param("hide", "reminder_only"))
        .and(query_param("after", "2025-03-09"))
        .and(query_param("before", "2025-04-09"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [
                {
                    "day": "2025-03-10",
                    "flags": [
                        {"name": "holiday", "service_name": "event", "subject": "Holiday"},
                        {"name": "Garbage", "service_name": "waste"}
                    ]
                },
                {"day": "2025-03-12"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let events = schedule_port(config(&server))
        .events(&location(), march_window())
        .await
        .expect("schedule loads");

    assert_eq!(
        events,
        vec![
            RawEvent {
                day: "2025-03-10".to_owned(),
                flags: vec![
                    RawFlag {
                        name: "holiday".to_owned(),
                        service_name: "event".to_owned(),
                    },
                    RawFlag {
                        name: "Garbage".to_owned(),
                        service_name: "waste".to_owned(),
                    },
                ],
            },
            RawEvent {
                day: "2025-03-12".to_owned(),
                flags: Vec::new(),
            },
        ],
        "events are passed through in order"
    );
}

#[tokio::test]
async fn events_without_list_are_empty() {
    let server = MockServer::start().await;
    mount_events(&server, json!({})).await;

    let events = schedule_port(config(&server))
        .events(&location(), march_window())
        .await
        .expect("schedule loads");

    assert!(events.is_empty(), "missing list reads as empty");
}

#[tokio::test]
async fn events_with_wrong_shape_fail_to_parse() {
    let server = MockServer::start().await;
    mount_events(&server, json!({"events": "soon"})).await;

    let result = schedule_port(config(&server))
        .events(&location(), march_window())
        .await;

    assert!(
        matches!(result, Err(PortError::ScheduleParse(_))),
        "events must be a list"
    );
}

#[tokio::test]
async fn events_tolerate_flags_without_name() {
    let server = MockServer::start().await;
    mount_events(
        &server,
        json!({
            "events": [
                {"day": "2025-03-10", "flags": [{"service_name": "event"}, {"name": "Garbage", "service_name": "waste"}]}
            ]
        }),
    )
    .await;

    let events = schedule_port(config(&server))
        .events(&location(), march_window())
        .await
        .expect("unnamed flag does not fail the schedule");

    assert_eq!(
        events.first().and_then(|event| event.flags.first()),
        Some(&RawFlag {
            name: String::new(),
            service_name: "event".to_owned(),
        }),
        "missing name reads as empty"
    );
}

#[tokio::test]
async fn events_no_content_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let result = schedule_port(config(&server))
        .events(&location(), march_window())
        .await;

    assert!(
        matches!(
            result,
            Err(PortError::UpstreamUnavailable(UpstreamFailure::Status(status))) if status.as_u16() == 204
        ),
        "204 is not a schedule"
    );
}

#[tokio::test]
async fn events_error_status_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = schedule_port(config(&server))
        .events(&location(), march_window())
        .await;

    assert!(
        matches!(result, Err(PortError::UpstreamUnavailable(_))),
        "service unavailable"
    );
}

#[tokio::test]
async fn events_connection_refused_is_unavailable() {
    let result = schedule_port(RecollectConfig::default().with_base_url(closed_base_url()))
        .events(&location(), march_window())
        .await;

    assert!(
        matches!(
            result,
            Err(PortError::UpstreamUnavailable(UpstreamFailure::Transport(ref err))) if err.is_connect()
        ),
        "transport failures are not an empty schedule"
    );
}

// ────────────────────────────────────────────────────────────────────────────
// End to end through the query service
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn what_is_next_lists_first_pickup_day() {
    let server = MockServer::start().await;
    mount_suggestions(&server, json!([{"place_id": "place-42"}])).await;
    mount_events(
        &server,
        json!({
            "events": [
                {"day": "2025-03-10", "flags": [{"name": "Garbage", "service_name": "waste"}]},
                {"day": "2025-03-10", "flags": [{"name": "Recycling", "service_name": "waste"}]},
                {"day": "2025-03-17", "flags": [{"name": "Garbage", "service_name": "waste"}]}
            ]
        }),
    )
    .await;

    let answer = service(config(&server))
        .expect("service builds")
        .what_is_next(ADDRESS)
        .await
        .expect("answer");

    assert_eq!(answer.title, "Curbside Pick Up Schedule", "title");
    assert_eq!(
        answer.text,
        "On Monday, March 10, 2025, there will be curb side pick up for: garbage, and recycling.",
        "same-day services are listed"
    );
}

#[tokio::test]
async fn get_schedule_ignores_non_waste_flags() {
    let server = MockServer::start().await;
    mount_suggestions(&server, json!([{"place_id": "place-42"}])).await;
    mount_events(
        &server,
        json!({
            "events": [
                {
                    "day": "2025-03-10",
                    "flags": [
                        {"name": "Recycling", "service_name": "reminder"},
                        {"name": "Garbage", "service_name": "waste"},
                        {"name": "Recycling", "service_name": "waste"}
                    ]
                },
                {"day": "2025-03-12", "flags": [{"name": "yardwaste", "service_name": "waste"}]}
            ]
        }),
    )
    .await;

    let service = service(config(&server)).expect("service builds");

    let recycling = service
        .get_schedule(ADDRESS, "Recycling")
        .await
        .expect("answer");
    assert_eq!(
        recycling.text,
        "Curbside pick up for Recycling is not scheduled in the next 30 days.",
        "second waste flag and non-waste flags are ignored"
    );

    let yard_waste = service
        .get_schedule(ADDRESS, "yard waste")
        .await
        .expect("answer");
    assert_eq!(yard_waste.title, "Yard Waste Curbside Pick Up", "title");
    assert_eq!(
        yard_waste.text,
        "Curbside pick up for yard waste is on Wednesday, March 12, 2025.",
        "display name match"
    );
}

#[tokio::test]
async fn unknown_address_stops_before_schedule() {
    let server = MockServer::start().await;
    mount_suggestions(&server, json!([])).await;
    Mock::given(method("GET"))
        .and(path(EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events": []})))
        .expect(0)
        .mount(&server)
        .await;

    let result = service(config(&server))
        .expect("service builds")
        .what_is_next(ADDRESS)
        .await;

    assert!(
        matches!(result, Err(PortError::AddressNotFound)),
        "address error propagates"
    );
}
