mod common;

use common::{connected_client, mount_json};
use garmin_connect_sync::export::{self, NOT_FOUND_FILE, export_path};
use garmin_connect_sync::{ExportFormat, SyncError};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/modern/proxy/activitylist-service/activities/search/activities";

async fn mount_activity_list(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("start", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"activityId": 2002, "startTimeGMT": "2018-07-22 06:15:00"},
            {"activityId": 2001, "startTimeGMT": "2018-07-21 06:00:00"}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("start", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(server)
        .await;
}

async fn mount_exports(server: &MockServer, id: u64, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/modern/proxy/download-service/export/gpx/activity/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!("<gpx>{id}</gpx>")))
        .expect(expected_calls)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/modern/proxy/download-service/files/activity/{id}")))
        .respond_with(ResponseTemplate::new(404))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn backup_downloads_everything_once() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    let dir = tempfile::tempdir().unwrap();
    mount_activity_list(&server).await;
    mount_exports(&server, 2001, 1).await;
    mount_exports(&server, 2002, 1).await;

    let formats = [ExportFormat::Gpx, ExportFormat::Fit];
    let first = export::backup(&client, dir.path(), &formats, 100).await.unwrap();
    assert_eq!((first.listed, first.downloaded), (2, 2));

    let gpx = std::fs::read_to_string(dir.path().join("2018-07-22T06:15:00+00:00_2002.gpx")).unwrap();
    assert_eq!(gpx, "<gpx>2002</gpx>");
    let not_found = std::fs::read_to_string(dir.path().join(NOT_FOUND_FILE)).unwrap();
    let mut recorded: Vec<_> = not_found.lines().collect();
    recorded.sort();
    assert_eq!(
        recorded,
        vec![
            "2018-07-21T06:00:00+00:00_2001.fit",
            "2018-07-22T06:15:00+00:00_2002.fit"
        ]
    );

    // present files and recorded misses are not requested again
    let second = export::backup(&client, dir.path(), &formats, 100).await.unwrap();
    assert_eq!((second.listed, second.downloaded), (2, 0));
}

#[tokio::test]
async fn single_activity_export_resolves_start_time_from_summary() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    let dir = tempfile::tempdir().unwrap();
    let summary = json!({
        "activityId": 2001,
        "summaryDTO": {"startTimeGMT": "2018-07-21T06:00:00.0"}
    });
    mount_json(&server, "/modern/proxy/activity-service/activity/2001", 200, summary.clone()).await;
    mount_json(
        &server,
        "/modern/proxy/activity-service-1.3/json/activityDetails/2001",
        200,
        json!({"measurements": []}),
    )
    .await;

    let activity = export::fetch_activity_ref(&client, 2001).await.unwrap();
    let report = export::download_activity(
        &client,
        &activity,
        dir.path(),
        &[ExportFormat::JsonSummary, ExportFormat::JsonDetails],
    )
    .await
    .unwrap();

    let summary_path = export_path(dir.path(), &activity, ExportFormat::JsonSummary);
    assert_eq!(
        summary_path.file_name().unwrap(),
        "2018-07-21T06:00:00+00:00_2001_summary.json"
    );
    assert_eq!(report.written.len(), 2);
    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(summary_path).unwrap()).unwrap();
    assert_eq!(written, summary);
}

#[tokio::test]
async fn unknown_activity_is_validation_error() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/activity-service/activity/404"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(matches!(
        export::fetch_activity_ref(&client, 404).await,
        Err(SyncError::Validation(_))
    ));
}
