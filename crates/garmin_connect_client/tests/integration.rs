mod common;

use chrono::NaiveDate;
use common::connected_client;
use garmin_connect_client::{GarminConnect, GarminError};
use std::io::{Cursor, Write};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 7, 21).unwrap()
}

fn zip_with(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, body) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[tokio::test]
async fn daily_endpoints_use_account_and_date_parameters() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/modern/proxy/wellness-service/wellness/dailySleepData/runner42",
        ))
        .and(query_param("date", "2018-07-21"))
        .and(query_param("nonSleepBufferMinutes", "60"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "dailySleepDTO": {"calendarDate": "2018-07-21", "sleepTimeSeconds": 27000}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(
            "/modern/proxy/wellness-service/wellness/dailyHeartRate/runner42",
        ))
        .and(query_param("date", "2018-07-21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "calendarDate": "2018-07-21", "maxHeartRate": 171
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(
            "/modern/proxy/wellness-service/wellness/dailyMovement/runner42",
        ))
        .and(query_param("calendarDate", "2018-07-21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "calendarDate": "2018-07-21", "movementValues": [[1532131200000i64, 0.5]]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(
            "/modern/proxy/usersummary-service/usersummary/daily/runner42",
        ))
        .and(query_param("calendarDate", "2018-07-21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "calendarDate": "2018-07-21", "totalSteps": 10432
        })))
        .mount(&server)
        .await;

    let sleep = client.get_daily_sleep_data(day()).await.unwrap().unwrap();
    assert_eq!(sleep["dailySleepDTO"]["sleepTimeSeconds"], 27000);
    let hr = client.get_daily_hr_data(day()).await.unwrap().unwrap();
    assert_eq!(hr["maxHeartRate"], 171);
    let movement = client.get_daily_movement(day()).await.unwrap().unwrap();
    assert_eq!(movement["movementValues"][0][1], 0.5);
    let summary = client.get_user_summary(day()).await.unwrap().unwrap();
    assert_eq!(summary["totalSteps"], 10432);
}

#[tokio::test]
async fn not_found_and_no_content_are_absent_not_errors() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;

    Mock::given(method("GET"))
        .and(path(
            "/modern/proxy/wellness-service/wellness/dailySleepData/runner42",
        ))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(
            "/modern/proxy/wellness-service/wellness/dailyHeartRate/runner42",
        ))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/download-service/export/tcx/activity/77"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/activity-service/activity/77"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/download-service/files/activity/77"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(client.get_daily_sleep_data(day()).await.unwrap().is_none());
    assert!(client.get_daily_hr_data(day()).await.unwrap().is_none());
    assert!(client.get_activity_tcx(77).await.unwrap().is_none());
    assert!(client.get_activity_summary(77).await.unwrap().is_none());
    assert!(client.get_original_activity(77).await.unwrap().is_none());
    assert!(client.get_activity_fit(77).await.unwrap().is_none());
}

#[tokio::test]
async fn unexpected_status_is_request_error_with_status_and_body() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;

    for (status, route) in [
        (500, "/modern/proxy/usersummary-service/usersummary/daily/runner42"),
        (403, "/modern/proxy/wellness-service/wellness/dailyMovement/runner42"),
        (201, "/modern/proxy/download-service/export/gpx/activity/5"),
        (502, "/modern/proxy/activity-service-1.3/json/activityDetails/5"),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(format!("body {status}")))
            .mount(&server)
            .await;
    }

    fn check<T: std::fmt::Debug>(res: Result<T, GarminError>, expected: u16) {
        match res {
            Err(GarminError::Request { status, body }) => {
                assert_eq!(status, expected);
                assert_eq!(body, format!("body {expected}"));
            }
            other => panic!("expected request error, got {other:?}"),
        }
    }

    check(client.get_user_summary(day()).await, 500);
    check(client.get_daily_movement(day()).await, 403);
    check(client.get_activity_gpx(5).await, 201);
    check(client.get_activity_details(5).await, 502);
}

#[tokio::test]
async fn gpx_and_tcx_return_raw_text() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    let gpx = "<?xml version=\"1.0\"?><gpx><trk/></gpx>";
    let tcx = "<?xml version=\"1.0\"?><TrainingCenterDatabase/>";

    Mock::given(method("GET"))
        .and(path("/modern/proxy/download-service/export/gpx/activity/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(gpx))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/download-service/export/tcx/activity/42"))
        .respond_with(ResponseTemplate::new(200).set_body_string(tcx))
        .mount(&server)
        .await;

    assert_eq!(client.get_activity_gpx(42).await.unwrap().as_deref(), Some(gpx));
    assert_eq!(client.get_activity_tcx(42).await.unwrap().as_deref(), Some(tcx));
}

#[tokio::test]
async fn activity_summary_and_details_decode_json() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/modern/proxy/activity-service/activity/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "activityId": 42,
            "summaryDTO": {"startTimeGMT": "2018-07-21T10:32:11.0"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/activity-service-1.3/json/activityDetails/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "com.garmin.activity.details.json.ActivityDetails": {"measurements": []}
        })))
        .mount(&server)
        .await;

    let summary = client.get_activity_summary(42).await.unwrap().unwrap();
    assert_eq!(summary["activityId"], 42);
    let details = client.get_activity_details(42).await.unwrap().unwrap();
    assert!(details.is_object());
}

#[tokio::test]
async fn malformed_json_is_decode_error() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/activity-service/activity/9"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    assert!(matches!(
        client.get_activity_summary(9).await,
        Err(GarminError::Decode(_))
    ));
}

#[tokio::test]
async fn original_file_is_unpacked_from_archive() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;

    Mock::given(method("GET"))
        .and(path("/modern/proxy/download-service/files/activity/1001"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(zip_with(&[("1001.fit", b"FITDATA")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/download-service/files/activity/1002"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(zip_with(&[("1002.gpx", b"<gpx/>")])),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/download-service/files/activity/1003"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(zip_with(&[("other.fit", b"X")])),
        )
        .mount(&server)
        .await;

    let fit = client.get_original_activity(1001).await.unwrap().unwrap();
    assert_eq!(fit.extension, "fit");
    assert_eq!(fit.bytes, b"FITDATA");
    assert_eq!(client.get_activity_fit(1001).await.unwrap(), Some(b"FITDATA".to_vec()));

    let gpx = client.get_original_activity(1002).await.unwrap().unwrap();
    assert_eq!(gpx.extension, "gpx");
    assert_eq!(client.get_activity_fit(1002).await.unwrap(), None);

    assert_eq!(client.get_original_activity(1003).await.unwrap(), None);
}

#[tokio::test]
async fn original_file_server_error_is_request_error() {
    let server = MockServer::start().await;
    let client = connected_client(&server).await;
    Mock::given(method("GET"))
        .and(path("/modern/proxy/download-service/files/activity/5"))
        .respond_with(ResponseTemplate::new(500).set_body_string("down"))
        .mount(&server)
        .await;

    assert!(matches!(
        client.get_original_activity(5).await,
        Err(GarminError::Request { status: 500, .. })
    ));
}
