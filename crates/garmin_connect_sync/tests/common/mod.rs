#![allow(dead_code)]

use garmin_connect_client::http_client::ReqwestGarminClient;
use secrecy::SecretString;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DISPLAY_NAME: &str = "runner42";

/// Mount the three requests of a successful login.
pub async fn mount_login(server: &MockServer) {
    let ticket = format!("{}/modern?ticket=ST-1-sync-cas", server.uri()).replace('/', "\\/");
    Mock::given(method("POST"))
        .and(path("/sso/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("<script>var response_url = \"{ticket}\";</script>")),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/legacy/session"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

/// Log a client in against `server`, mounting the login exchange first.
pub async fn connected_client(server: &MockServer) -> ReqwestGarminClient {
    mount_login(server).await;

    let mut client = ReqwestGarminClient::new(
        &format!("{}/sso/login", server.uri()),
        &server.uri(),
        DISPLAY_NAME,
    );
    client
        .connect("runner@example.com", &SecretString::new("pw".into()))
        .await
        .expect("connect");
    client
}

/// Answer `GET {route}` with `status` and a JSON body.
pub async fn mount_json(server: &MockServer, route: &str, status: u16, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}
