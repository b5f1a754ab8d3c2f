#![allow(dead_code)]

use garmin_connect_client::http_client::ReqwestGarminClient;
use secrecy::SecretString;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DISPLAY_NAME: &str = "runner42";

/// Login page body assigning the ticket URL the way the SSO page script does.
pub fn login_page(server: &MockServer) -> String {
    let ticket = format!("{}/modern?ticket=ST-0123456-abc-cas", server.uri()).replace('/', "\\/");
    format!("<html><script>\nvar response_url = \"{ticket}\";\n</script></html>")
}

/// Mount the three requests of a successful login.
pub async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/sso/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_page(server)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/modern"))
        .and(query_param("ticket", "ST-0123456-abc-cas"))
        .respond_with(
            ResponseTemplate::new(200).insert_header("set-cookie", "SESSIONID=abc123; Path=/"),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/legacy/session"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

pub fn client_for(server: &MockServer) -> ReqwestGarminClient {
    ReqwestGarminClient::new(
        &format!("{}/sso/login", server.uri()),
        &server.uri(),
        DISPLAY_NAME,
    )
}

pub async fn connected_client(server: &MockServer) -> ReqwestGarminClient {
    mount_login(server).await;
    let mut client = client_for(server);
    client
        .connect("runner@example.com", &SecretString::new("pw".into()))
        .await
        .expect("connect");
    client
}
