// Energy client against mocked token and readings endpoints: fallback start
// time, following next links, and token/cursor reset on upstream failures.

#[cfg(test)]
mod test {

    use crate::error::{AuthError, FetchError};
    use crate::helpers::time::fallback_query_time;
    use crate::observability::metrics::Metrics;
    use crate::state::token::Token;
    use crate::state::cursor::{Link, Links};
    use crate::state::store::{PersistedApi, PersistedState};
    use crate::tests::common::{energy_client, mock_token, readings_body, CUSTOMER, USERNAME};
    use chrono::{Duration, TimeZone, Utc};
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::json;

    #[tokio::test]
    async fn fallback_url_starts_one_hour_back() {
        let server = MockServer::start_async().await;
        let client = energy_client(&server);
        let now = Utc.with_ymd_and_hms(2024, 3, 10, 8, 15, 30).unwrap();

        let url = client.readings_url(now).unwrap();

        assert_eq!(
            url.as_str(),
            format!("{}/users/{}/readings/2024-03-10_07-15-30", server.base_url(), CUSTOMER)
        );
        assert_eq!(fallback_query_time(now), (now - Duration::hours(1)).format("%Y-%m-%d_%H-%M-%S").to_string());
    }

    #[tokio::test]
    async fn first_fetch_uses_fallback_and_stores_next_link() {
        let server = MockServer::start_async().await;
        let token = mock_token(&server, "abc").await;
        let next = format!("{}/users/{}/readings/next-page", server.base_url(), CUSTOMER);
        let body = readings_body(Some(&next));
        let readings = server
            .mock_async(|when, then| {
                when.method(GET)
                    .header("accept", "application/json")
                    .query_param("access_token", "abc");
                then.status(200).json_body(body);
            })
            .await;

        let mut client = energy_client(&server);
        let got = client.fetch_readings().await.expect("readings");

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].power, 1.5);
        assert_eq!(got[0].energy_reading, 1234.5);
        assert_eq!(got[0].date_time, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(client.cursor().next_href(), Some(next.as_str()));
        assert_eq!(client.cursor().self_href(), Some("https://x/self"));
        assert_eq!(token.hits_async().await, 1);
        assert_eq!(readings.hits_async().await, 1);
    }

    #[tokio::test]
    async fn stored_next_link_is_used_verbatim() {
        let server = MockServer::start_async().await;
        let token = mock_token(&server, "abc").await;
        let page = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/users/4711/readings/next-page")
                    .query_param("cursor", "42")
                    .query_param("access_token", "abc");
                then.status(200).json_body(readings_body(None));
            })
            .await;

        let mut client = energy_client(&server);
        let next = format!("{}/users/{}/readings/next-page?cursor=42", server.base_url(), CUSTOMER);
        client.restore(PersistedState {
            username: USERNAME.to_owned(),
            customer: CUSTOMER.to_owned(),
            api: PersistedApi {
                links: Links { next: Some(Link { href: next }), self_: None },
            },
            ..Default::default()
        });

        let got = client.fetch_readings().await.expect("readings");

        assert_eq!(got.len(), 1);
        page.assert_async().await;
        assert_eq!(token.hits_async().await, 1);
        // empty next link: back to the fallback start time
        assert!(client.cursor().next_href().is_none());
    }

    #[tokio::test]
    async fn empty_page_keeps_polling_from_next_link() {
        let server = MockServer::start_async().await;
        mock_token(&server, "abc").await;
        let next = format!("{}/users/{}/readings/later", server.base_url(), CUSTOMER);
        let body = json!({ "readings": [], "_links": { "next": { "href": next } } });
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(body);
            })
            .await;

        let mut client = energy_client(&server);
        let got = client.fetch_readings().await.expect("readings");

        assert!(got.is_empty());
        assert_eq!(client.cursor().next_href(), Some(next.as_str()));
    }

    #[tokio::test]
    async fn forbidden_clears_token_and_cursor() {
        let server = MockServer::start_async().await;
        let token = mock_token(&server, "abc").await;
        let next = format!("{}/users/{}/readings/next-page", server.base_url(), CUSTOMER);
        let forbidden = server
            .mock_async(|when, then| {
                when.method(GET).path("/users/4711/readings/next-page");
                then.status(403);
            })
            .await;

        let mut client = energy_client(&server);
        client.restore(PersistedState {
            username: USERNAME.to_owned(),
            customer: CUSTOMER.to_owned(),
            api: PersistedApi {
                links: Links {
                    next: Some(Link { href: next.clone() }),
                    self_: Some(Link { href: "https://x/self".to_owned() }),
                },
            },
            ..Default::default()
        });

        let err = client.fetch_readings().await.unwrap_err();

        match &err {
            FetchError::UpstreamStatus { status } => assert_eq!(status.as_u16(), 403),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
        assert!(client.token().access_token.is_empty());
        assert!(!client.token().is_valid());
        assert_eq!(client.cursor(), &Links::default());
        assert_eq!(forbidden.hits_async().await, 1);

        // next fetch starts over with a fresh token
        let _ = client.fetch_readings().await;
        assert_eq!(token.hits_async().await, 2);
    }

    #[tokio::test]
    async fn server_error_also_clears_state() {
        let server = MockServer::start_async().await;
        mock_token(&server, "abc").await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(500);
            })
            .await;

        let mut client = energy_client(&server);
        let err = client.fetch_readings().await.unwrap_err();

        assert_eq!(err.status().map(|s| s.as_u16()), Some(500));
        assert!(client.token().access_token.is_empty());
        assert!(client.cursor().next_href().is_none());
    }

    #[tokio::test]
    async fn token_failure_is_auth_error_and_skips_read() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/oauth/token");
                then.status(500);
            })
            .await;
        let readings = server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).json_body(readings_body(None));
            })
            .await;

        let mut client = energy_client(&server);
        let err = client.fetch_readings().await.unwrap_err();

        assert!(matches!(err, FetchError::Auth(AuthError::Status(_))), "unexpected error: {err:?}");
        assert_eq!(readings.hits_async().await, 0);
    }

    #[tokio::test]
    async fn malformed_page_keeps_cursor() {
        let server = MockServer::start_async().await;
        mock_token(&server, "abc").await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(200).body("{\"readings\": [ {");
            })
            .await;

        let mut client = energy_client(&server);
        let next = format!("{}/users/{}/readings/next-page", server.base_url(), CUSTOMER);
        client.restore(PersistedState {
            username: USERNAME.to_owned(),
            customer: CUSTOMER.to_owned(),
            api: PersistedApi {
                links: Links { next: Some(Link { href: next.clone() }), self_: None },
            },
            ..Default::default()
        });

        let err = client.fetch_readings().await.unwrap_err();

        assert!(matches!(err, FetchError::Parse(_)), "unexpected error: {err:?}");
        assert_eq!(client.cursor().next_href(), Some(next.as_str()));
        assert!(client.token().is_valid());
    }

    #[tokio::test]
    async fn state_of_other_account_is_ignored() {
        let server = MockServer::start_async().await;
        let mut client = energy_client(&server);

        let restored = client.restore(PersistedState {
            username: "bob".to_owned(),
            customer: CUSTOMER.to_owned(),
            api: PersistedApi {
                links: Links { next: Some(Link { href: "https://x/next".to_owned() }), self_: None },
            },
            ..Default::default()
        });

        assert!(!restored);
        assert!(client.cursor().next_href().is_none());
    }

    #[tokio::test]
    async fn restored_state_is_reflected_in_gauges() {
        let server = MockServer::start_async().await;
        let mut client = energy_client(&server);
        let metrics = Metrics::new();
        let expires = Utc::now() + Duration::hours(1);

        client.publish_gauges(&metrics);
        assert_eq!(metrics.token_expiry_unix.get(), 0);
        assert_eq!(metrics.cursor_present.get(), 0);

        assert!(client.restore(PersistedState {
            username: USERNAME.to_owned(),
            customer: CUSTOMER.to_owned(),
            token: Token {
                access_token: "abc".to_owned(),
                expires_in: 3600,
                expires_date: expires,
                ..Default::default()
            },
            api: PersistedApi {
                links: Links {
                    next: Some(Link { href: format!("{}/users/4711/readings/next-page", server.base_url()) }),
                    self_: None,
                },
            },
        }));
        client.publish_gauges(&metrics);

        assert_eq!(metrics.token_expiry_unix.get(), expires.timestamp());
        assert_eq!(metrics.cursor_present.get(), 1);
    }
}
