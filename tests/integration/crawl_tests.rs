//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end over real HTTP.

use site_crawler::config::{Config, SchedulerConfig};
use site_crawler::{crawl, CrawlResult, CrawlStatus};
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with no start delay and a short timeout
fn create_test_config() -> Config {
    let mut config = Config::default();
    config.crawler.user_agent = "TestBot/1.0".to_string();
    config.scheduler = SchedulerConfig {
        request_timeout: 2_000,
        ..SchedulerConfig::no_delay()
    };
    config
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(body))
        .mount(server)
        .await;
}

fn seed(server: &MockServer) -> Url {
    Url::parse(&server.uri()).expect("Failed to parse server URI")
}

fn location(server: &MockServer, route: &str) -> Url {
    seed(server).join(route).expect("Failed to join route")
}

fn status_of(result: &CrawlResult, uri: &Url) -> Option<CrawlStatus> {
    result.find(uri).map(|crawled| crawled.status)
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/page1">Page 1</a> <a href="/page2">Page 2</a>"#,
    )
    .await;
    mount_page(&mock_server, "/page1", r#"<a href="/page3">Page 3</a>"#).await;
    mount_page(&mock_server, "/page2", r#"<a href="/">Home</a>"#).await;
    mount_page(&mock_server, "/page3", "leaf").await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    assert_eq!(result.crawled_uris.len(), 4);
    assert_eq!(result.count_with_status(CrawlStatus::Crawled), 4);

    let home = result.find(&seed(&mock_server)).expect("home not recorded");
    let content = home.content.as_ref().expect("home has no content");
    assert_eq!(content.links.len(), 2);
    assert_eq!(content.links[0].text.as_deref(), Some("Page 1"));
    assert!(content.raw_content.contains("/page2"));
}

#[tokio::test]
async fn test_sitemap_seeds_frontier() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "User-agent: *\nAllow: /\nSitemap: {}/custom-sitemap.xml\n",
            mock_server.uri()
        )))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/custom-sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            "<?xml version=\"1.0\"?><urlset><url><loc>{}/orphan</loc></url></urlset>",
            mock_server.uri()
        )))
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/", "no links here").await;
    mount_page(&mock_server, "/orphan", "only in the sitemap").await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    assert_eq!(
        status_of(&result, &location(&mock_server, "/orphan")),
        Some(CrawlStatus::Crawled)
    );
    assert_eq!(result.crawled_uris.len(), 2);
}

#[tokio::test]
async fn test_robots_disallowed_path_is_never_fetched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/", r#"<a href="/private/secret">Secret</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let secret = result
        .find(&location(&mock_server, "/private/secret"))
        .expect("blocked URI not recorded");
    assert_eq!(secret.status, CrawlStatus::RobotsBlocked);
    assert!(secret.requests.is_empty());
}

#[tokio::test]
async fn test_redirect_into_disallowed_path_is_blocked() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private\n"),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/private/x"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/x"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let blocked = result
        .find(&location(&mock_server, "/private/x"))
        .expect("redirect target not recorded");
    assert_eq!(blocked.status, CrawlStatus::RobotsBlocked);
    assert_eq!(blocked.redirect_chain.len(), 1);
    assert!(blocked.requests.is_empty());
    assert_eq!(result.crawled_uris.len(), 1);
}

#[tokio::test]
async fn test_server_error_retried_until_limit() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/broken">Broken</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let broken = result
        .find(&location(&mock_server, "/broken"))
        .expect("broken page not recorded");
    assert_eq!(broken.status, CrawlStatus::MaxRetries);
    assert_eq!(broken.requests.len(), 3);
    assert!(broken.content.is_none());
}

#[tokio::test]
async fn test_not_found_is_crawled_without_content() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/missing">Missing</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let missing = result
        .find(&location(&mock_server, "/missing"))
        .expect("missing page not recorded");
    assert_eq!(missing.status, CrawlStatus::Crawled);
    assert_eq!(missing.requests.len(), 1);
    assert_eq!(missing.last_status_code().map(|s| s.as_u16()), Some(404));
    assert!(missing.content.is_none());
}

#[tokio::test]
async fn test_timeout_is_recorded_as_failure() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/slow">Slow</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("slow").set_delay(Duration::from_secs(5)))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config();
    config.scheduler.request_timeout = 200;

    let result = crawl(&seed(&mock_server), &config)
        .await
        .expect("Crawl failed");

    let slow = result
        .find(&location(&mock_server, "/slow"))
        .expect("slow page not recorded");
    assert_eq!(slow.status, CrawlStatus::MaxRetries);
    assert_eq!(slow.requests.len(), 3);
    assert!(slow.requests.iter().all(|r| r.status_code().is_none()));
}

#[tokio::test]
async fn test_redirect_chain_is_followed() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/old">Old</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", "/interim"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/interim"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/new", "arrived").await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let arrived = result
        .find(&location(&mock_server, "/new"))
        .expect("redirect target not recorded");
    assert_eq!(arrived.status, CrawlStatus::Crawled);
    assert!(arrived.content.is_some());

    let hops: Vec<&str> = arrived
        .redirect_chain
        .iter()
        .map(|hop| hop.location.path())
        .collect();
    assert_eq!(hops, vec!["/old", "/interim"]);
    assert_eq!(arrived.total_requests(), 3);

    // Intermediate hops are part of the chain, not separate records
    assert!(result.find(&location(&mock_server, "/old")).is_none());
    assert!(result.find(&location(&mock_server, "/interim")).is_none());
}

#[tokio::test]
async fn test_redirect_limit() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/r1">Start</a>"#).await;

    for (from, to) in [("/r1", "/r2"), ("/r2", "/r3"), ("/r3", "/r4")] {
        Mock::given(method("GET"))
            .and(path(from))
            .respond_with(ResponseTemplate::new(302).insert_header("location", to))
            .mount(&mock_server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path("/r4"))
        .respond_with(html("too far"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let record = result
        .find(&location(&mock_server, "/r4"))
        .expect("redirect limit not recorded");
    assert_eq!(record.status, CrawlStatus::MaxRedirects);
    assert_eq!(record.redirect_chain.len(), 3);
    assert!(record.requests.is_empty());
}

#[tokio::test]
async fn test_redirect_loop() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/ping">Ping</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/pong"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/pong"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/ping"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let record = result
        .find(&location(&mock_server, "/ping"))
        .expect("redirect loop not recorded");
    assert_eq!(record.status, CrawlStatus::MaxRedirects);
    assert_eq!(record.redirect_chain.len(), 2);
}

#[tokio::test]
async fn test_meta_noindex_blocks_page() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/", r#"<a href="/hidden">Hidden</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"<html><head><meta name="robots" content="noindex"></head>
            <body><a href="/behind">Behind</a></body></html>"#,
            "text/html",
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/behind"))
        .respond_with(html("behind"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let hidden = result
        .find(&location(&mock_server, "/hidden"))
        .expect("noindex page not recorded");
    assert_eq!(hidden.status, CrawlStatus::RobotsBlocked);
    assert!(hidden.content.is_none());
    assert_eq!(hidden.requests.len(), 1);
}

#[tokio::test]
async fn test_x_robots_tag_nofollow() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/unfollowed">Link</a>"#).insert_header("x-robots-tag", "nofollow"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/unfollowed"))
        .respond_with(html("never"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let home = result.find(&seed(&mock_server)).expect("home not recorded");
    assert_eq!(home.status, CrawlStatus::Crawled);
    // The link is still reported, just not followed
    assert_eq!(home.content.as_ref().map(|c| c.links.len()), Some(1));
    assert_eq!(result.crawled_uris.len(), 1);
}

#[tokio::test]
async fn test_rel_nofollow_link_not_followed() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="/followed">Yes</a> <a href="/sponsored" rel="sponsored nofollow">No</a>"#,
    )
    .await;
    mount_page(&mock_server, "/followed", "yes").await;

    Mock::given(method("GET"))
        .and(path("/sponsored"))
        .respond_with(html("no"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    assert_eq!(result.crawled_uris.len(), 2);
    assert!(result.find(&location(&mock_server, "/sponsored")).is_none());
}

#[tokio::test]
async fn test_external_links_are_listed_but_not_crawled() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<a href="http://external.invalid/page">Elsewhere</a> <a href="/local">Local</a>"#,
    )
    .await;
    mount_page(&mock_server, "/local", "local").await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let home = result.find(&seed(&mock_server)).expect("home not recorded");
    let links = &home.content.as_ref().expect("home has no content").links;
    assert!(links
        .iter()
        .any(|link| link.location.host_str() == Some("external.invalid")));

    assert_eq!(result.crawled_uris.len(), 2);
    assert!(result
        .crawled_uris
        .iter()
        .all(|uri| uri.location.host_str() == seed(&mock_server).host_str()));
}

#[tokio::test]
async fn test_page_limit_is_exact() {
    for max_pages in [2, 4] {
        let mock_server = MockServer::start().await;

        let links: String = (1..=9)
            .map(|i| format!(r#"<a href="/page{}">Page {}</a> "#, i, i))
            .collect();
        mount_page(&mock_server, "/", &links).await;
        for i in 1..=9 {
            mount_page(&mock_server, &format!("/page{}", i), &links).await;
        }

        let mut config = create_test_config();
        config.crawler.max_number_of_pages_to_crawl = max_pages;

        let result = crawl(&seed(&mock_server), &config)
            .await
            .expect("Crawl failed");

        assert_eq!(result.crawled_uris.len(), max_pages);
    }
}

#[tokio::test]
async fn test_each_location_recorded_once() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r##"<a href="/a">A</a> <a href="/a#top">A again</a> <a href="/b">B</a> <a href="#self">Self</a>"##,
    )
    .await;
    mount_page(&mock_server, "/b", r#"<a href="/a">A</a> <a href="/">Home</a>"#).await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html(r#"<a href="/b#bottom">B</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = crawl(&seed(&mock_server), &create_test_config())
        .await
        .expect("Crawl failed");

    let locations: HashSet<&Url> = result.crawled_uris.iter().map(|uri| &uri.location).collect();
    assert_eq!(locations.len(), result.crawled_uris.len());
    assert_eq!(result.crawled_uris.len(), 3);
    assert!(result.crawled_uris.iter().all(|uri| uri.location.fragment().is_none()));
}
