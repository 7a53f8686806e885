use assert_matches::assert_matches;
use httpmock::prelude::*;
use mercalli::Color;
use quake_map::config::QuakeMapConfig;
use quake_map::loader::{self, DataSource, QuakeMapError};
use quake_map::popup::popup_html;
use quake_map::session;
use quake_map::style::marker_style;

const QUAKES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {
                "mag": 4.7,
                "place": "32km SW of Testville",
                "time": 1625443141000,
                "url": "https://example.com/quakes/1"
            },
            "geometry": {"type": "Point", "coordinates": [142.37, 37.42, 10.0]}
        },
        {
            "type": "Feature",
            "properties": {
                "mag": 1.2,
                "place": "Northern Testland",
                "time": 1625443375000,
                "url": "https://example.com/quakes/2"
            },
            "geometry": {"type": "Point", "coordinates": [-120.1, 36.2, 3.2]}
        }
    ]
}"#;

const BOUNDARIES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"Name": "EU-NA"},
            "geometry": {
                "type": "LineString",
                "coordinates": [[-24.5, 63.9], [-24.0, 63.5], [-23.5, 63.1]]
            }
        }
    ]
}"#;

const SINGLE_QUAKE: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {
                "mag": 2.5,
                "place": "10km N of Testville",
                "time": 0,
                "url": "http://x"
            },
            "geometry": {"type": "Point", "coordinates": [25.0, -12.0]}
        }
    ]
}"#;

fn test_config(server: &MockServer) -> QuakeMapConfig {
    QuakeMapConfig {
        quake_feed_url: server.url("/quakes.geojson"),
        plate_boundaries_url: server.url("/boundaries.geojson"),
        ..Default::default()
    }
}

#[tokio::test]
async fn loads_both_documents() {
    let server = MockServer::start();
    let boundaries_mock = server.mock(|when, then| {
        when.method(GET).path("/boundaries.geojson");
        then.status(200).body(BOUNDARIES);
    });
    let quakes_mock = server.mock(|when, then| {
        when.method(GET).path("/quakes.geojson");
        then.status(200).body(QUAKES);
    });

    let data = loader::load(&loader::http_client(), &test_config(&server))
        .await
        .expect("failed to load data");

    boundaries_mock.assert();
    quakes_mock.assert();

    assert_eq!(data.boundaries.len(), 1);
    assert_eq!(data.earthquakes.len(), 2);
    assert_eq!(data.earthquakes[0].magnitude(), 4.7);
    assert_eq!(data.earthquakes[0].place(), "32km SW of Testville");
    assert_eq!(data.earthquakes[0].time_ms(), 1625443141000);
    assert_eq!(data.earthquakes[0].detail_url(), "https://example.com/quakes/1");
}

#[tokio::test]
async fn quakes_are_not_requested_when_boundaries_fail() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/boundaries.geojson");
        then.status(404);
    });
    let quakes_mock = server.mock(|when, then| {
        when.method(GET).path("/quakes.geojson");
        then.status(200).body(QUAKES);
    });

    let result = loader::load(&loader::http_client(), &test_config(&server)).await;

    assert_matches!(result, Err(QuakeMapError::Fetch { .. }));
    assert_eq!(quakes_mock.hits(), 0);
}

#[tokio::test]
async fn server_errors_are_fetch_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/quakes.geojson");
        then.status(500);
    });

    let result = loader::load_earthquakes(
        &loader::http_client(),
        &DataSource::Url(server.url("/quakes.geojson")),
    )
    .await;

    assert_matches!(result, Err(QuakeMapError::Fetch { url, reason }) => {
        assert_eq!(url, server.url("/quakes.geojson"));
        assert!(reason.contains("500"), "unexpected reason: {reason}");
    });
}

#[tokio::test]
async fn broken_documents_are_decode_errors() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/quakes.geojson");
        then.status(200).body("<html>service unavailable</html>");
    });

    let result = loader::load_earthquakes(
        &loader::http_client(),
        &DataSource::Url(server.url("/quakes.geojson")),
    )
    .await;

    assert_matches!(result, Err(QuakeMapError::Decode(_)));
}

#[tokio::test]
async fn loaded_quakes_drive_styling_and_popups() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/quakes.geojson");
        then.status(200).body(SINGLE_QUAKE);
    });

    let quakes = loader::load_earthquakes(
        &loader::http_client(),
        &DataSource::Url(server.url("/quakes.geojson")),
    )
    .await
    .expect("failed to load the feed");
    assert_eq!(quakes.len(), 1);

    let style = marker_style(quakes[0].magnitude());
    assert_eq!(style.fill_color, Color::from_hex("#d4ee00"));
    assert_eq!(style.radius, 10.0);

    let cache_dir = tempfile::tempdir().expect("failed to create a temp dir");
    let config = QuakeMapConfig {
        tile_cache_dir: cache_dir.path().to_path_buf(),
        ..Default::default()
    };
    let (map, mut session) = session::compose_basic(quakes, &config);
    assert_eq!(map.layers().len(), 2);

    session.open_popup(0);
    let quake = session.popup().expect("popup should be open");
    let html = popup_html(quake);
    assert!(html.contains("<strong>Magnitude: 2.5</strong>"));
    assert!(html.contains("10km N of Testville"));
    assert!(html.contains("Thu, 01 Jan 1970 00:00:00 GMT"));
}
