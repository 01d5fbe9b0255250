//! Integration tests for route resolution through the public table API.

use std::time::Duration;

use keygate::config::model::{Config, Gateway, Route};
use keygate::proxy::routing::{RouteEntry, RouteTable};

fn route(path: &str, url: &str) -> Route {
    Route {
        path: path.into(),
        url: url.into(),
        timeout: None,
    }
}

fn gateway(prefix: &str, routes: Vec<Route>) -> Config {
    Config {
        gateway: Gateway {
            prefix: prefix.into(),
            ..Gateway::default()
        },
        routes,
    }
}

#[test]
fn movie_api_through_gateway_prefix() {
    let table = RouteTable::from_config(&gateway(
        "/gateway-example",
        vec![route("/movie-api", "http://localhost:8081")],
    ));

    let m = table
        .resolve("/gateway-example/movie-api/movies/15", None)
        .unwrap();
    assert_eq!(m.upstream_url, "http://localhost:8081/movie-api/movies/15");

    let m = table
        .resolve("/gateway-example/movie-api/movies", Some("page=2"))
        .unwrap();
    assert_eq!(m.upstream_url, "http://localhost:8081/movie-api/movies?page=2");
}

#[test]
fn longest_prefix_wins_regardless_of_order() {
    let table = RouteTable::from_config(&gateway(
        "/",
        vec![
            route("/", "http://fallback:80"),
            route("/api", "http://api:80"),
            route("/api/movies", "http://movies:80"),
        ],
    ));

    let m = table.resolve("/api/movies/15", None).unwrap();
    assert_eq!(m.upstream_url, "http://movies:80/api/movies/15");

    let m = table.resolve("/api/actors/1", None).unwrap();
    assert_eq!(m.upstream_url, "http://api:80/api/actors/1");

    let m = table.resolve("/health-of-something", None).unwrap();
    assert_eq!(m.upstream_url, "http://fallback:80/health-of-something");
}

#[test]
fn prefix_requires_segment_boundary() {
    let table = RouteTable::from_config(&gateway(
        "/gateway-example",
        vec![route("/movie-api", "http://localhost:8081")],
    ));

    assert!(table.resolve("/gateway-example/movie-apix/movies", None).is_none());
    assert!(table.resolve("/gateway-examplex/movie-api", None).is_none());
    assert!(table.resolve("/movie-api/movies/15", None).is_none());
}

#[test]
fn bare_route_prefix_maps_to_its_own_path() {
    let table = RouteTable::from_config(&gateway(
        "/gateway-example",
        vec![route("/movie-api", "http://localhost:8081/")],
    ));

    let m = table.resolve("/gateway-example/movie-api", None).unwrap();
    assert_eq!(m.upstream_url, "http://localhost:8081/movie-api");
}

#[test]
fn route_timeout_overrides_gateway_default() {
    let mut config = gateway(
        "/",
        vec![route("/slow", "http://slow:80"), route("/fast", "http://fast:80")],
    );
    config.gateway.timeout = 1500;
    config.routes[0].timeout = Some(30_000);
    let table = RouteTable::from_config(&config);

    let slow = table.resolve("/slow/report", None).unwrap();
    assert_eq!(slow.entry.timeout, Duration::from_secs(30));
    let fast = table.resolve("/fast", None).unwrap();
    assert_eq!(fast.entry.timeout, Duration::from_millis(1500));
}

#[test]
fn hand_built_table_keeps_config_order_on_ties() {
    let entry = |base: &str| RouteEntry {
        prefix: "/same".into(),
        strip: String::new(),
        base_url: base.into(),
        timeout: Duration::from_secs(1),
    };
    let table = RouteTable::new(vec![entry("http://first:80"), entry("http://second:80")]);

    let m = table.resolve("/same/x", None).unwrap();
    assert_eq!(m.entry.base_url, "http://first:80");
}

#[test]
fn empty_table_resolves_nothing() {
    let table = RouteTable::new(Vec::new());
    assert!(table.is_empty());
    assert!(table.resolve("/anything", None).is_none());
}
