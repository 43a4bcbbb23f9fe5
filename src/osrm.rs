//! OSRM HTTP adapter for routes and distance matrices, with a
//! Nominatim-compatible geocoder for place lookup.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geo::{LatLng, LatLngBounds};
use crate::model::{
    DirectionsResult, Location, MatrixElement, MatrixRequest, MatrixResponse, MatrixRow,
    PlaceQuery, PlaceResult, ProviderReply, ProviderStatus, Route, RouteLeg, RouteRequest,
    TravelMode,
};
use crate::polyline::Polyline;
use crate::traits::MapProvider;

/// Half-width, in degrees, of the search box around a location bias.
const BIAS_BOX_DEGREES: f64 = 0.25;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OsrmConfig {
    pub base_url: String,
    pub geocoder_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub max_place_results: usize,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            geocoder_url: "https://nominatim.openstreetmap.org".to_string(),
            timeout_secs: 10,
            user_agent: concat!("trip-planner/", env!("CARGO_PKG_VERSION")).to_string(),
            max_place_results: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmProvider {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmProvider {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, ProviderStatus> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|err| {
                warn!(%url, error = %err, "provider transport failure");
                ProviderStatus::UnknownError
            })?;
        let http_status = response.status();
        let body = response.bytes().await.map_err(|err| {
            warn!(%url, error = %err, "provider body unreadable");
            ProviderStatus::UnknownError
        })?;

        // OSRM reports failures in a JSON `code` next to a 4xx status.
        if let Ok(OsrmCode { code: Some(code) }) = serde_json::from_slice::<OsrmCode>(&body) {
            if code != "Ok" {
                debug!(%url, %code, "provider rejected request");
                return Err(status_for_code(&code));
            }
        }
        if !http_status.is_success() {
            return Err(status_for_http(http_status));
        }
        serde_json::from_slice(&body).map_err(|err| {
            warn!(%url, error = %err, "provider answer undecodable");
            ProviderStatus::UnknownError
        })
    }

    fn service_url(&self, service: &str, profile: &str, locations: &[&Location]) -> String {
        let coords = locations
            .iter()
            .map(|location| location.position.to_lng_lat())
            .collect::<Vec<_>>()
            .join(";");
        format!(
            "{}/{}/v1/{}/{}",
            self.config.base_url, service, profile, coords
        )
    }
}

fn profile_for(mode: TravelMode) -> Option<&'static str> {
    match mode {
        TravelMode::Driving => Some("driving"),
        TravelMode::Walking => Some("foot"),
        TravelMode::Bicycling => Some("bike"),
        TravelMode::Transit => None,
    }
}

fn status_for_code(code: &str) -> ProviderStatus {
    match code {
        "NoRoute" | "NoTable" | "NoSegment" | "NoTrips" | "NoMatch" => ProviderStatus::ZeroResults,
        "TooBig" => ProviderStatus::MaxElementsExceeded,
        "InvalidUrl" | "InvalidService" | "InvalidVersion" | "InvalidOptions" | "InvalidQuery"
        | "InvalidValue" => ProviderStatus::InvalidRequest,
        _ => ProviderStatus::UnknownError,
    }
}

fn status_for_http(status: reqwest::StatusCode) -> ProviderStatus {
    match status.as_u16() {
        429 => ProviderStatus::OverQueryLimit,
        401 | 403 => ProviderStatus::RequestDenied,
        404 => ProviderStatus::NotFound,
        400 => ProviderStatus::InvalidRequest,
        _ => ProviderStatus::UnknownError,
    }
}

fn position(lng_lat: [f64; 2]) -> LatLng {
    LatLng::new(lng_lat[1], lng_lat[0])
}

impl MapProvider for OsrmProvider {
    async fn lookup_place(&self, query: &PlaceQuery) -> ProviderReply<Vec<PlaceResult>> {
        let url = format!("{}/search", self.config.geocoder_url);
        let mut params = vec![
            ("q", query.query.clone()),
            ("format", "jsonv2".to_string()),
            ("limit", self.config.max_place_results.to_string()),
        ];
        if let Some(bias) = query.location_bias {
            params.push((
                "viewbox",
                format!(
                    "{},{},{},{}",
                    bias.lng - BIAS_BOX_DEGREES,
                    bias.lat + BIAS_BOX_DEGREES,
                    bias.lng + BIAS_BOX_DEGREES,
                    bias.lat - BIAS_BOX_DEGREES
                ),
            ));
        }

        let places: Vec<NominatimPlace> = match self.fetch(&url, &params).await {
            Ok(places) => places,
            Err(status) => return ProviderReply::failed(status),
        };
        let results: Vec<PlaceResult> = places
            .into_iter()
            .filter_map(|place| {
                let lat = place.lat.parse().ok()?;
                let lng = place.lon.parse().ok()?;
                let name = if place.name.is_empty() {
                    place.display_name.clone()
                } else {
                    place.name
                };
                Some(PlaceResult {
                    place_id: place.place_id.to_string(),
                    name,
                    formatted_address: place.display_name,
                    position: LatLng::new(lat, lng),
                })
            })
            .collect();

        if results.is_empty() {
            return ProviderReply::failed(ProviderStatus::ZeroResults);
        }
        ProviderReply::ok(results)
    }

    async fn route(&self, request: &RouteRequest) -> ProviderReply<DirectionsResult> {
        let Some(profile) = profile_for(request.travel_mode) else {
            return ProviderReply::failed(ProviderStatus::InvalidRequest);
        };
        if request.optimize_waypoints {
            warn!("OSRM route service does not reorder waypoints");
            return ProviderReply::failed(ProviderStatus::InvalidRequest);
        }

        let locations: Vec<&Location> = std::iter::once(&request.origin)
            .chain(&request.waypoints)
            .chain(std::iter::once(&request.destination))
            .collect();
        let url = self.service_url("route", profile, &locations);
        let params = [
            ("overview", "full".to_string()),
            ("geometries", "geojson".to_string()),
        ];

        let body: OsrmRouteResponse = match self.fetch(&url, &params).await {
            Ok(body) => body,
            Err(status) => return ProviderReply::failed(status),
        };
        let fallback = LatLngBounds::from_point(request.origin.position)
            .extend(request.destination.position);
        let routes: Vec<Route> = body
            .routes
            .into_iter()
            .map(|route| {
                let overview_path = Polyline::new(
                    route.geometry.coordinates.into_iter().map(position).collect(),
                );
                Route {
                    legs: route
                        .legs
                        .into_iter()
                        .map(|leg| RouteLeg {
                            duration_secs: leg.duration,
                            distance_meters: leg.distance,
                        })
                        .collect(),
                    bounds: overview_path.bounds().unwrap_or(fallback),
                    overview_path,
                    waypoint_order: (0..request.waypoints.len()).collect(),
                }
            })
            .collect();

        if routes.is_empty() {
            return ProviderReply::failed(ProviderStatus::ZeroResults);
        }
        ProviderReply::ok(DirectionsResult { routes })
    }

    async fn matrix(&self, request: &MatrixRequest) -> ProviderReply<MatrixResponse> {
        let Some(profile) = profile_for(request.travel_mode) else {
            return ProviderReply::failed(ProviderStatus::InvalidRequest);
        };
        let origins = request.origins.len();
        let destinations = request.destinations.len();
        if origins == 0 || destinations == 0 {
            return ProviderReply::failed(ProviderStatus::InvalidRequest);
        }

        let locations: Vec<&Location> = request
            .origins
            .iter()
            .chain(&request.destinations)
            .collect();
        let url = self.service_url("table", profile, &locations);
        let indices = |range: std::ops::Range<usize>| {
            range.map(|i| i.to_string()).collect::<Vec<_>>().join(";")
        };
        let params = [
            ("sources", indices(0..origins)),
            ("destinations", indices(origins..origins + destinations)),
            ("annotations", "duration,distance".to_string()),
        ];

        let body: OsrmTableResponse = match self.fetch(&url, &params).await {
            Ok(body) => body,
            Err(status) => return ProviderReply::failed(status),
        };
        let Some(durations) = body.durations else {
            return ProviderReply::failed(ProviderStatus::UnknownError);
        };
        if durations.len() != origins || durations.iter().any(|row| row.len() != destinations) {
            warn!(origins, destinations, "OSRM table has unexpected shape");
            return ProviderReply::failed(ProviderStatus::UnknownError);
        }
        let distances = body.distances.unwrap_or_default();

        let rows = durations
            .into_iter()
            .enumerate()
            .map(|(row, cells)| MatrixRow {
                elements: cells
                    .into_iter()
                    .enumerate()
                    .map(|(column, duration)| MatrixElement {
                        duration_secs: duration,
                        distance_meters: distances
                            .get(row)
                            .and_then(|r| r.get(column))
                            .copied()
                            .flatten(),
                    })
                    .collect(),
            })
            .collect();

        ProviderReply::ok(MatrixResponse {
            origin_addresses: addresses(&body.sources, &request.origins),
            destination_addresses: addresses(&body.destinations, &request.destinations),
            rows,
        })
    }
}

/// Snapped street names, falling back to the requested coordinates.
fn addresses(snapped: &[OsrmWaypoint], requested: &[Location]) -> Vec<String> {
    requested
        .iter()
        .enumerate()
        .map(|(i, location)| match snapped.get(i) {
            Some(waypoint) if !waypoint.name.is_empty() => waypoint.name.clone(),
            _ => format!("{:.6},{:.6}", location.position.lat, location.position.lng),
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct OsrmCode {
    code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    legs: Vec<OsrmLeg>,
    geometry: GeoJsonLine,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    duration: f64,
    distance: f64,
}

#[derive(Debug, Deserialize)]
struct GeoJsonLine {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmTableResponse {
    durations: Option<Vec<Vec<Option<f64>>>>,
    distances: Option<Vec<Vec<Option<f64>>>>,
    #[serde(default)]
    sources: Vec<OsrmWaypoint>,
    #[serde(default)]
    destinations: Vec<OsrmWaypoint>,
}

#[derive(Debug, Deserialize)]
struct OsrmWaypoint {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    place_id: u64,
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles() {
        assert_eq!(profile_for(TravelMode::Walking), Some("foot"));
        assert_eq!(profile_for(TravelMode::Transit), None);
    }

    #[test]
    fn test_code_mapping() {
        assert_eq!(status_for_code("NoRoute"), ProviderStatus::ZeroResults);
        assert_eq!(status_for_code("TooBig"), ProviderStatus::MaxElementsExceeded);
        assert_eq!(status_for_code("InvalidQuery"), ProviderStatus::InvalidRequest);
        assert_eq!(status_for_code("Mystery"), ProviderStatus::UnknownError);
    }

    #[test]
    fn test_http_mapping() {
        assert_eq!(
            status_for_http(reqwest::StatusCode::TOO_MANY_REQUESTS),
            ProviderStatus::OverQueryLimit
        );
        assert_eq!(
            status_for_http(reqwest::StatusCode::FORBIDDEN),
            ProviderStatus::RequestDenied
        );
    }

    #[test]
    fn test_addresses_fall_back_to_coordinates() {
        let requested = vec![
            Location {
                place_id: "a".into(),
                position: LatLng::new(40.75, -73.99),
            },
            Location {
                place_id: "b".into(),
                position: LatLng::new(40.70, -74.01),
            },
        ];
        let snapped = vec![OsrmWaypoint {
            name: "West 33rd Street".into(),
        }];
        assert_eq!(
            addresses(&snapped, &requested),
            vec!["West 33rd Street".to_string(), "40.700000,-74.010000".to_string()]
        );
    }
}
