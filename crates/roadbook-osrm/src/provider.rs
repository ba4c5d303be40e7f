//! Routing provider backed by an OSRM `route` service.

use async_trait::async_trait;
use serde::Deserialize;

use roadbook_core::{
    Itinerary, ItineraryPoint, Maneuver, ProviderError, Route, RouteProvider, TransitMode,
};

use crate::icons;
use crate::polyline;

/// Name under which the provider registers itself.
pub const PROVIDER_NAME: &str = "osrm";

/// OSRM encodes step geometries as polyline5 unless told otherwise.
const GEOMETRY_PRECISION: u32 = 5;

pub struct OsrmProvider {
    base_url: String,
    http: reqwest::Client,
}

impl OsrmProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    fn osrm_profile(transit_mode: TransitMode) -> Option<&'static str> {
        match transit_mode {
            TransitMode::Car => Some("driving"),
            TransitMode::Bike => Some("cycling"),
            TransitMode::Pedestrian => Some("walking"),
            TransitMode::Train | TransitMode::Line | TransitMode::Circle => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OsrmResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    legs: Vec<OsrmLeg>,
}

#[derive(Debug, Deserialize)]
struct OsrmLeg {
    steps: Vec<OsrmStep>,
}

#[derive(Debug, Deserialize)]
struct OsrmStep {
    geometry: String,
    distance: f64,
    duration: f64,
    #[serde(default)]
    name: String,
    maneuver: OsrmManeuver,
}

#[derive(Debug, Deserialize)]
struct OsrmManeuver {
    #[serde(rename = "type")]
    maneuver_type: String,
    #[serde(default)]
    modifier: Option<String>,
}

#[async_trait]
impl RouteProvider for OsrmProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn supports(&self, transit_mode: TransitMode) -> bool {
        Self::osrm_profile(transit_mode).is_some()
    }

    async fn compute_itinerary(&self, route: &Route) -> Result<Itinerary, ProviderError> {
        let transit_mode = route.itinerary.transit_mode;
        let profile = Self::osrm_profile(transit_mode).ok_or_else(|| {
            ProviderError::Provider(format!(
                "osrm does not support the {transit_mode:?} transit mode"
            ))
        })?;

        // OSRM takes lng,lat pairs
        let coordinates = route
            .way_points
            .iter()
            .map(|way_point| format!("{:.6},{:.6}", way_point.lng, way_point.lat))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!("{}/route/v1/{}/{}", self.base_url, profile, coordinates);
        tracing::debug!(%url, "requesting route");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("overview", "full"),
                ("steps", "true"),
                ("geometries", "polyline"),
            ])
            .send()
            .await
            .map_err(|_| ProviderError::Network)?;
        let status = response.status();
        let body: OsrmResponse = response.json().await.map_err(|_| ProviderError::Network)?;

        if body.code != "Ok" {
            let message = body
                .message
                .unwrap_or_else(|| format!("the provider returned code {}", body.code));
            return Err(ProviderError::Provider(message));
        }
        if !status.is_success() {
            return Err(ProviderError::Provider(format!(
                "the provider returned HTTP status {status}"
            )));
        }
        let osrm_route = body
            .routes
            .first()
            .ok_or_else(|| ProviderError::Provider("the provider returned no route".to_string()))?;

        build_itinerary(osrm_route, transit_mode)
    }
}

/// Translate an OSRM route into an itinerary: step geometries concatenated
/// into itinerary points (shared step endpoints deduplicated) and one
/// maneuver per step, anchored at the step's first point.
fn build_itinerary(
    osrm_route: &OsrmRoute,
    transit_mode: TransitMode,
) -> Result<Itinerary, ProviderError> {
    let mut itinerary = Itinerary::new(PROVIDER_NAME, transit_mode);

    for leg in &osrm_route.legs {
        for step in &leg.steps {
            let coordinates =
                polyline::decode(&step.geometry, GEOMETRY_PRECISION).map_err(|error| {
                    ProviderError::Provider(format!(
                        "the provider sent an unreadable geometry: {error}"
                    ))
                })?;

            let mut anchor = None;
            for (lat, lng) in coordinates {
                if let Some(last) = itinerary.itinerary_points.last() {
                    if same_position(last, lat, lng) {
                        anchor.get_or_insert(last.obj_id);
                        continue;
                    }
                }
                let point = ItineraryPoint::new(lat, lng);
                anchor.get_or_insert(point.obj_id);
                itinerary.itinerary_points.push(point);
            }

            // A step with an empty geometry has nothing to anchor to
            let Some(anchor) = anchor else { continue };
            let (icon_name, instruction) = icons::describe(
                &step.maneuver.maneuver_type,
                step.maneuver.modifier.as_deref(),
                &step.name,
            );
            let mut maneuver = Maneuver::new(anchor, icon_name, instruction, step.duration);
            maneuver.distance = step.distance;
            itinerary.maneuvers.push(maneuver);
        }
    }

    // OSRM carries no elevation data
    itinerary.has_profile = false;
    Ok(itinerary)
}

fn same_position(point: &ItineraryPoint, lat: f64, lng: f64) -> bool {
    (point.lat - lat).abs() < 1e-9 && (point.lng - lng).abs() < 1e-9
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::polyline::encode;

    fn response_with_steps(steps: Vec<(Vec<(f64, f64)>, &str, Option<&str>, &str)>) -> OsrmRoute {
        let steps = steps
            .into_iter()
            .map(|(coordinates, maneuver_type, modifier, name)| OsrmStep {
                geometry: encode(&coordinates, GEOMETRY_PRECISION),
                distance: 100.0,
                duration: 10.0,
                name: name.to_string(),
                maneuver: OsrmManeuver {
                    maneuver_type: maneuver_type.to_string(),
                    modifier: modifier.map(|modifier| modifier.to_string()),
                },
            })
            .collect();
        OsrmRoute {
            legs: vec![OsrmLeg { steps }],
        }
    }

    #[test]
    fn parses_the_osrm_response_shape() {
        let body = r#"{
            "code": "Ok",
            "routes": [{
                "distance": 300.0,
                "duration": 60.0,
                "legs": [{
                    "steps": [{
                        "geometry": "_ibE_seK_ibE_seK",
                        "distance": 300.0,
                        "duration": 60.0,
                        "name": "Rue de Rivoli",
                        "maneuver": { "type": "depart", "location": [2.35, 48.85] }
                    }]
                }]
            }]
        }"#;
        let parsed: OsrmResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.code, "Ok");
        assert_eq!(parsed.routes[0].legs[0].steps.len(), 1);
        assert_eq!(parsed.routes[0].legs[0].steps[0].name, "Rue de Rivoli");
        assert!(parsed.routes[0].legs[0].steps[0]
            .maneuver
            .modifier
            .is_none());
    }

    #[test]
    fn error_responses_keep_their_message() {
        let body = r#"{ "code": "NoRoute", "message": "Impossible route between points" }"#;
        let parsed: OsrmResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.code, "NoRoute");
        assert_eq!(
            parsed.message.as_deref(),
            Some("Impossible route between points")
        );
        assert!(parsed.routes.is_empty());
    }

    #[test]
    fn step_geometries_concatenate_without_duplicate_points() {
        let osrm_route = response_with_steps(vec![
            (
                vec![(48.85, 2.35), (48.86, 2.36)],
                "depart",
                None,
                "Rue A",
            ),
            (
                // First point repeats the previous step's last point
                vec![(48.86, 2.36), (48.87, 2.35)],
                "turn",
                Some("left"),
                "Rue B",
            ),
            (vec![(48.87, 2.35)], "arrive", None, ""),
        ]);

        let itinerary = build_itinerary(&osrm_route, TransitMode::Car).unwrap();

        assert_eq!(itinerary.itinerary_points.len(), 3);
        assert_eq!(itinerary.maneuvers.len(), 3);
        assert!(!itinerary.has_profile);

        // Each maneuver is anchored at its step's first point
        let points = &itinerary.itinerary_points;
        assert_eq!(itinerary.maneuvers[0].itinerary_point_obj_id, points[0].obj_id);
        assert_eq!(itinerary.maneuvers[1].itinerary_point_obj_id, points[1].obj_id);
        assert_eq!(itinerary.maneuvers[2].itinerary_point_obj_id, points[2].obj_id);

        assert_eq!(itinerary.maneuvers[0].icon_name, "depart");
        assert_eq!(itinerary.maneuvers[1].icon_name, "turn-left");
        assert_eq!(itinerary.maneuvers[1].instruction, "Turn left onto Rue B");
        assert_eq!(itinerary.maneuvers[2].icon_name, "arrive");
    }

    #[test]
    fn empty_step_geometries_are_skipped() {
        let osrm_route = response_with_steps(vec![(vec![], "depart", None, "")]);
        let itinerary = build_itinerary(&osrm_route, TransitMode::Bike).unwrap();
        assert!(itinerary.itinerary_points.is_empty());
        assert!(itinerary.maneuvers.is_empty());
    }

    #[test]
    fn transit_modes_map_to_osrm_profiles() {
        assert_eq!(OsrmProvider::osrm_profile(TransitMode::Car), Some("driving"));
        assert_eq!(
            OsrmProvider::osrm_profile(TransitMode::Bike),
            Some("cycling")
        );
        assert_eq!(
            OsrmProvider::osrm_profile(TransitMode::Pedestrian),
            Some("walking")
        );
        assert_eq!(OsrmProvider::osrm_profile(TransitMode::Circle), None);

        let provider = OsrmProvider::new("http://localhost:5000/");
        assert!(provider.supports(TransitMode::Car));
        assert!(!provider.supports(TransitMode::Train));
        assert_eq!(provider.base_url, "http://localhost:5000");
    }
}
