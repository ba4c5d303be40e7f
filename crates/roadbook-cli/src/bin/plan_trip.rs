//! Plan a trip against an OSRM-compatible server and print its roadbook.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roadbook_cli::{
    format_distance, format_duration, parse_lat_lng, parse_transit_mode, render_roadbook,
    StderrReporter,
};
use roadbook_core::{
    build_profile, Geometry, ProviderRegistry, Route, RouteEvent, Router, RouterConfig,
    SphericalMercator, Travel, WayPoint,
};
use roadbook_osrm::OsrmProvider;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a trip and print its roadbook")]
struct Args {
    /// Start way point as LAT,LNG
    #[arg(long)]
    from: String,

    /// Destination way point as LAT,LNG
    #[arg(long)]
    to: String,

    /// Intermediate way point as LAT,LNG (repeatable)
    #[arg(long)]
    via: Vec<String>,

    /// Transit mode: car, bike or pedestrian
    #[arg(long, default_value = "car")]
    mode: String,

    /// OSRM-compatible routing server
    #[arg(long, default_value = "https://router.project-osrm.org")]
    server: String,

    /// Give up on the provider after this many seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    /// Route name used in the roadbook and the saved document
    #[arg(long, default_value = "Route")]
    name: String,

    /// Write the travel document to this file
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let transit_mode = parse_transit_mode(&args.mode)?;

    let mut route = Route::new(roadbook_osrm::PROVIDER_NAME, transit_mode);
    route.name = args.name.clone();
    let (lat, lng) = parse_lat_lng(&args.from)?;
    route.way_points.push(WayPoint::named("start", lat, lng));
    for via in &args.via {
        let (lat, lng) = parse_lat_lng(via)?;
        route.way_points.push(WayPoint::new(lat, lng));
    }
    let (lat, lng) = parse_lat_lng(&args.to)?;
    route.way_points.push(WayPoint::named("end", lat, lng));

    let providers = ProviderRegistry::new();
    providers.register(Arc::new(OsrmProvider::new(&args.server)));
    let router = Router::with_config(
        Geometry::new(Arc::new(SphericalMercator)),
        providers,
        Arc::new(StderrReporter),
        RouterConfig {
            provider_timeout: Duration::from_secs(args.timeout_secs),
            ..RouterConfig::default()
        },
    );
    let mut events = router.subscribe();

    router.start_routing(&mut route).await;
    while let Ok(event) = events.try_recv() {
        if let RouteEvent::ZoomToRoute { bounds } = &event {
            let (lat, lng) = bounds.center();
            tracing::info!(lat, lng, "route centered");
        }
        tracing::debug!(?event, "route event");
    }

    if route.itinerary.itinerary_points.is_empty() {
        // The router already reported the reason
        bail!("routing failed");
    }

    print!("{}", render_roadbook(&route));
    if let Some(profile) = build_profile(&route) {
        println!(
            "elevation: {:.0} m to {:.0} m over {} ({})",
            profile.min_elev(),
            profile.max_elev(),
            format_distance(route.distance),
            format_duration(route.duration)
        );
    }

    if let Some(path) = &args.out {
        let mut travel = Travel::new(args.name);
        travel.saved_at = Some(chrono::Utc::now());
        travel.routes.push(route);
        std::fs::write(path, serde_json::to_string_pretty(&travel)?)?;
        println!("travel document written to {}", path.display());
    }

    Ok(())
}
