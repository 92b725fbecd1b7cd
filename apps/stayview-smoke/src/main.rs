//! Headless smoke run: fetch one apartment record, initialize the gallery,
//! and print the resulting snapshot.

mod config;
mod logging;

use tracing::info;

use viewer_core::{GalleryStateMachine, MediaKind, NormalizedRecord, ViewerEvent};
use viewer_transport::{ResilientFetcher, ViewerSession};

use crate::config::SmokeConfig;

#[tokio::main]
async fn main() {
    logging::init();

    let config = match SmokeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Invalid configuration: {err}");
            std::process::exit(2);
        }
    };

    let Some(apartment_id) = config.apartment_id.clone() else {
        println!("Transports initialized. Set STAYVIEW_APARTMENT_ID to run a live fetch.");
        println!("Optional: STAYVIEW_BASE_URL to target a non-default API.");
        return;
    };

    info!(apartment_id, base_url = %config.base_url, "starting smoke fetch");

    let fetcher = ResilientFetcher::new(config.base_url.clone());
    let session = ViewerSession::new(fetcher, config.event_buffer);
    let mut events = session.subscribe();

    session.load(&apartment_id).await;

    loop {
        match events.recv().await {
            Ok(ViewerEvent::Loading { identifier }) => {
                println!("Loading apartment '{identifier}'...");
            }
            Ok(ViewerEvent::RecordLoaded { record, .. }) => {
                print_snapshot(&record);
                return;
            }
            Ok(ViewerEvent::FetchFailed { error, .. }) => {
                eprintln!("Fetch failed: {error}");
                if error.is_transient() {
                    eprintln!("The failure was transient; rerunning may succeed.");
                }
                std::process::exit(1);
            }
            Err(_) => {
                eprintln!("Event stream closed before the cycle finished.");
                std::process::exit(1);
            }
        }
    }
}

fn print_snapshot(record: &NormalizedRecord) {
    let gallery = GalleryStateMachine::new(record.clone());
    let state = gallery.state();

    println!();
    println!("{}", record.apartment_name);
    println!("  {}", record.location_line());
    println!(
        "  {} guests, {} bed(s), {} bedroom(s), {} bathroom(s)",
        record.guests, record.beds, record.bedrooms, record.bathrooms
    );
    if !record.amenities.is_empty() {
        println!("  Amenities: {}", record.amenities.join(", "));
    }
    println!(
        "  Media: {} image(s), {} video(s)",
        record.images.len(),
        record.videos.len()
    );
    for video in &record.videos {
        println!(
            "    video {} ({})",
            video.url,
            video.mime_type.as_deref().unwrap_or("video/mp4")
        );
    }
    match state.media_type {
        MediaKind::Video => println!("  Gallery opens on the video tour."),
        MediaKind::Image => match gallery.active_image() {
            Some(image) => println!("  Gallery opens on image: {}", image.url),
            None => println!("  Gallery has no media to display."),
        },
    }
}
