//! Viewfinder CLI
//!
//! Command-line demo that runs a viewfinder session against the mock
//! camera provider, simulates taps, and reports session metrics.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use viewfinder::{
    capture::{HostContext, MockCameraProvider, MockConfig, Point},
    config::FileConfig,
    indicator::FocusIndicator,
    metrics::{MetricsRegistry, MetricsSnapshot},
    screen::{ScaleTransformer, ViewfinderScreen},
    session::{CameraSessionController, LifecycleScope, SessionState},
};

#[derive(Debug, Parser)]
#[command(name = "viewfinder", version, about = "Camera viewfinder tap-to-focus demo")]
struct Args {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Treat camera access as denied.
    #[arg(long)]
    deny_access: bool,

    /// Number of simulated taps (overrides config).
    #[arg(long)]
    taps: Option<u32>,

    /// How long to keep the session bound, in milliseconds (overrides config).
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Simulated provider start-up time in milliseconds.
    #[arg(long, default_value_t = 50)]
    acquire_delay_ms: u64,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("Viewfinder v{}", viewfinder::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    if let Some(taps) = args.taps {
        config.output.taps = taps;
    }
    if let Some(duration_ms) = args.duration_ms {
        config.output.duration_ms = duration_ms;
    }

    let resolution = config.preview.resolution();
    let provider = MockCameraProvider::with_config(MockConfig {
        resolution: Some(resolution),
        acquire_delay: Duration::from_millis(args.acquire_delay_ms),
        ..Default::default()
    });
    let controller = Arc::new(CameraSessionController::with_config(
        Arc::new(provider.clone()),
        &config.focus,
    ));

    // Simulated view is twice the buffer size.
    let view = (resolution.width as f32 * 2.0, resolution.height as f32 * 2.0);
    let screen = Arc::new(
        ViewfinderScreen::new(
            Arc::clone(&controller),
            FocusIndicator::from_config(&config.focus),
        )
        .with_transformer(ScaleTransformer::new(view, resolution)),
    );

    let scope = LifecycleScope::new();
    let interrupt = scope.clone();
    if let Err(e) = ctrlc::set_handler(move || interrupt.end()) {
        warn!("Failed to install Ctrl-C handler: {}", e);
    }

    let mut frames = controller.current_frame();
    tokio::spawn(async move {
        while frames.changed().await.is_ok() {
            if let Some(request) = frames.borrow_and_update().as_ref() {
                info!(
                    resolution = %request.resolution(),
                    sequence = request.sequence(),
                    "Rendering surface attached"
                );
            }
        }
    });

    let runner = Arc::clone(&screen);
    let run_scope = scope.clone();
    let access_granted = !args.deny_access;
    let session = tokio::spawn(async move {
        runner
            .run(access_granted, &run_scope, &HostContext::new("viewfinder-cli"))
            .await
    });

    let timer_scope = scope.clone();
    let duration = Duration::from_millis(config.output.duration_ms);
    tokio::spawn(async move {
        tokio::time::sleep(duration).await;
        timer_scope.end();
    });

    if access_granted {
        let mut state = controller.subscribe_state();
        let bound = tokio::select! {
            result = state.wait_for(|s| *s == SessionState::Bound) => result.is_ok(),
            _ = scope.ended() => false,
        };
        if bound {
            let output = &config.output;
            simulate_taps(&screen, view, output.taps, output.tap_interval_ms, &scope).await;
        }
    }

    match session.await {
        Ok(Ok(())) => info!("Session ended"),
        Ok(Err(e)) => warn!("Session failed: {}", e),
        Err(e) => warn!("Session task failed: {}", e),
    }

    if config.output.print_metrics {
        print_metrics(&screen);
    }
    info!(
        "Done. Binds: {}, unbinds: {}",
        provider.binds(),
        provider.unbinds()
    );
}

async fn simulate_taps(
    screen: &ViewfinderScreen,
    view: (f32, f32),
    taps: u32,
    interval_ms: u64,
    scope: &LifecycleScope,
) {
    for i in 0..taps {
        if scope.is_ended() {
            break;
        }
        let tap = tap_position(view, i, taps);
        if let Some(id) = screen.on_tap(tap) {
            info!(?id, x = tap.x, y = tap.y, "Tap");
        }
        tokio::time::sleep(Duration::from_millis(interval_ms)).await;
    }
}

/// Spreads `taps` evenly along the view diagonal, excluding both corners.
fn tap_position(view: (f32, f32), i: u32, taps: u32) -> Point {
    let step = (i as f32 + 1.0) / (taps as f32 + 1.0);
    Point::new(view.0 * step, view.1 * step)
}

fn print_metrics(screen: &ViewfinderScreen) {
    let registry = match MetricsRegistry::new() {
        Ok(registry) => registry,
        Err(e) => {
            warn!("Failed to create metrics registry: {}", e);
            return;
        }
    };
    registry.update(&MetricsSnapshot {
        session: screen.controller().stats(),
        indicator_visible: screen.indicator().is_visible(),
    });
    match registry.encode() {
        Ok(output) => print!("{}", output),
        Err(e) => warn!("Failed to encode metrics: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_positions_inside_view() {
        let view = (300.0, 200.0);
        assert_eq!(tap_position(view, 0, 2), Point::new(100.0, 200.0 / 3.0));
        assert_eq!(tap_position(view, 1, 2), Point::new(200.0, 400.0 / 3.0));
    }

    #[test]
    fn test_tap_position_max_taps() {
        let tap = tap_position((640.0, 480.0), u32::MAX - 1, u32::MAX);
        assert!(tap.x > 0.0 && tap.x <= 640.0);
        assert!(tap.y > 0.0 && tap.y <= 480.0);
    }
}
