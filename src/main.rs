use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use wand_config::{AppConfig, DetectorMode};
use wand_gesture::{
    BufferedDetector, GestureDetector, GestureError, GestureNotifier, GestureResult,
    TracingNotifier,
};
use wand_link::{WatchLink, WatchMessage};
use wand_relay::{reading_for, LogSink, Reading, RelayClient, TelemetrySink};

#[derive(Parser, Debug)]
#[command(name = "pebble-wand", about = "Arm-twist detection for watch accelerometer streams")]
struct Cli {
    /// Config file (default: <config dir>/pebble-wand/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Watch bridge address; overrides config. Reads stdin when neither is set.
    #[arg(long)]
    connect: Option<String>,

    /// Telemetry relay address; overrides config.
    #[arg(long)]
    relay: Option<String>,

    /// Expect one sample per message and evaluate 20-sample windows.
    #[arg(long)]
    buffered: bool,

    /// Do not relay telemetry readings.
    #[arg(long)]
    no_telemetry: bool,
}

/// The active detector variant.
enum Detector {
    Stateless(GestureDetector),
    Buffered(BufferedDetector),
}

impl Detector {
    fn from_config(config: &AppConfig) -> Result<Self, GestureError> {
        Ok(match config.detector.mode {
            DetectorMode::Stateless => {
                Self::Stateless(GestureDetector::new(config.detector.window_samples)?)
            }
            DetectorMode::Buffered => {
                Self::Buffered(BufferedDetector::new(config.detector.buffered_samples)?)
            }
        })
    }
}

/// Per-message pipeline: payload → telemetry or detector → notifier.
struct App<N, S> {
    config: AppConfig,
    detector: Detector,
    notifier: N,
    sink: S,
    message_count: u64,
    rejected_count: u64,
}

impl<N: GestureNotifier, S: TelemetrySink> App<N, S> {
    fn new(config: AppConfig, notifier: N, sink: S) -> Result<Self, GestureError> {
        let detector = Detector::from_config(&config)?;
        Ok(Self {
            config,
            detector,
            notifier,
            sink,
            message_count: 0,
            rejected_count: 0,
        })
    }

    fn handle(&mut self, message: &WatchMessage) {
        self.message_count += 1;
        if self.message_count % 100 == 0 {
            debug!(
                messages = self.message_count,
                rejected = self.rejected_count,
                "Message heartbeat"
            );
        }

        let Some(payload) = message.payload() else {
            debug!(transaction_id = message.transaction_id, "Message has no payload");
            return;
        };
        info!(transaction_id = message.transaction_id, %payload, "Payload received");

        if let Some(value) = reading_for(payload) {
            self.relay(value);
            return;
        }

        match settle(self.evaluate(payload)) {
            Ok(Some(result)) => self.notifier.notify(result),
            Ok(None) => {}
            Err(e) => {
                self.rejected_count += 1;
                warn!(%e, transaction_id = message.transaction_id, "Window rejected");
            }
        }
    }

    fn evaluate(&mut self, payload: &str) -> Result<Option<GestureResult>, GestureError> {
        match &mut self.detector {
            Detector::Stateless(detector) => detector.evaluate(payload).map(Some),
            Detector::Buffered(detector) => detector.push(payload),
        }
    }

    fn relay(&self, value: i64) {
        let telemetry = &self.config.telemetry;
        if !telemetry.enabled {
            debug!(value, "Telemetry disabled, reading dropped");
            return;
        }
        let reading = Reading::new(&telemetry.feed_id, &telemetry.stream, value);
        if let Err(e) = self.sink.publish(reading) {
            warn!(%e, "Failed to relay reading");
        }
    }
}

/// A window too short to hold a transition is reported and counts as no
/// gesture; any other error rejects the window.
fn settle(
    outcome: Result<Option<GestureResult>, GestureError>,
) -> Result<Option<GestureResult>, GestureError> {
    match outcome {
        Err(e @ GestureError::WindowTooShort { .. }) => {
            warn!(%e, "Window too short");
            Ok(Some(GestureResult::NoGesture))
        }
        other => other,
    }
}

async fn connect_sink(config: &AppConfig) -> Box<dyn TelemetrySink> {
    match &config.telemetry.relay_addr {
        Some(addr) => match RelayClient::connect(addr).await {
            Ok(client) => Box::new(client),
            Err(e) => {
                warn!(?e, "Telemetry relay not available, logging readings instead");
                Box::new(LogSink)
            }
        },
        None => Box::new(LogSink),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pebble_wand=info,wand_gesture=info,wand_link=info,wand_relay=info".into()
            }),
        )
        .init();

    info!("Pebble Wand v{} starting", env!("CARGO_PKG_VERSION"));

    // Load config.
    let loaded = match &cli.config {
        Some(path) => wand_config::load_config_from(path),
        None => wand_config::load_config(),
    };
    let mut config = loaded.unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    if let Some(addr) = cli.connect {
        config.link.bridge_addr = Some(addr);
    }
    if let Some(addr) = cli.relay {
        config.telemetry.relay_addr = Some(addr);
    }
    if cli.buffered {
        config.detector.mode = DetectorMode::Buffered;
    }
    if cli.no_telemetry {
        config.telemetry.enabled = false;
    }

    info!(
        mode = ?config.detector.mode,
        app = wand_gesture::schema::WATCH_APP_UUID,
        "Config loaded"
    );

    let mut link = match &config.link.bridge_addr {
        Some(addr) => WatchLink::connect(addr).await?,
        None => WatchLink::stdin(),
    };
    let sink = connect_sink(&config).await;

    let mut app = App::new(config, TracingNotifier::new(), sink)?;
    while let Some(message) = link.recv().await {
        app.handle(&message);
    }

    info!(
        messages = app.message_count,
        rejected = app.rejected_count,
        twists = app.notifier.twists(),
        "Watch link closed, shutting down"
    );
    Ok(())
}
