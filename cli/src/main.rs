mod sse;
mod watch;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use frames::motion::{self, Track};
use frames::{LatLng, MapCommand, MarkerId, RpcRequest, RpcResponse};
use rand::Rng;
use rand::seq::IndexedMutRandom;
use serde_json::{Value, json};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("websocket failed: {0}")]
    WsConnect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("frame decode failed: {0}")]
    Decode(#[from] frames::CodecError),
    #[error("server returned HTTP {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "dmap-cli", about = "Dynamic map server CLI")]
struct Cli {
    #[arg(long, env = "DMAP_BASE_URL", default_value = "http://127.0.0.1:3000")]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug)]
struct CliContext {
    base_url: String,
    next_id: AtomicU64,
}

impl CliContext {
    fn new(base_url: String) -> Self {
        Self { base_url: base_url.trim_end_matches('/').to_owned(), next_id: AtomicU64::new(1) }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the server health endpoint.
    Ping,
    Markers(MarkersCommand),
    View(ViewCommand),
    /// Seed random markers and keep moving them.
    Mock(MockArgs),
    /// Run a headless map session and print its activity log.
    Watch(WatchCommand),
    /// Tail the interaction event stream.
    Events,
}

#[derive(Args, Debug)]
struct MarkersCommand {
    #[command(subcommand)]
    command: MarkersSubcommand,
}

#[derive(Subcommand, Debug)]
enum MarkersSubcommand {
    Add {
        id: String,
        name: String,
        #[arg(value_parser = parse_lat_lng, allow_hyphen_values = true)]
        lat_lng: LatLng,
    },
    Update {
        id: String,
        #[arg(value_parser = parse_lat_lng, allow_hyphen_values = true)]
        lat_lng: LatLng,
        #[arg(long)]
        name: Option<String>,
    },
    Delete {
        id: String,
    },
    List,
}

#[derive(Args, Debug)]
struct ViewCommand {
    #[command(subcommand)]
    command: ViewSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
enum ViewSubcommand {
    SetView {
        #[arg(value_parser = parse_lat_lng, allow_hyphen_values = true)]
        lat_lng: LatLng,
        zoom: f64,
    },
    FlyTo {
        #[arg(value_parser = parse_lat_lng, allow_hyphen_values = true)]
        lat_lng: LatLng,
        zoom: f64,
    },
    FitBounds {
        #[arg(value_parser = parse_lat_lng, allow_hyphen_values = true)]
        corner1: LatLng,
        #[arg(value_parser = parse_lat_lng, allow_hyphen_values = true)]
        corner2: LatLng,
    },
    FlyToBounds {
        #[arg(value_parser = parse_lat_lng, allow_hyphen_values = true)]
        corner1: LatLng,
        #[arg(value_parser = parse_lat_lng, allow_hyphen_values = true)]
        corner2: LatLng,
    },
    SetZoom {
        zoom: f64,
    },
    Reset,
    Highlight {
        id: String,
    },
}

#[derive(Args, Debug)]
struct MockArgs {
    #[arg(long, default_value_t = 5)]
    count: usize,

    #[arg(long, default_value_t = 1200, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    #[arg(long, help = "Stop after this many moves")]
    moves: Option<usize>,
}

#[derive(Args, Debug)]
struct WatchCommand {
    #[arg(long, default_value_t = 300, help = "Delay before the map becomes ready")]
    ready_after_ms: u64,

    #[arg(long, help = "Stop after this many seconds")]
    duration_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let ctx = CliContext::new(cli.base_url);

    match cli.command {
        Command::Ping => run_ping(&ctx).await,
        Command::Markers(markers) => run_markers(&ctx, markers).await,
        Command::View(view) => run_view(&ctx, view).await,
        Command::Mock(args) => run_mock(&ctx, args).await,
        Command::Watch(args) => {
            let args = watch::WatchArgs { ready_after_ms: args.ready_after_ms, duration_secs: args.duration_secs };
            watch::run(&ctx.base_url, args).await
        }
        Command::Events => run_events(&ctx).await,
    }
}

// =============================================================================
// COMMANDS
// =============================================================================

async fn run_ping(ctx: &CliContext) -> Result<(), CliError> {
    let response = reqwest::Client::new().get(ctx.url("/healthz")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "health check failed".to_owned() });
    }
    println!("ok");
    Ok(())
}

async fn run_markers(ctx: &CliContext, markers: MarkersCommand) -> Result<(), CliError> {
    let (method, params) = match markers.command {
        MarkersSubcommand::Add { id, name, lat_lng } => {
            ("markers.add", json!({ "id": id, "name": name, "latLng": lat_lng }))
        }
        MarkersSubcommand::Update { id, lat_lng, name } => {
            let mut params = json!({ "id": id, "latLng": lat_lng });
            if let Some(name) = name {
                params["name"] = Value::String(name);
            }
            ("markers.update", params)
        }
        MarkersSubcommand::Delete { id } => ("markers.delete", json!({ "id": id })),
        MarkersSubcommand::List => ("markers.list", Value::Null),
    };
    let result = rpc_call(ctx, method, params).await?;
    print_json(&result)
}

async fn run_view(ctx: &CliContext, view: ViewCommand) -> Result<(), CliError> {
    let command = view_command(view.command);
    let (method, params) = command_request(&command)?;
    let result = rpc_call(ctx, &method, params).await?;
    print_json(&result)
}

fn view_command(view: ViewSubcommand) -> MapCommand {
    match view {
        ViewSubcommand::SetView { lat_lng, zoom } => MapCommand::SetView { lat_lng, zoom },
        ViewSubcommand::FlyTo { lat_lng, zoom } => MapCommand::FlyTo { lat_lng, zoom },
        ViewSubcommand::FitBounds { corner1, corner2 } => MapCommand::FitBounds { corner1, corner2 },
        ViewSubcommand::FlyToBounds { corner1, corner2 } => MapCommand::FlyToBounds { corner1, corner2 },
        ViewSubcommand::SetZoom { zoom } => MapCommand::SetZoom { zoom },
        ViewSubcommand::Reset => MapCommand::ResetView,
        ViewSubcommand::Highlight { id } => MapCommand::HighlightMarker { id: MarkerId::from(id) },
    }
}

/// JSON-RPC method and params for a view command: `map.<name>` with the
/// command's own fields.
fn command_request(command: &MapCommand) -> Result<(String, Value), CliError> {
    let mut params = serde_json::to_value(command)?;
    if let Some(fields) = params.as_object_mut() {
        fields.remove("command");
    }
    Ok((format!("map.{}", command.name()), params))
}

// ── Mock driver ─────────────────────────────────────────────────

/// A marker the mock driver seeded and keeps moving.
#[derive(Debug, Clone)]
struct MockUnit {
    id: String,
    name: String,
    track: Track,
}

async fn run_mock(ctx: &CliContext, args: MockArgs) -> Result<(), CliError> {
    let mut rng = rand::rng();
    let mut units = seed_units(args.count, &mut rng);

    for unit in &units {
        let lat_lng = unit.track.lat_lng;
        rpc_call(ctx, "markers.add", json!({ "id": unit.id, "name": unit.name, "latLng": lat_lng })).await?;
        eprintln!("  added {} at ({}, {})", unit.name, lat_lng.lat, lat_lng.lng);
    }
    eprintln!("seeded {} markers; moving one every {} ms", units.len(), args.tick_ms);

    let mut ticker = tokio::time::interval(Duration::from_millis(args.tick_ms.max(1)));
    ticker.tick().await;
    let mut moved = 0_usize;
    while args.moves.is_none_or(|limit| moved < limit) {
        ticker.tick().await;
        let Some(unit) = step_random(&mut units, &mut rng) else {
            break;
        };
        let lat_lng = unit.track.lat_lng;
        rpc_call(ctx, "markers.update", json!({ "id": unit.id, "name": unit.name, "latLng": lat_lng })).await?;
        eprintln!("  moved {} → ({}, {})", unit.name, lat_lng.lat, lat_lng.lng);
        moved = moved.saturating_add(1);
    }
    Ok(())
}

fn seed_units(count: usize, rng: &mut impl Rng) -> Vec<MockUnit> {
    (0..count)
        .map(|index| {
            let mut id = Uuid::new_v4().simple().to_string();
            id.truncate(8);
            MockUnit { id, name: motion::unit_name(index), track: Track::random(rng) }
        })
        .collect()
}

/// Advance one randomly chosen unit along its track.
fn step_random<'a>(units: &'a mut [MockUnit], rng: &mut impl Rng) -> Option<&'a MockUnit> {
    let unit = units.choose_mut(rng)?;
    unit.track.advance(rng);
    Some(unit)
}

// ── Event tail ──────────────────────────────────────────────────

async fn run_events(ctx: &CliContext) -> Result<(), CliError> {
    let mut response = reqwest::Client::new().get(ctx.url("/api/events")).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CliError::ServerError { status: status.as_u16(), message: "event stream refused".to_owned() });
    }
    eprintln!("streaming events from {}", ctx.url("/api/events"));

    let mut buffer = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        for data in sse::drain_events(&mut buffer, &chunk) {
            match frames::decode_notification(&data) {
                Ok(notification) => println!("{}", serde_json::to_string(&notification.params)?),
                Err(e) => eprintln!("skipping event: {e}"),
            }
        }
    }
    Ok(())
}

// =============================================================================
// TRANSPORT
// =============================================================================

async fn rpc_call(ctx: &CliContext, method: &str, params: Value) -> Result<Value, CliError> {
    let id = ctx.next_id.fetch_add(1, Ordering::Relaxed);
    let request = RpcRequest::new(id, method, params);
    let response = reqwest::Client::new().post(ctx.url("/api/rpc")).json(&request).send().await?;
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(CliError::ServerError { status: status.as_u16(), message });
    }
    rpc_result(response.json::<RpcResponse>().await?)
}

fn rpc_result(response: RpcResponse) -> Result<Value, CliError> {
    if let Some(error) = response.error {
        return Err(CliError::Rpc { code: error.code, message: error.message });
    }
    Ok(response.result.unwrap_or(Value::Null))
}

fn ws_url(base_url: &str) -> Result<String, CliError> {
    let base_url = base_url.trim_end_matches('/');
    if let Some(rest) = base_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}/api/ws"));
    }
    if let Some(rest) = base_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}/api/ws"));
    }

    Err(CliError::InvalidBaseUrl(base_url.to_owned()))
}

/// Parse `"lat,lng"`.
fn parse_lat_lng(text: &str) -> Result<LatLng, String> {
    let (lat, lng) = text.split_once(',').ok_or_else(|| format!("expected LAT,LNG, got `{text}`"))?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("bad latitude `{lat}`: {e}"))?;
    let lng: f64 = lng.trim().parse().map_err(|e| format!("bad longitude `{lng}`: {e}"))?;
    Ok(LatLng::new(lat, lng))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
