//! Headless voxfire client.
//!
//! Generates the shared world from the configured seed, joins the relay, and
//! plays with scripted input at a fixed 60 Hz tick. Useful for filling a
//! server with opponents and for soak-testing the relay.
//!
//! Run with: `cargo run -p voxfire-game -- --duration 30`

mod bot;

use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::Instant;
use tracing::{info, warn};
use voxfire_config::CliArgs;
use voxfire_multiplayer::{ClientEvent, ClientSession, HeadlessScene};
use voxfire_net::{ClientMessage, FrameConfig, FrameError, GameClient, ServerMessage};
use voxfire_voxel::VoxelWorld;

const TICK_RATE: f64 = 60.0;

/// CLI arguments for the headless client.
#[derive(Parser, Debug)]
#[command(name = "voxfire-game", about = "Headless voxfire client")]
struct GameArgs {
    #[command(flatten)]
    cli: CliArgs,

    /// Stop after this many seconds (runs until Ctrl-C otherwise).
    #[arg(long)]
    duration: Option<f64>,

    /// Seed for the scripted input.
    #[arg(long, default_value_t = 1)]
    bot_seed: u64,

    /// Seconds between shots.
    #[arg(long, default_value_t = 1.5)]
    fire_interval: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = GameArgs::parse();
    let (config, config_dir) = args.cli.load_config()?;

    voxfire_log::init_logging(
        Some(&config_dir.join("logs")),
        cfg!(debug_assertions),
        Some(&config),
    );

    let endpoint = config.server_endpoint();
    let addr: SocketAddr = tokio::net::lookup_host(&endpoint)
        .await?
        .next()
        .ok_or_else(|| format!("{endpoint} did not resolve"))?;

    let world = VoxelWorld::generate(&config.world);
    info!(
        "World {}x{}x{} seed={} ({} solid blocks)",
        config.world.width,
        config.world.height,
        config.world.width,
        config.world.seed,
        world.solid_count()
    );

    let frame = FrameConfig::new(config.network.max_frame_bytes);
    let mut session = ClientSession::new(&config, world, HeadlessScene::new());
    let (mut client, mut incoming) = GameClient::connect(addr, frame).await?;
    let mut bot = bot::Bot::new(args.bot_seed, args.fire_interval);

    let mut interval = tokio::time::interval(Duration::from_secs_f64(1.0 / TICK_RATE));
    let deadline = args
        .duration
        .map(|secs| Instant::now() + Duration::from_secs_f64(secs));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut last = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                info!("Ctrl-C received");
                break;
            }
        }

        if !drain_incoming(&mut incoming, &mut session) {
            warn!("Relay connection lost");
            break;
        }
        for (id, result) in session.scene_mut().take_pending_loads() {
            session.complete_avatar_load(id, result);
        }

        let now = Instant::now();
        let dt = (now - last).as_secs_f32();
        last = now;

        session.tick(dt, &bot.next_input(dt));
        if !send_all(session.drain_outgoing(), |message| client.send(message)) {
            break;
        }

        for event in session.drain_events() {
            match event {
                ClientEvent::Fired => tracing::debug!("Fired"),
                ClientEvent::Damaged { shooter, lives_left } => {
                    info!("Hit by {shooter}, {lives_left} lives left");
                }
                ClientEvent::Eliminated { shooter } => info!("Eliminated by {shooter}"),
                ClientEvent::SessionReset => {
                    client.disconnect();
                    (client, incoming) = GameClient::connect(addr, frame).await?;
                    info!("Reconnected after reset");
                }
            }
        }

        if deadline.is_some_and(|d| now >= d) {
            info!("Duration elapsed");
            break;
        }
    }

    client.disconnect();
    Ok(())
}

/// Apply every message that has arrived. Returns `false` once the relay
/// connection is gone.
fn drain_incoming(
    incoming: &mut UnboundedReceiver<ServerMessage>,
    session: &mut ClientSession<VoxelWorld, HeadlessScene>,
) -> bool {
    loop {
        match incoming.try_recv() {
            Ok(message) => session.handle_message(message),
            Err(TryRecvError::Empty) => return true,
            Err(TryRecvError::Disconnected) => return false,
        }
    }
}

/// Hand each queued message to `send`, stopping at the first failure.
/// Returns `false` when the writer side of the connection is gone.
fn send_all(
    messages: Vec<ClientMessage>,
    mut send: impl FnMut(ClientMessage) -> Result<(), FrameError>,
) -> bool {
    for message in messages {
        if let Err(e) = send(message) {
            warn!("Relay send failed: {e}");
            return false;
        }
    }
    true
}
