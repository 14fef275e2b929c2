use std::net::SocketAddr;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use env_logger::Env;

use labyrinth::{ConnectionState, DEFAULT_PORT, InputButtons};
use labyrinth_client::debug::FrameStats;
use labyrinth_client::{ClientConfig, Input, LoggingSink, NetworkClient};

const STATS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Button {
    Forward,
    Back,
    Left,
    Right,
}

impl From<Button> for InputButtons {
    fn from(button: Button) -> Self {
        match button {
            Button::Forward => InputButtons::FORWARD,
            Button::Back => InputButtons::BACK,
            Button::Left => InputButtons::LEFT,
            Button::Right => InputButtons::RIGHT,
        }
    }
}

#[derive(Parser)]
#[command(name = "labyrinth")]
#[command(about = "Headless labyrinth client")]
struct Args {
    #[arg(short, long, help = "Server address to connect to (e.g., 127.0.0.1:27016)")]
    server: Option<String>,

    #[arg(long, default_value_t = 60, help = "Frames per second")]
    frame_rate: u32,

    #[arg(long, help = "Movement speed in units per second")]
    speed: Option<f32>,

    #[arg(long, value_delimiter = ',', help = "Buttons to hold, e.g. forward,right")]
    hold: Vec<Button>,

    #[arg(long, default_value_t = 0.0, help = "Constant turn rate in radians per second")]
    turn_rate: f32,

    #[arg(long, help = "Seconds of server silence before giving up")]
    timeout: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let server_addr: SocketAddr = match &args.server {
        Some(addr) => addr.parse()?,
        None => SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT)),
    };

    let mut config = ClientConfig {
        frame_rate: args.frame_rate.max(1),
        ..Default::default()
    };
    if let Some(speed) = args.speed {
        config.predictor.move_speed = speed;
    }
    if let Some(timeout) = args.timeout {
        config.connection_timeout_secs = timeout;
    }

    let mut input = Input::default();
    input.set_held(
        args.hold
            .iter()
            .fold(InputButtons::empty(), |held, b| held | InputButtons::from(*b)),
    );

    let mut client = NetworkClient::new(config)?;
    client.connect(server_addr)?;

    run(&mut client, &mut input, args.turn_rate)?;

    client.disconnect()?;
    Ok(())
}

fn run(client: &mut NetworkClient, input: &mut Input, turn_rate: f32) -> anyhow::Result<()> {
    let frame_duration = Duration::from_secs_f64(1.0 / client.config().frame_rate as f64);
    let mut sink = LoggingSink::new();
    let mut stats = FrameStats::new();
    let mut last_frame = Instant::now();
    let mut last_stats = Instant::now();

    loop {
        let frame_start = Instant::now();
        let dt = frame_start.duration_since(last_frame).as_secs_f32().min(0.1);
        last_frame = frame_start;

        input.accumulate_look(turn_rate * dt, 0.0);
        let frame_input = input.sample();

        client.update(&frame_input, dt, &mut sink)?;
        stats.update_snapshots(
            client.game().snapshots_applied(),
            client.game().snapshots_dropped(),
        );
        stats.record_frame(dt);

        if client.state() == ConnectionState::Disconnected {
            log::info!("Session ended");
            break;
        }

        if last_stats.elapsed() >= STATS_INTERVAL {
            let position = client.game().predictor().position();
            let net = client.stats();
            log::info!(
                "FPS {:.0} | snapshots {:.1}/s dropped {:.1}% | rtt {:.0}ms | pos ({:.2}, {:.2}) | entities {} | pickups {} | pkts {}/{} rejected {:.1}%",
                stats.fps(),
                stats.snapshot_rate(),
                stats.dropped_percent(),
                net.rtt_ms,
                position.x,
                position.z,
                sink.entity_count(),
                sink.pickup_count(),
                net.packets_sent,
                net.packets_received,
                net.rejected_percent()
            );
            last_stats = Instant::now();
        }

        let elapsed = frame_start.elapsed();
        if elapsed < frame_duration {
            std::thread::sleep(frame_duration - elapsed);
        }
    }

    Ok(())
}
