use blaster_core::utils::controllers::{try_submit, BlasterController, MotorDriver, MotorRequest};
use blaster_core::utils::io::SimPort;
use blaster_core::utils::BlasterConfig;
use clap::Parser;
use core::cell::RefCell;
use embassy_executor::Executor;
use static_cell::StaticCell;
use std::io::BufRead;
use tracing::{error, info, warn};

type SimBoard = &'static RefCell<SimPort>;

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts
{
    /// JSON file with pin assignments and speeds
    #[clap(long)]
    config: Option<std::path::PathBuf>,
    /// override the accelerator motor speed (0-255)
    #[clap(long)]
    accel_speed: Option<u8>,
    /// override the pusher motor speed (0-255)
    #[clap(long)]
    push_speed: Option<u8>,
}

#[embassy_executor::task]
async fn motor_task(mut ctrl: BlasterController<SimBoard, SimBoard>) -> ! {
    if let Err(e) = ctrl.initialize() {
        error!("motor init failed: {:?}", e);
    }
    ctrl.run().await
}

fn load_config(opts: &Opts) -> Result<BlasterConfig, String> {
    let mut config = match &opts.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path.display(), e))?;
            serde_json::from_str(&text).map_err(|e| format!("{}: {}", path.display(), e))?
        }
        None => BlasterConfig::default(),
    };
    if let Some(s) = opts.accel_speed {
        config.accel.speed = s.into();
    }
    if let Some(s) = opts.push_speed {
        config.pusher.speed = s.into();
    }
    Ok(config)
}

/// Feed JSON lines from stdin into the motor channel, the way switch
/// interrupts would on hardware.
fn spawn_stdin_reader() {
    std::thread::spawn(|| {
        for line in std::io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    error!("stdin closed: {:?}", e);
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<MotorRequest>(&line) {
                Ok(request) => {
                    try_submit(request);
                }
                Err(error) => warn!(?error, "invalid motor request"),
            }
        }
    });
}

static BOARD: StaticCell<RefCell<SimPort>> = StaticCell::new();
static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load config: {}", e);
            std::process::exit(1);
        }
    };
    if !config.pins_disjoint() {
        warn!("pusher and accelerator share lines: {:?}", config);
    }
    info!(?config, "starting simulated blaster");

    let board: SimBoard = BOARD.init(RefCell::new(SimPort::new()));
    let ctrl = BlasterController::new(
        MotorDriver::from_config(board, config.pusher),
        MotorDriver::from_config(board, config.accel),
    );

    spawn_stdin_reader();
    info!(r#"send requests as JSON lines, e.g. {{"m":"accel","c":{{"mc":"drive"}}}}"#);

    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(motor_task(ctrl)).unwrap();
    });
}
