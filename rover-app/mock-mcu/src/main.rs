use std::{
    convert::Infallible,
    path::PathBuf,
    sync::atomic::{AtomicBool, AtomicU32, Ordering},
};

use clap::Parser;
use embassy_executor::{Executor, Spawner};
use embassy_net::{Config, Ipv4Address, Ipv4Cidr, Runner, Stack, StackResources};
use embassy_net_tuntap::TunTapDevice;
use embassy_time::{Delay, Duration, Timer};
use embedded_hal::digital::{ErrorType, OutputPin};
use heapless::Vec;
use rand_core::{OsRng, TryRngCore};
use rover_core::{
    mk_static,
    utils::{
        command_server,
        controllers::{MotorDirection, MotorDriver},
        error::DeviceError,
        sensors::ultrasonic::{EchoTimer, RangeSensor},
        RobotConfig, SystemController, PULSE_COUNTER,
    },
};
use static_cell::StaticCell;
use tracing::{debug, error, info};

#[derive(Parser)]
#[clap(version = "1.0")]
struct Opts {
    /// TAP device name
    #[clap(long, default_value = "tap0")]
    tap: String,
    /// use a static IP instead of DHCP
    #[clap(long)]
    static_ip: bool,
    /// JSON file overriding the default tunables
    #[clap(long)]
    config: Option<PathBuf>,
    /// listening port, overrides the config file
    #[clap(long)]
    port: Option<u16>,
    /// initial distance of the simulated obstacle ahead (cm)
    #[clap(long, default_value_t = 100.0)]
    obstacle_cm: f32,
}

/// Simulated H-bridge input levels, IN1..IN4.
static BRIDGE: [AtomicBool; 4] = [
    AtomicBool::new(false),
    AtomicBool::new(false),
    AtomicBool::new(false),
    AtomicBool::new(false),
];
static TRIGGER: AtomicBool = AtomicBool::new(false);
/// Distance to the simulated obstacle in hundredths of a cm.
static OBSTACLE_CCM: AtomicU32 = AtomicU32::new(10_000);

/// Output line backed by one of the simulated level registers.
struct SimPin {
    name: &'static str,
    level: &'static AtomicBool,
}

impl ErrorType for SimPin {
    type Error = Infallible;
}

impl OutputPin for SimPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.level.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        if !self.level.swap(true, Ordering::Relaxed) {
            debug!("{} high", self.name);
        }
        Ok(())
    }
}

/// Echo that answers with the round trip to the simulated obstacle.
struct SimEcho;

impl EchoTimer for SimEcho {
    fn pulse_width_us(
        &mut self,
        timeout_us: u32,
    ) -> Result<u32, DeviceError> {
        let cm = OBSTACLE_CCM.load(Ordering::Relaxed) as f32 / 100.0;
        let round_trip_us = (cm * 2.0 / 0.034) as u32;
        Ok(if round_trip_us > timeout_us { 0 } else { round_trip_us })
    }
}

type Controller = SystemController<
    'static,
    MotorDriver<SimPin, Delay>,
    RangeSensor<SimPin, SimEcho, Delay>,
>;

fn bridge_direction() -> MotorDirection {
    let levels = [0, 1, 2, 3].map(|i| BRIDGE[i].load(Ordering::Relaxed));
    [
        MotorDirection::Forward,
        MotorDirection::Backward,
        MotorDirection::Left,
        MotorDirection::Right,
    ]
    .into_iter()
    .find(|d| d.pattern() == levels)
    .unwrap_or(MotorDirection::Stopped)
}

#[embassy_executor::task]
async fn net_task(mut runner: Runner<'static, TunTapDevice>) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn control_task(mut ctrl: Controller) -> ! {
    ctrl.run().await
}

#[embassy_executor::task]
async fn server_task(
    stack: Stack<'static>,
    port: u16,
) -> ! {
    command_server(stack, port).await
}

/// Stands in for the wheel encoder interrupt: raises edges while the bridge
/// drives the wheels, and moves the obstacle closer while going forward.
#[embassy_executor::task]
async fn encoder_task(config: RobotConfig) -> ! {
    const EDGE_PERIOD: Duration = Duration::from_millis(25);
    let cm_per_edge = config.wheel.circumference() / config.wheel.pulses_per_revolution.max(1) as f32;
    let ccm_per_edge = (cm_per_edge * 100.0) as u32;

    loop {
        match bridge_direction() {
            MotorDirection::Stopped => {}
            MotorDirection::Forward => {
                PULSE_COUNTER.on_edge();
                let _ = OBSTACLE_CCM.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |d| {
                    Some(d.saturating_sub(ccm_per_edge))
                });
            }
            _ => PULSE_COUNTER.on_edge(),
        }
        Timer::after(EDGE_PERIOD).await;
    }
}

async fn wait_for_network(stack: &Stack<'static>) {
    info!("Waiting for network link...");
    loop {
        if stack.is_link_up() {
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }

    info!("Waiting to get IP address...");
    loop {
        if let Some(config) = stack.config_v4() {
            info!("Got IP: {}", config.address);
            break;
        }
        Timer::after(Duration::from_millis(500)).await;
    }
}

#[embassy_executor::task]
async fn main_task(
    spawner: Spawner,
    opts: Opts,
    config: RobotConfig,
) {
    OBSTACLE_CCM.store((opts.obstacle_cm.max(0.0) * 100.0) as u32, Ordering::Relaxed);

    let [in1, in2, in3, in4] = &BRIDGE;
    let motors = MotorDriver::new(
        [
            SimPin { name: "IN1", level: in1 },
            SimPin { name: "IN2", level: in2 },
            SimPin { name: "IN3", level: in3 },
            SimPin { name: "IN4", level: in4 },
        ],
        Delay,
        config.turn_dwell_ms,
    );
    let ranger = RangeSensor::new(
        SimPin {
            name: "TRIG",
            level: &TRIGGER,
        },
        SimEcho,
        Delay,
        config.echo_timeout_us,
    );
    let ctrl = SystemController::new(motors, ranger, &PULSE_COUNTER, &config);

    let device = match TunTapDevice::new(&opts.tap) {
        Ok(device) => device,
        Err(e) => {
            error!("Failed to open TAP device {}: {}", opts.tap, e);
            std::process::exit(1);
        }
    };
    let net_config = if opts.static_ip {
        Config::ipv4_static(embassy_net::StaticConfigV4 {
            address: Ipv4Cidr::new(Ipv4Address::new(192, 168, 69, 2), 24),
            dns_servers: Vec::new(),
            gateway: Some(Ipv4Address::new(192, 168, 69, 1)),
        })
    } else {
        Config::dhcpv4(Default::default())
    };
    let mut seed_buf = [0; 8];
    if let Err(e) = OsRng.try_fill_bytes(&mut seed_buf) {
        error!("OS RNG unavailable, using a fixed seed: {}", e);
    }
    let seed = u64::from_le_bytes(seed_buf);

    let (stack, runner) = embassy_net::new(
        device,
        net_config,
        mk_static!(StackResources<3>, StackResources::<3>::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).unwrap();
    spawner.spawn(encoder_task(config)).unwrap();
    spawner.spawn(control_task(ctrl)).unwrap();

    wait_for_network(&stack).await;

    let port = opts.port.unwrap_or(config.port);
    info!("Starting command server on port {}", port);
    spawner.spawn(server_task(stack, port)).unwrap();
}

fn load_config(opts: &Opts) -> Result<RobotConfig, Box<dyn std::error::Error>> {
    match &opts.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)?;
            Ok(RobotConfig::from_json(&json)?)
        }
        None => Ok(RobotConfig::default()),
    }
}

static EXECUTOR: StaticCell<Executor> = StaticCell::new();

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let opts: Opts = Opts::parse();
    let config = match load_config(&opts) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    info!(?config, "Configuration loaded");

    let executor = EXECUTOR.init(Executor::new());
    executor.run(|spawner| {
        spawner.spawn(main_task(spawner, opts, config)).unwrap();
    });
}
