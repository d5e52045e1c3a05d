//! Module Exports
//!
//! This file exports the actuation and arbitration modules and hosts the
//! control loop that ties sensors, motors and the command channel together.
//!
//! - `motors`: four-wire H-bridge driver and the `MotorDirection` state.
//! - `safety`: per-tick obstacle arbitration.

/// Module for driving the H-bridge inputs.
pub mod motors;
pub mod safety;

use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, channel::Channel};
use embassy_time::{Duration, Instant, Ticker};

pub use motors::{Actuator, MotorDirection, MotorDriver};
pub use safety::{SafetyArbiter, Verdict};

use crate::utils::{
    config::RobotConfig,
    connection::protocol::{Command, Reply},
    sensors::{
        pulse::{PulseCounter, SpeedEstimator},
        ultrasonic::{Distance, RangeFinder},
    },
};

/// Commands framed by the network task, consumed by the control loop.
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Command, 4> = Channel::new();

/// One entry per dispatched command; `None` means the command has no reply line.
pub static REPLY_CHANNEL: Channel<CriticalSectionRawMutex, Option<Reply>, 4> = Channel::new();

/// What happened during one control-loop tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    /// New speed estimate if a sample was due.
    pub speed: Option<f32>,
    pub distance: Distance,
    /// The arbiter stopped the motors this tick.
    pub forced_stop: bool,
}

/// The rover's cooperative control loop.
///
/// Owns every piece of main-loop state; only the pulse counter is shared with
/// interrupt context.
pub struct SystemController<'a, A, R> {
    motors: A,
    ranger: R,
    counter: &'a PulseCounter,
    speed: SpeedEstimator,
    arbiter: SafetyArbiter,
    tick_interval: Duration,
}

impl<'a, A, R> SystemController<'a, A, R>
where
    A: Actuator,
    R: RangeFinder,
{
    pub fn new(
        motors: A,
        ranger: R,
        counter: &'a PulseCounter,
        config: &RobotConfig,
    ) -> Self {
        SystemController {
            motors,
            ranger,
            counter,
            speed: SpeedEstimator::new(config.wheel, config.sample_interval_ms),
            arbiter: SafetyArbiter::new(config.stop_distance_cm),
            tick_interval: Duration::from_millis(config.tick_interval_ms),
        }
    }

    pub fn direction(&self) -> MotorDirection {
        self.motors.direction()
    }

    pub fn speed(&self) -> f32 {
        self.speed.speed()
    }

    /// Sample speed if due, range, and stop if an obstacle is in the way of
    /// forward motion.
    pub fn tick(
        &mut self,
        now_ms: u64,
    ) -> TickReport {
        let speed = self.speed.sample_if_due(now_ms, self.counter);
        let distance = self.ranger.measure();

        let forced_stop = match self.arbiter.evaluate(distance, self.motors.direction()) {
            Verdict::ForceStop => {
                tracing::warn!(distance = distance.cm(), "obstacle ahead while driving, stopping");
                self.halt();
                true
            }
            Verdict::Clear => false,
        };

        TickReport {
            speed,
            distance,
            forced_stop,
        }
    }

    /// Execute one command and produce its reply line, if it has one.
    pub fn dispatch(
        &mut self,
        command: Command,
    ) -> Option<Reply> {
        tracing::info!(?command, "command received");
        match command {
            Command::Forward => {
                let distance = self.ranger.measure();
                tracing::info!(distance = distance.cm(), "measured distance");
                if self.arbiter.is_blocked(distance) {
                    tracing::warn!("obstacle detected, refusing to move forward");
                    self.halt();
                } else {
                    self.drive(MotorDirection::Forward);
                }
                None
            }
            Command::Backward => {
                self.drive(MotorDirection::Backward);
                None
            }
            Command::Left => {
                self.drive(MotorDirection::Left);
                None
            }
            Command::Right => {
                self.drive(MotorDirection::Right);
                None
            }
            Command::Stop => {
                self.halt();
                None
            }
            Command::GetSpeed => {
                let speed = self.speed.speed();
                tracing::info!(speed, "speed requested");
                Some(Reply::Speed(speed))
            }
            Command::GetDistance => {
                let distance = self.ranger.measure();
                tracing::info!(distance = distance.cm(), "distance requested");
                Some(Reply::Distance(distance))
            }
            Command::Unrecognized => {
                tracing::warn!("unknown command");
                Some(Reply::UnknownCommand)
            }
        }
    }

    /// Parse and dispatch one raw line.
    pub fn handle_line(
        &mut self,
        line: &str,
    ) -> Option<Reply> {
        self.dispatch(Command::parse(line))
    }

    /// One loop iteration: tick, then service at most one pending command.
    pub async fn step(
        &mut self,
        now_ms: u64,
    ) -> TickReport {
        let report = self.tick(now_ms);

        if let Ok(command) = COMMAND_CHANNEL.try_receive() {
            let reply = self.dispatch(command);
            REPLY_CHANNEL.send(reply).await;
        }
        report
    }

    /// Run the loop forever, one `step` per tick interval.
    pub async fn run(&mut self) -> ! {
        let mut ticker = Ticker::every(self.tick_interval);
        loop {
            self.step(Instant::now().as_millis()).await;
            ticker.next().await;
        }
    }

    fn drive(
        &mut self,
        direction: MotorDirection,
    ) {
        tracing::info!(?direction, "driving");
        if let Err(error) = self.motors.apply(direction) {
            tracing::error!(%error, ?direction, "actuation failed, stopping");
            self.halt();
        }
    }

    fn halt(&mut self) {
        if let Err(error) = self.motors.stop() {
            tracing::error!(%error, "failed to stop motors");
        }
    }
}
