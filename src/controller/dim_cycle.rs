// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dim cycle controller.

use std::sync::Arc;
use std::time::Duration;

use super::{CycleState, Mode, UserAction};
use crate::clock::{Clock, SystemClock};
use crate::config::{ScheduleProfile, SleepLightConfig};
use crate::error::{Error, Result};
use crate::gateway::{ControlPoint, DeviceGateway, write_with_retry};
use crate::state::{SleepLightState, StateChange};
use crate::store::{
    AttributeStore, CycleAttributes, InMemoryAttributeStore, InMemoryStateStore, StateStore,
};
use crate::timer::Timer;
use crate::types::{Brightness, PowerState};

/// Format of the displayed power-off time.
const POWER_OFF_FORMAT: &str = "%d.%m.%Y, %H:%M:%S";

/// Control points every tick needs.
const TICK_POINTS: [ControlPoint; 2] = [ControlPoint::Power, ControlPoint::Brightness];

/// Drives one light through a sleep cycle.
///
/// The controller is not internally synchronized against itself: calls must
/// be serialized by the owner, which is what
/// [`SleepLightService`](crate::service::SleepLightService) does.
///
/// None of the cycle operations return errors. Device writes are retried once
/// and otherwise only logged; a changed light ends the cycle.
///
/// # Examples
///
/// ```
/// use sleeplight::config::SleepLightConfig;
/// use sleeplight::controller::{CycleState, DimCycleController, Mode};
/// use sleeplight::gateway::InMemoryLight;
/// use sleeplight::timer::RecordingTimer;
///
/// # async fn example() {
/// let timer = RecordingTimer::new();
/// let controller =
///     DimCycleController::new(InMemoryLight::rgb(), timer.clone(), SleepLightConfig::default());
///
/// assert!(controller.toggle_sleep_light(true, Mode::Manual).await);
/// assert!(controller.cycle_state().is_active());
/// assert!(timer.pending().is_some());
///
/// controller.toggle_sleep_light(false, Mode::Manual).await;
/// assert_eq!(controller.cycle_state(), CycleState::Idle);
/// # }
/// ```
pub struct DimCycleController<G, T> {
    gateway: G,
    timer: T,
    config: SleepLightConfig,
    attributes: Arc<dyn AttributeStore>,
    state: Arc<dyn StateStore>,
    clock: Arc<dyn Clock>,
}

impl<G, T> std::fmt::Debug for DimCycleController<G, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DimCycleController")
            .field("attributes", &self.attributes.load())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<G: DeviceGateway, T: Timer> DimCycleController<G, T> {
    /// Creates a controller with in-memory stores and the system clock.
    ///
    /// The manual inputs start out as configured in `config.manual`.
    #[must_use]
    pub fn new(gateway: G, timer: T, config: SleepLightConfig) -> Self {
        let state = InMemoryStateStore::with_manual_inputs(config.manual);
        Self {
            gateway,
            timer,
            config,
            attributes: Arc::new(InMemoryAttributeStore::new()),
            state: Arc::new(state),
            clock: Arc::new(SystemClock),
        }
    }

    /// Uses `store` for the persisted cycle attributes.
    #[must_use]
    pub fn with_attribute_store(mut self, store: Arc<dyn AttributeStore>) -> Self {
        self.attributes = store;
        self
    }

    /// Uses `store` for the visible state variables.
    #[must_use]
    pub fn with_state_store(mut self, store: Arc<dyn StateStore>) -> Self {
        self.state = store;
        self
    }

    /// Uses `clock` instead of the system clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the gateway.
    #[must_use]
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Returns the timer.
    #[must_use]
    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &SleepLightConfig {
        &self.config
    }

    /// Returns the current cycle state.
    #[must_use]
    pub fn cycle_state(&self) -> CycleState {
        self.attributes.load().into()
    }

    /// Returns a copy of the visible state variables.
    #[must_use]
    pub fn state(&self) -> SleepLightState {
        self.state.snapshot()
    }

    /// Switches the sleep light on or off.
    ///
    /// Switching off always succeeds and may be repeated. Switching on
    /// returns `false` without touching anything if a required control point
    /// is missing or the start brightness is 0; write failures after that do
    /// not affect the result. Switching on while a cycle runs restarts it.
    pub async fn toggle_sleep_light(&self, on: bool, mode: Mode) -> bool {
        tracing::debug!(on, ?mode, "Toggling sleep light");

        if !on {
            self.stop();
            return true;
        }

        let settings = self.settings_for(mode);
        if settings.brightness.is_dark() {
            tracing::warn!(?mode, "Cannot start sleep light, start brightness is 0");
            return false;
        }

        let mut required = TICK_POINTS.to_vec();
        if settings.color.is_some() {
            required.push(ControlPoint::Color);
        }
        if let Some(point) = self.gateway.capabilities().missing(&required) {
            tracing::warn!(%point, "Cannot start sleep light, control point is missing");
            return false;
        }

        let now = self.clock.now();
        let end = now + chrono::Duration::seconds(settings.duration.seconds());

        self.save(CycleAttributes {
            cycling_brightness: settings.brightness.value(),
            end_time: end.timestamp(),
        });
        self.state.apply(StateChange::cycle_started(
            end.format(POWER_OFF_FORMAT).to_string(),
        ));

        let gateway = &self.gateway;
        let brightness = settings.brightness;
        write_with_retry(ControlPoint::Brightness, move || {
            gateway.set_brightness(brightness)
        })
        .await;
        if let Some(color) = settings.color {
            write_with_retry(ControlPoint::Color, move || gateway.set_color(color)).await;
        }
        write_with_retry(ControlPoint::Power, move || gateway.set_power(PowerState::On)).await;

        tracing::info!(
            brightness = %settings.brightness,
            duration = %settings.duration,
            end = %end,
            "Sleep light started"
        );

        self.schedule_next();
        true
    }

    /// Performs one tick of the cycle.
    ///
    /// Ends the cycle if the light was switched off or brightened in the
    /// meantime, or if the last step was reached. Ticks while idle are
    /// ignored.
    pub async fn decrease_brightness(&self) {
        let attributes = self.attributes.load();
        if !attributes.is_active() {
            tracing::debug!("Ignoring tick, no sleep cycle running");
            return;
        }

        if let Some(point) = self.gateway.capabilities().missing(&TICK_POINTS) {
            tracing::warn!(%point, "Skipping tick, control point is missing");
            self.schedule_next();
            return;
        }

        let (power, actual) = match (self.gateway.power().await, self.gateway.brightness().await) {
            (Ok(power), Ok(actual)) => (power, actual),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Skipping tick, cannot read light state");
                self.schedule_next();
                return;
            }
        };

        if !power.is_on() || actual.is_dark() {
            tracing::info!(%power, brightness = %actual, "Light was switched off, ending sleep cycle");
            self.stop();
            return;
        }

        if u16::from(actual.value()) > u16::from(attributes.cycling_brightness) + 1 {
            tracing::info!(
                brightness = %actual,
                cycling_brightness = attributes.cycling_brightness,
                "Brightness was raised, ending sleep cycle"
            );
            self.stop();
            return;
        }

        let gateway = &self.gateway;
        let next = Brightness::clamped(attributes.cycling_brightness).step_down();

        if next.is_dark() {
            write_with_retry(ControlPoint::Power, move || {
                gateway.set_power(PowerState::Off)
            })
            .await;
            tracing::info!("Sleep cycle finished");
            self.stop();
            return;
        }

        write_with_retry(ControlPoint::Brightness, move || gateway.set_brightness(next)).await;
        self.save(CycleAttributes {
            cycling_brightness: next.value(),
            ..attributes
        });
        tracing::debug!(brightness = %next, "Brightness decreased");

        self.schedule_next();
    }

    /// Returns the milliseconds until the next tick.
    ///
    /// The time left until the end of the cycle is spread evenly over the
    /// remaining brightness steps. Returns 0 and ends the cycle once the end
    /// time has passed or no steps are left; otherwise the result is at
    /// least 1.
    pub fn calculate_next_cycle(&self) -> u64 {
        let attributes = self.attributes.load();
        let remaining_ms = attributes
            .end_time
            .saturating_mul(1000)
            .saturating_sub(self.clock.now().timestamp_millis());

        if remaining_ms <= 0 {
            tracing::debug!(remaining_ms, "End time reached, ending sleep cycle");
            self.stop();
            return 0;
        }

        let steps = i64::from(attributes.cycling_brightness);
        if steps == 0 {
            tracing::debug!("No brightness steps left, ending sleep cycle");
            self.stop();
            return 0;
        }

        let interval = (remaining_ms + steps / 2) / steps;
        let interval = u64::try_from(interval).unwrap_or(0).max(1);
        tracing::debug!(interval_ms = interval, steps, "Next tick calculated");
        interval
    }

    /// Re-evaluates persisted attributes after a (re)start.
    ///
    /// A cycle whose end time is still ahead resumes; one that has run out
    /// while nothing was running is ended.
    pub fn on_kernel_ready(&self) {
        let attributes = self.attributes.load();
        if !attributes.is_active() {
            self.state.apply(StateChange::cycle_stopped());
            return;
        }

        let now = self.clock.now();
        if attributes.end_time <= now.timestamp() {
            tracing::info!("Persisted sleep cycle has expired, ending it");
            self.stop();
            return;
        }

        if let Some(end) = CycleState::from(attributes).end_time_in(*now.offset()) {
            self.state.apply(StateChange::cycle_started(
                end.format(POWER_OFF_FORMAT).to_string(),
            ));
        }
        tracing::info!(
            cycling_brightness = attributes.cycling_brightness,
            "Resuming persisted sleep cycle"
        );
        self.schedule_next();
    }

    /// Handles a power change of the light reported from outside.
    ///
    /// Switching the light off ends a running cycle right away instead of at
    /// the next tick.
    pub fn on_device_power_changed(&self, power: PowerState) {
        if power.is_on() || !self.attributes.load().is_active() {
            return;
        }
        tracing::info!("Light reported off, ending sleep cycle");
        self.stop();
    }

    /// Starts a cycle from the weekly profile.
    ///
    /// Returns `false` if a cycle is already running or the start failed.
    pub async fn on_schedule_fired(&self) -> bool {
        if self.attributes.load().is_active() {
            tracing::debug!("Ignoring weekly start, sleep cycle already running");
            return false;
        }
        self.toggle_sleep_light(true, Mode::WeeklySchedule).await
    }

    /// Applies a user action.
    ///
    /// The switch maps to [`toggle_sleep_light`](Self::toggle_sleep_light) in
    /// manual mode and returns its result. Manual inputs return whether they
    /// changed.
    ///
    /// # Errors
    ///
    /// Returns `Error::CycleActive` if a manual input is changed while a cycle
    /// is running.
    pub async fn request_action(&self, action: UserAction) -> Result<bool> {
        let change = match action {
            UserAction::SleepLight(on) => {
                return Ok(self.toggle_sleep_light(on, Mode::Manual).await);
            }
            UserAction::Brightness(value) => StateChange::Brightness(value),
            UserAction::Color(value) => StateChange::Color(value),
            UserAction::Duration(value) => StateChange::Duration(value),
        };

        if !self.state.snapshot().manual_controls_enabled() {
            return Err(Error::CycleActive);
        }
        Ok(self.state.apply(change))
    }

    fn settings_for(&self, mode: Mode) -> ScheduleProfile {
        match mode {
            Mode::Manual => self.state.snapshot().manual().into(),
            Mode::WeeklySchedule => *self.config.profile_for(&self.clock.now()),
        }
    }

    fn schedule_next(&self) {
        let interval = self.calculate_next_cycle();
        if interval > 0 {
            self.timer.arm(Duration::from_millis(interval));
        }
    }

    fn stop(&self) {
        self.timer.disarm();
        self.save(CycleAttributes::IDLE);
        if self.state.apply(StateChange::cycle_stopped()) {
            tracing::debug!("Sleep light switched off");
        }
    }

    fn save(&self, attributes: CycleAttributes) {
        if let Err(e) = self.attributes.save(attributes) {
            tracing::warn!(error = %e, "Failed to persist cycle attributes");
        }
    }
}
