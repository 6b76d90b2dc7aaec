// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Dim cycle scenarios against a simulated light.

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, FixedOffset};
use sleeplight::clock::{Clock, ManualClock};
use sleeplight::config::{ScheduleProfile, SleepLightConfig};
use sleeplight::controller::{CycleState, DimCycleController, Mode};
use sleeplight::gateway::{InMemoryLight, LightWrite};
use sleeplight::state::ManualInputs;
use sleeplight::store::{
    AttributeStore, CycleAttributes, InMemoryAttributeStore, InMemoryStateStore, StateStore,
};
use sleeplight::timer::RecordingTimer;
use sleeplight::types::{Brightness, PowerState, RgbColor, SleepDuration};
use sleeplight::{Capabilities, UserAction};

/// Wednesday, 31 January 2024, 22:00 CET.
const WEDNESDAY_EVENING: &str = "2024-01-31T22:00:00+01:00";

struct Harness {
    light: InMemoryLight,
    timer: RecordingTimer,
    clock: ManualClock,
    attributes: InMemoryAttributeStore,
    state: InMemoryStateStore,
    controller: DimCycleController<InMemoryLight, RecordingTimer>,
}

impl Harness {
    fn new(manual: ManualInputs) -> Self {
        Self::with(manual, SleepLightConfig::default(), WEDNESDAY_EVENING)
    }

    fn with(manual: ManualInputs, config: SleepLightConfig, now: &str) -> Self {
        let light = InMemoryLight::rgb();
        let timer = RecordingTimer::new();
        let clock = ManualClock::new(DateTime::parse_from_rfc3339(now).unwrap());
        let attributes = InMemoryAttributeStore::new();
        let state = InMemoryStateStore::with_manual_inputs(manual);

        let controller = DimCycleController::new(light.clone(), timer.clone(), config)
            .with_attribute_store(Arc::new(attributes.clone()))
            .with_state_store(Arc::new(state.clone()))
            .with_clock(Arc::new(clock.clone()));

        Self {
            light,
            timer,
            clock,
            attributes,
            state,
            controller,
        }
    }

    fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    /// Lets the pending timer expire and runs the tick. Returns `false` if
    /// nothing was pending.
    async fn tick(&self) -> bool {
        let Some(after) = self.timer.fire() else {
            return false;
        };
        let millis = i64::try_from(after.as_millis()).unwrap();
        self.clock.advance(ChronoDuration::milliseconds(millis));
        self.controller.decrease_brightness().await;
        true
    }

    /// Runs ticks until the timer stays unarmed. Returns the number of ticks.
    async fn run_to_end(&self) -> usize {
        let mut ticks = 0;
        while self.tick().await {
            ticks += 1;
            assert!(ticks <= 100, "cycle did not terminate");
        }
        ticks
    }

    fn assert_idle(&self) {
        assert_eq!(self.attributes.load(), CycleAttributes::IDLE);
        assert_eq!(self.controller.cycle_state(), CycleState::Idle);
        assert!(self.timer.pending().is_none());

        let state = self.state.snapshot();
        assert!(!state.is_on());
        assert!(state.manual_controls_enabled());
        assert!(state.next_power_off().is_none());
    }
}

fn manual(brightness: u8, minutes: u16) -> ManualInputs {
    ManualInputs {
        brightness: Brightness::new(brightness).unwrap(),
        color: RgbColor::WARM_ORANGE,
        duration: SleepDuration::from_minutes(minutes).unwrap(),
    }
}

// ============================================================================
// Starting and stopping
// ============================================================================

mod toggle {
    use super::*;

    #[tokio::test]
    async fn thirty_minutes_at_fifty_percent() {
        let h = Harness::new(manual(50, 30));

        assert!(h.controller.toggle_sleep_light(true, Mode::Manual).await);

        let attributes = h.attributes.load();
        assert_eq!(attributes.cycling_brightness, 50);
        assert_eq!(attributes.end_time, h.now().timestamp() + 1800);
        assert_eq!(h.timer.pending().unwrap().as_secs(), 36);

        let state = h.state.snapshot();
        assert!(state.is_on());
        assert!(!state.manual_controls_enabled());
        assert_eq!(state.next_power_off(), Some("31.01.2024, 22:30:00"));

        assert_eq!(h.light.current_power(), PowerState::On);
        assert_eq!(h.light.current_brightness().value(), 50);
        assert_eq!(h.light.current_color(), RgbColor::WARM_ORANGE);
    }

    #[tokio::test]
    async fn on_then_off_zeroes_everything() {
        let h = Harness::new(manual(50, 30));

        h.controller.toggle_sleep_light(true, Mode::Manual).await;
        assert!(h.controller.toggle_sleep_light(false, Mode::Manual).await);

        h.assert_idle();
    }

    #[tokio::test]
    async fn off_is_idempotent() {
        let h = Harness::new(manual(50, 30));

        assert!(h.controller.toggle_sleep_light(false, Mode::Manual).await);
        assert!(h.controller.toggle_sleep_light(false, Mode::Manual).await);

        h.assert_idle();
        assert!(h.light.writes().is_empty());
    }

    #[tokio::test]
    async fn missing_power_point_fails_without_side_effects() {
        let h = Harness::new(manual(50, 30));
        h.light.set_capabilities(Capabilities {
            power: false,
            brightness: true,
            color: true,
        });

        assert!(!h.controller.toggle_sleep_light(true, Mode::Manual).await);

        h.assert_idle();
        assert!(h.light.writes().is_empty());
        assert!(h.timer.arms().is_empty());
    }

    #[tokio::test]
    async fn zero_start_brightness_leaves_light_untouched() {
        let h = Harness::new(manual(0, 30));

        assert!(!h.controller.toggle_sleep_light(true, Mode::Manual).await);

        h.assert_idle();
        assert_eq!(h.light.current_power(), PowerState::Off);
        assert!(h.light.writes().is_empty());
        assert!(h.timer.arms().is_empty());
    }

    #[tokio::test]
    async fn zero_profile_brightness_does_not_start_schedule() {
        let profile = ScheduleProfile::default().with_brightness(Brightness::MIN);
        let config = SleepLightConfig::default().with_weekday(profile);
        let h = Harness::with(manual(50, 30), config, WEDNESDAY_EVENING);

        assert!(!h.controller.on_schedule_fired().await);

        h.assert_idle();
        assert!(h.light.writes().is_empty());
    }

    #[tokio::test]
    async fn profile_without_color_needs_no_color_point() {
        let profile = ScheduleProfile::default().without_color();
        let config = SleepLightConfig::default().with_weekday(profile);
        let h = Harness::with(manual(50, 30), config, WEDNESDAY_EVENING);
        h.light.set_capabilities(Capabilities::dimmable_light());

        assert!(h.controller.toggle_sleep_light(true, Mode::WeeklySchedule).await);
        assert_eq!(
            h.light.writes(),
            vec![
                LightWrite::Brightness(Brightness::new(50).unwrap()),
                LightWrite::Power(PowerState::On),
            ]
        );
    }

    #[tokio::test]
    async fn failed_start_writes_are_retried_once() {
        let h = Harness::new(manual(50, 30));
        h.light.fail_next_writes(1);

        assert!(h.controller.toggle_sleep_light(true, Mode::Manual).await);

        // First brightness write failed, the retry went through
        assert_eq!(h.light.writes().len(), 3);
        assert_eq!(h.light.current_power(), PowerState::On);
    }

    #[tokio::test]
    async fn write_failures_do_not_change_result() {
        let h = Harness::new(manual(50, 30));
        h.light.fail_next_writes(6);

        assert!(h.controller.toggle_sleep_light(true, Mode::Manual).await);

        assert!(h.light.writes().is_empty());
        assert!(h.controller.cycle_state().is_active());
        assert!(h.timer.pending().is_some());
    }
}

// ============================================================================
// Profiles
// ============================================================================

mod profiles {
    use super::*;

    fn config() -> SleepLightConfig {
        SleepLightConfig::default()
            .with_weekday(
                ScheduleProfile::default()
                    .with_brightness(Brightness::new(40).unwrap())
                    .with_duration(SleepDuration::from_minutes(20).unwrap()),
            )
            .with_weekend(
                ScheduleProfile::default()
                    .with_brightness(Brightness::new(60).unwrap())
                    .with_color(RgbColor::new(0xFF, 0x00, 0x00))
                    .with_duration(SleepDuration::from_minutes(60).unwrap()),
            )
    }

    #[tokio::test]
    async fn friday_uses_weekday_profile() {
        let h = Harness::with(manual(50, 30), config(), "2024-02-02T23:00:00+01:00");

        h.controller
            .toggle_sleep_light(true, Mode::WeeklySchedule)
            .await;

        let attributes = h.attributes.load();
        assert_eq!(attributes.cycling_brightness, 40);
        assert_eq!(attributes.end_time, h.now().timestamp() + 20 * 60);
    }

    #[tokio::test]
    async fn sunday_uses_weekend_profile() {
        let h = Harness::with(manual(50, 30), config(), "2024-02-04T21:30:00+01:00");

        h.controller
            .toggle_sleep_light(true, Mode::WeeklySchedule)
            .await;

        let attributes = h.attributes.load();
        assert_eq!(attributes.cycling_brightness, 60);
        assert_eq!(attributes.end_time, h.now().timestamp() + 60 * 60);
        assert_eq!(h.light.current_color(), RgbColor::new(0xFF, 0x00, 0x00));
    }

    #[tokio::test]
    async fn manual_mode_reads_current_inputs() {
        let h = Harness::with(manual(50, 30), config(), "2024-02-04T21:30:00+01:00");

        h.controller
            .request_action(UserAction::Duration(SleepDuration::from_minutes(10).unwrap()))
            .await
            .unwrap();
        h.controller
            .request_action(UserAction::SleepLight(true))
            .await
            .unwrap();

        let attributes = h.attributes.load();
        assert_eq!(attributes.cycling_brightness, 50);
        assert_eq!(attributes.end_time, h.now().timestamp() + 10 * 60);
    }

    #[tokio::test]
    async fn scheduled_start_ignored_while_running() {
        let h = Harness::with(manual(50, 30), config(), "2024-02-04T21:30:00+01:00");

        h.controller.toggle_sleep_light(true, Mode::Manual).await;
        assert!(!h.controller.on_schedule_fired().await);

        assert_eq!(h.attributes.load().cycling_brightness, 50);
    }
}

// ============================================================================
// Full cycles
// ============================================================================

mod cycle {
    use super::*;

    #[tokio::test]
    async fn fifty_ticks_down_to_off() {
        let h = Harness::new(manual(50, 30));
        let start = h.now();
        h.controller.toggle_sleep_light(true, Mode::Manual).await;

        let ticks = h.run_to_end().await;

        assert_eq!(ticks, 50);
        assert_eq!(h.now(), start + ChronoDuration::minutes(30));
        assert_eq!(h.light.current_power(), PowerState::Off);
        h.assert_idle();

        let brightness_writes: Vec<u8> = h
            .light
            .writes()
            .into_iter()
            .filter_map(|write| match write {
                LightWrite::Brightness(b) => Some(b.value()),
                _ => None,
            })
            .collect();
        let expected: Vec<u8> = std::iter::once(50).chain((1..=49).rev()).collect();
        assert_eq!(brightness_writes, expected);
    }

    #[tokio::test]
    async fn tick_count_matches_start_brightness() {
        for (brightness, minutes) in [(1, 1), (7, 1), (33, 45), (100, 120), (100, 1)] {
            let h = Harness::new(manual(brightness, minutes));
            let end = h.now() + ChronoDuration::minutes(i64::from(minutes));
            h.controller.toggle_sleep_light(true, Mode::Manual).await;

            let ticks = h.run_to_end().await;

            assert_eq!(ticks, usize::from(brightness), "{brightness}% over {minutes} min");
            assert!(h.now() <= end, "{brightness}% over {minutes} min ended late");
            h.assert_idle();
        }
    }

    #[tokio::test]
    async fn cycling_brightness_never_increases() {
        let h = Harness::new(manual(20, 5));
        h.controller.toggle_sleep_light(true, Mode::Manual).await;

        let mut previous = h.attributes.load().cycling_brightness;
        while h.tick().await {
            let current = h.attributes.load().cycling_brightness;
            assert!(current <= previous);
            previous = current;
        }
        assert_eq!(previous, 0);
    }

    #[tokio::test]
    async fn late_ticks_do_not_stretch_the_cycle() {
        let h = Harness::new(manual(10, 10));
        let end = h.now() + ChronoDuration::minutes(10);
        h.controller.toggle_sleep_light(true, Mode::Manual).await;

        // First tick arrives 30 s late
        let first = h.timer.fire().unwrap();
        h.clock
            .advance(ChronoDuration::milliseconds(i64::try_from(first.as_millis()).unwrap() + 30_000));
        h.controller.decrease_brightness().await;

        // 510 s left for the remaining 9 steps
        let remaining = (end - h.now()).num_milliseconds();
        assert_eq!(remaining, 510_000);
        assert_eq!(h.timer.pending().unwrap().as_millis(), 510_000 / 9 + 1);

        h.run_to_end().await;
        assert!(h.now() <= end);
    }

    #[tokio::test]
    async fn tick_write_failures_are_retried_then_ignored() {
        let h = Harness::new(manual(10, 10));
        h.controller.toggle_sleep_light(true, Mode::Manual).await;

        h.light.fail_next_writes(2);
        assert!(h.tick().await);

        // Both attempts failed; the cycle still moves on
        assert_eq!(h.attributes.load().cycling_brightness, 9);
        assert_eq!(h.light.current_brightness().value(), 10);
        assert!(h.timer.pending().is_some());

        // The device lagging one step behind is tolerated
        assert!(h.tick().await);
        assert_eq!(h.attributes.load().cycling_brightness, 8);
        assert_eq!(h.light.current_brightness().value(), 8);
    }
}

// ============================================================================
// External interference
// ============================================================================

mod interference {
    use super::*;

    async fn running_at_forty() -> Harness {
        let h = Harness::new(manual(50, 30));
        h.controller.toggle_sleep_light(true, Mode::Manual).await;
        for _ in 0..10 {
            assert!(h.tick().await);
        }
        assert_eq!(h.attributes.load().cycling_brightness, 40);
        h
    }

    #[tokio::test]
    async fn brightness_raised_ends_cycle() {
        let h = running_at_forty().await;
        let writes_before = h.light.writes().len();

        h.light.set_external_brightness(Brightness::new(60).unwrap());
        assert!(h.tick().await);

        h.assert_idle();
        assert_eq!(h.light.writes().len(), writes_before);
        assert_eq!(h.light.current_brightness().value(), 60);
        assert_eq!(h.light.current_power(), PowerState::On);
    }

    #[tokio::test]
    async fn one_step_above_is_tolerated() {
        let h = running_at_forty().await;

        h.light.set_external_brightness(Brightness::new(41).unwrap());
        assert!(h.tick().await);

        assert_eq!(h.attributes.load().cycling_brightness, 39);
        assert_eq!(h.light.current_brightness().value(), 39);
    }

    #[tokio::test]
    async fn lowered_brightness_continues_from_own_value() {
        let h = running_at_forty().await;

        h.light.set_external_brightness(Brightness::new(15).unwrap());
        assert!(h.tick().await);

        assert_eq!(h.attributes.load().cycling_brightness, 39);
        assert_eq!(h.light.current_brightness().value(), 39);
    }

    #[tokio::test]
    async fn light_switched_off_ends_cycle() {
        let h = running_at_forty().await;
        let writes_before = h.light.writes().len();

        h.light.set_external_power(PowerState::Off);
        assert!(h.tick().await);

        h.assert_idle();
        assert_eq!(h.light.writes().len(), writes_before);
    }

    #[tokio::test]
    async fn brightness_zero_counts_as_off() {
        let h = running_at_forty().await;

        h.light.set_external_brightness(Brightness::MIN);
        assert!(h.tick().await);

        h.assert_idle();
    }

    #[tokio::test]
    async fn power_off_notification_ends_cycle_immediately() {
        let h = running_at_forty().await;

        h.controller.on_device_power_changed(PowerState::Off);

        h.assert_idle();
        // A tick that was already on its way finds nothing to do
        h.controller.decrease_brightness().await;
        h.assert_idle();
    }

    #[tokio::test]
    async fn missing_control_point_keeps_cycle_and_timer() {
        let h = running_at_forty().await;

        h.light.set_capabilities(Capabilities::none());
        assert!(h.tick().await);

        assert_eq!(h.attributes.load().cycling_brightness, 40);
        assert!(h.timer.pending().is_some());

        h.light.set_capabilities(Capabilities::rgb_light());
        assert!(h.tick().await);
        assert_eq!(h.attributes.load().cycling_brightness, 39);
    }

    #[tokio::test]
    async fn manual_inputs_locked_while_running() {
        let h = running_at_forty().await;

        let result = h
            .controller
            .request_action(UserAction::Color(RgbColor::new(0, 0, 0xFF)))
            .await;

        assert!(matches!(result, Err(sleeplight::Error::CycleActive)));
        assert_eq!(h.state.snapshot().manual().color, RgbColor::WARM_ORANGE);
    }
}

// ============================================================================
// Interval calculation
// ============================================================================

mod interval {
    use super::*;

    #[tokio::test]
    async fn zero_exactly_when_past_due() {
        let h = Harness::new(manual(50, 30));
        h.controller.toggle_sleep_light(true, Mode::Manual).await;

        h.clock.advance(ChronoDuration::seconds(1799));
        assert!(h.controller.calculate_next_cycle() > 0);
        assert!(h.controller.cycle_state().is_active());

        h.clock.advance(ChronoDuration::seconds(1));
        assert_eq!(h.controller.calculate_next_cycle(), 0);
        h.assert_idle();
    }

    #[tokio::test]
    async fn idle_controller_reports_zero() {
        let h = Harness::new(manual(50, 30));

        assert_eq!(h.controller.calculate_next_cycle(), 0);
        h.assert_idle();
    }

    #[tokio::test]
    async fn late_tick_after_end_time_ends_cycle() {
        let h = Harness::new(manual(50, 30));
        h.controller.toggle_sleep_light(true, Mode::Manual).await;

        // Process was suspended past the end of the cycle
        h.timer.fire();
        h.clock.advance(ChronoDuration::minutes(45));
        h.controller.decrease_brightness().await;

        h.assert_idle();
        assert_eq!(h.light.current_brightness().value(), 49);
    }
}

// ============================================================================
// Restart recovery
// ============================================================================

mod recovery {
    use super::*;

    #[tokio::test]
    async fn running_cycle_resumes() {
        let h = Harness::new(manual(50, 30));
        h.attributes
            .save(CycleAttributes {
                cycling_brightness: 20,
                end_time: h.now().timestamp() + 600,
            })
            .unwrap();

        h.controller.on_kernel_ready();

        assert_eq!(h.timer.pending().unwrap().as_secs(), 30);
        let state = h.state.snapshot();
        assert!(state.is_on());
        assert!(!state.manual_controls_enabled());
        assert_eq!(state.next_power_off(), Some("31.01.2024, 22:10:00"));
    }

    #[tokio::test]
    async fn expired_cycle_is_ended() {
        let h = Harness::new(manual(50, 30));
        h.attributes
            .save(CycleAttributes {
                cycling_brightness: 20,
                end_time: h.now().timestamp() - 1,
            })
            .unwrap();

        h.controller.on_kernel_ready();

        h.assert_idle();
        assert!(h.light.writes().is_empty());
    }

    #[tokio::test]
    async fn idle_start_unlocks_inputs() {
        let h = Harness::new(manual(50, 30));
        h.state.apply(sleeplight::state::StateChange::cycle_started("stale"));

        h.controller.on_kernel_ready();

        h.assert_idle();
        assert!(h.timer.arms().is_empty());
    }
}
