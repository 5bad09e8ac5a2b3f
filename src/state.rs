/*
 * Sunface - digital weather watch face
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

use log::debug;

use crate::{events::Event, icon::IconBitmap};

/// Display mode as reported by the host. The host alone flips this; the
/// face never self-initiates a mode change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    Ambient
}

/// Combined lifecycle phase, derived from visibility and mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Hidden,
    Interactive,
    Ambient
}

/// Last weather push. Before any push arrives this holds the defined
/// zero defaults; it is never an error state.
#[derive(Debug, Clone, Default)]
pub struct WeatherSnapshot {
    pub max_temp: f64,
    pub min_temp: f64,
    pub icon: Option<IconBitmap>,
    /// Generation of the decode that produced `icon`; also keys the
    /// scaled-icon cache in the composer.
    pub icon_generation: u64
}

/// Actions the runtime must carry out after a transition. The state machine
/// itself performs no I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    /// Open the weather channel subscription.
    Subscribe,
    /// Close the weather channel subscription.
    Unsubscribe,
    /// Start the periodic redraw timer with the given epoch.
    ArmTimer(u64),
    /// Stop the periodic redraw timer.
    DisarmTimer,
    /// Hook up locale/timezone change notifications.
    RegisterLocale,
    UnregisterLocale,
    /// Re-derive locale dependent date formats.
    RefreshFormats,
    /// Re-resolve the full paint palette. Always a full re-application;
    /// partial paint updates are a bug.
    ResolvePalette,
    /// Request a frame.
    Redraw
}

/// The face's single mutable state, driven entirely by [`Event`]s.
#[derive(Debug)]
pub struct FaceState {
    pub visible: bool,
    pub mode: Mode,
    pub muted: bool,
    pub low_bit_ambient: bool,
    pub burn_in_protection: bool,
    pub peek_card: Option<u32>,
    pub weather: WeatherSnapshot,
    timer_armed: bool,
    timer_epoch: u64,
    subscription_epoch: u64,
    locale_registered: bool
}

impl FaceState {
    pub fn new() -> Self {
        Self {
            visible: false,
            mode: Mode::Interactive,
            muted: false,
            low_bit_ambient: false,
            burn_in_protection: false,
            peek_card: None,
            weather: WeatherSnapshot::default(),
            timer_armed: false,
            timer_epoch: 0,
            subscription_epoch: 0,
            locale_registered: false
        }
    }

    pub fn phase(&self) -> Phase {
        if !self.visible {
            Phase::Hidden
        } else if self.mode == Mode::Ambient {
            Phase::Ambient
        } else {
            Phase::Interactive
        }
    }

    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    /// Apply one event and return the side effects the runtime must execute,
    /// in order.
    pub fn apply(&mut self, event: &Event) -> Vec<SideEffect> {
        let mut fx = Vec::new();

        match event {
            Event::SetVisible(visible) => {
                self.visible = *visible;
                if self.visible {
                    fx.push(SideEffect::Subscribe);
                    self.register_locale(&mut fx);
                    // formats may have gone stale while hidden
                    fx.push(SideEffect::RefreshFormats);
                } else {
                    fx.push(SideEffect::Unsubscribe);
                    self.subscription_epoch += 1;
                    self.unregister_locale(&mut fx);
                }
                self.update_timer(&mut fx);
                fx.push(SideEffect::Redraw);
            }
            Event::SetAmbient(ambient) => {
                self.mode = if *ambient { Mode::Ambient } else { Mode::Interactive };
                fx.push(SideEffect::ResolvePalette);
                self.update_timer(&mut fx);
                fx.push(SideEffect::Redraw);
            }
            Event::SetProperties { low_bit_ambient, burn_in_protection } => {
                self.low_bit_ambient = *low_bit_ambient;
                self.burn_in_protection = *burn_in_protection;
                fx.push(SideEffect::ResolvePalette);
                fx.push(SideEffect::Redraw);
            }
            Event::SetMuted(muted) => {
                if self.muted != *muted {
                    self.muted = *muted;
                    fx.push(SideEffect::ResolvePalette);
                    fx.push(SideEffect::Redraw);
                }
            }
            Event::TimeTick => {
                fx.push(SideEffect::Redraw);
            }
            Event::RedrawTick(epoch) => {
                if self.timer_armed && *epoch == self.timer_epoch {
                    fx.push(SideEffect::Redraw);
                } else {
                    debug!("Dropping stale redraw tick (epoch {})", epoch);
                }
            }
            Event::LocaleChanged => {
                fx.push(SideEffect::RefreshFormats);
                fx.push(SideEffect::Redraw);
            }
            Event::PeekCard(region) => {
                self.peek_card = *region;
                fx.push(SideEffect::Redraw);
            }
            Event::WeatherData(update) => {
                // temperatures are replaced wholesale; the icon follows once
                // its background decode completes
                self.weather.max_temp = update.max_temp;
                self.weather.min_temp = update.min_temp;
                fx.push(SideEffect::Redraw);
            }
            Event::IconDecoded { generation, epoch, icon } => {
                if self.apply_icon(*generation, *epoch, icon.clone()) {
                    fx.push(SideEffect::Redraw);
                }
            }
            Event::Quit => { }
        }

        fx
    }

    /// Accept a decoded icon only if it belongs to the current subscription
    /// and is newer than anything already applied. A failed decode keeps the
    /// previous icon on screen.
    fn apply_icon(&mut self, generation: u64, epoch: u64, icon: Option<IconBitmap>) -> bool {
        if epoch != self.subscription_epoch {
            debug!("Discarding icon decode from closed subscription (epoch {})", epoch);
            return false;
        }
        if generation <= self.weather.icon_generation {
            debug!("Discarding superseded icon decode (generation {})", generation);
            return false;
        }

        match icon {
            Some(icon) => {
                self.weather.icon = Some(icon);
                self.weather.icon_generation = generation;
                true
            }
            None => false
        }
    }

    /// The redraw timer runs iff the face is visible and interactive. Every
    /// arm/disarm bumps the epoch so ticks already in flight are dropped.
    fn update_timer(&mut self, fx: &mut Vec<SideEffect>) {
        let should_run = self.visible && self.mode == Mode::Interactive;
        if should_run != self.timer_armed {
            self.timer_armed = should_run;
            self.timer_epoch += 1;
            fx.push(if should_run {
                SideEffect::ArmTimer(self.timer_epoch)
            } else {
                SideEffect::DisarmTimer
            });
        }
    }

    fn register_locale(&mut self, fx: &mut Vec<SideEffect>) {
        // double registration is a guarded no-op
        if !self.locale_registered {
            self.locale_registered = true;
            fx.push(SideEffect::RegisterLocale);
        }
    }

    fn unregister_locale(&mut self, fx: &mut Vec<SideEffect>) {
        if self.locale_registered {
            self.locale_registered = false;
            fx.push(SideEffect::UnregisterLocale);
        }
    }
}

#[cfg(test)]
mod tests {
    use embedded_graphics::{pixelcolor::Bgr888, prelude::*};

    use super::*;
    use crate::weather::WeatherUpdate;

    fn test_icon() -> IconBitmap {
        IconBitmap::from_pixels(1, 1, vec![Bgr888::WHITE])
    }

    fn shown() -> FaceState {
        let mut state = FaceState::new();
        state.apply(&Event::SetVisible(true));
        state
    }

    #[test]
    fn starts_hidden_with_zero_weather() {
        let state = FaceState::new();
        assert_eq!(state.phase(), Phase::Hidden);
        assert!(!state.timer_armed());
        assert_eq!(state.weather.max_temp, 0.0);
        assert_eq!(state.weather.min_temp, 0.0);
        assert!(state.weather.icon.is_none());
    }

    #[test]
    fn becoming_visible_subscribes_and_arms_timer() {
        let mut state = FaceState::new();
        let fx = state.apply(&Event::SetVisible(true));

        assert_eq!(state.phase(), Phase::Interactive);
        assert!(fx.contains(&SideEffect::Subscribe));
        assert!(fx.contains(&SideEffect::RegisterLocale));
        assert!(fx.contains(&SideEffect::RefreshFormats));
        assert!(fx.contains(&SideEffect::ArmTimer(1)));
        assert!(fx.contains(&SideEffect::Redraw));
    }

    #[test]
    fn becoming_hidden_tears_down() {
        let mut state = shown();
        let fx = state.apply(&Event::SetVisible(false));

        assert_eq!(state.phase(), Phase::Hidden);
        assert!(fx.contains(&SideEffect::Unsubscribe));
        assert!(fx.contains(&SideEffect::UnregisterLocale));
        assert!(fx.contains(&SideEffect::DisarmTimer));
    }

    #[test]
    fn ambient_toggle_flips_timer_and_palette() {
        let mut state = shown();

        let fx = state.apply(&Event::SetAmbient(true));
        assert_eq!(state.phase(), Phase::Ambient);
        assert!(!state.timer_armed());
        assert!(fx.contains(&SideEffect::ResolvePalette));
        assert!(fx.contains(&SideEffect::DisarmTimer));

        let fx = state.apply(&Event::SetAmbient(false));
        assert_eq!(state.phase(), Phase::Interactive);
        assert!(state.timer_armed());
        assert!(fx.contains(&SideEffect::ResolvePalette));
        assert!(fx.iter().any(|e| matches!(e, SideEffect::ArmTimer(_))));
    }

    #[test]
    fn timer_never_runs_while_hidden() {
        // property: visible == false implies timer disarmed, from any state
        let mut state = FaceState::new();
        assert!(!state.timer_armed());

        state.apply(&Event::SetAmbient(true));
        assert!(!state.timer_armed());

        state.apply(&Event::SetAmbient(false));
        assert!(!state.timer_armed());

        state.apply(&Event::SetVisible(true));
        assert!(state.timer_armed());

        state.apply(&Event::SetAmbient(true));
        state.apply(&Event::SetVisible(false));
        assert!(!state.timer_armed());

        state.apply(&Event::SetAmbient(false));
        assert!(!state.timer_armed());
    }

    #[test]
    fn stale_redraw_tick_is_dropped() {
        let mut state = shown();
        let armed_epoch = 1;

        // a tick with the armed epoch redraws
        let fx = state.apply(&Event::RedrawTick(armed_epoch));
        assert!(fx.contains(&SideEffect::Redraw));

        // ambient entry disarms; a tick queued before the disarm must not
        state.apply(&Event::SetAmbient(true));
        let fx = state.apply(&Event::RedrawTick(armed_epoch));
        assert!(fx.is_empty());
    }

    #[test]
    fn locale_registration_is_idempotent() {
        let mut state = FaceState::new();

        let fx = state.apply(&Event::SetVisible(true));
        assert!(fx.contains(&SideEffect::RegisterLocale));

        // host may repeat the visibility report; no second registration
        let fx = state.apply(&Event::SetVisible(true));
        assert!(!fx.contains(&SideEffect::RegisterLocale));

        let fx = state.apply(&Event::SetVisible(false));
        assert!(fx.contains(&SideEffect::UnregisterLocale));

        let fx = state.apply(&Event::SetVisible(false));
        assert!(!fx.contains(&SideEffect::UnregisterLocale));
    }

    #[test]
    fn weather_push_replaces_temps_wholesale() {
        let mut state = shown();
        state.apply(&Event::WeatherData(WeatherUpdate {
            max_temp: 75.3,
            min_temp: 58.1,
            icon_asset: Vec::new()
        }));

        assert_eq!(state.weather.max_temp, 75.3);
        assert_eq!(state.weather.min_temp, 58.1);
        // icon arrives separately, once decoded
        assert!(state.weather.icon.is_none());
    }

    #[test]
    fn decoded_icon_applies_and_failure_retains_previous() {
        let mut state = shown();

        let fx = state.apply(&Event::IconDecoded {
            generation: 1, epoch: 0, icon: Some(test_icon())
        });
        assert!(fx.contains(&SideEffect::Redraw));
        assert!(state.weather.icon.is_some());

        // a later decode that fails keeps the previous icon
        let fx = state.apply(&Event::IconDecoded {
            generation: 2, epoch: 0, icon: None
        });
        assert!(fx.is_empty());
        assert!(state.weather.icon.is_some());
        assert_eq!(state.weather.icon_generation, 1);
    }

    #[test]
    fn older_decode_never_clobbers_newer() {
        let mut state = shown();

        state.apply(&Event::IconDecoded {
            generation: 2, epoch: 0,
            icon: Some(IconBitmap::from_pixels(1, 1, vec![Bgr888::BLACK]))
        });

        // generation 1 finished late; highest generation wins
        let fx = state.apply(&Event::IconDecoded {
            generation: 1, epoch: 0, icon: Some(test_icon())
        });
        assert!(fx.is_empty());
        assert_eq!(state.weather.icon_generation, 2);
    }

    #[test]
    fn decode_from_closed_subscription_is_discarded() {
        let mut state = shown();
        state.apply(&Event::SetVisible(false)); // epoch moves to 1

        let fx = state.apply(&Event::IconDecoded {
            generation: 1, epoch: 0, icon: Some(test_icon())
        });
        assert!(fx.is_empty());
        assert!(state.weather.icon.is_none());
    }

    #[test]
    fn mute_toggle_resolves_palette_once() {
        let mut state = shown();

        let fx = state.apply(&Event::SetMuted(true));
        assert!(fx.contains(&SideEffect::ResolvePalette));

        // unchanged report is a no-op
        let fx = state.apply(&Event::SetMuted(true));
        assert!(fx.is_empty());
    }

    #[test]
    fn peek_card_updates_region() {
        let mut state = shown();
        state.apply(&Event::PeekCard(Some(96)));
        assert_eq!(state.peek_card, Some(96));

        state.apply(&Event::PeekCard(None));
        assert_eq!(state.peek_card, None);
    }
}
