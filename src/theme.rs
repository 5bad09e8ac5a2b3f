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

use embedded_graphics::{pixelcolor::Bgr888, prelude::*};
use serde::Deserialize;

use crate::state::Mode;

mod theme_de;

/// Interactive colour scheme, sourced from the config file and never
/// mutated afterwards. Ambient colours are fixed and not configurable.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ThemeConfig {
    #[serde(deserialize_with = "theme_de::colour")]
    pub background: Bgr888,
    #[serde(deserialize_with = "theme_de::colour")]
    pub time: Bgr888,
    #[serde(deserialize_with = "theme_de::colour")]
    pub date: Bgr888,
    #[serde(deserialize_with = "theme_de::colour")]
    pub divider: Bgr888,
    #[serde(deserialize_with = "theme_de::colour")]
    pub max_temp: Bgr888,
    #[serde(deserialize_with = "theme_de::colour")]
    pub min_temp: Bgr888
}

impl Default for ThemeConfig {
    fn default() -> Self {
        let pale_blue = Bgr888::new(0xb3, 0xe5, 0xfc);
        Self {
            background: Bgr888::new(0x03, 0xa9, 0xf4),
            time: Bgr888::WHITE,
            date: pale_blue,
            divider: pale_blue,
            max_temp: Bgr888::WHITE,
            min_temp: pale_blue
        }
    }
}

/// Fully resolved paint attributes for one visual element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaintStyle {
    pub colour: Bgr888,
    pub alpha: u8,
    pub anti_alias: bool,
    pub bold: bool
}

impl PaintStyle {
    /// Text alpha while the interruption filter is engaged.
    pub const MUTE_ALPHA: u8 = 100;
    pub const OPAQUE: u8 = 255;

    fn new(colour: Bgr888, alpha: u8, anti_alias: bool, bold: bool) -> Self {
        Self { colour, alpha, anti_alias, bold }
    }

    /// The colour actually written to the frame: alpha is applied by
    /// blending toward the background (the buffer has no alpha channel).
    pub fn effective_colour(&self, background: Bgr888) -> Bgr888 {
        if self.alpha == Self::OPAQUE {
            return self.colour;
        }

        let blend = |fg: u8, bg: u8| {
            ((fg as u16 * self.alpha as u16
                + bg as u16 * (Self::OPAQUE - self.alpha) as u16) / 255) as u8
        };

        Bgr888::new(
            blend(self.colour.r(), background.r()),
            blend(self.colour.g(), background.g()),
            blend(self.colour.b(), background.b())
        )
    }
}

/// One resolved paint per visual element. Always rebuilt as a whole; a
/// partial update would let elements disagree about the current mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: PaintStyle,
    pub hour: PaintStyle,
    pub minute: PaintStyle,
    pub colon: PaintStyle,
    pub am_pm: PaintStyle,
    pub date: PaintStyle,
    pub divider: PaintStyle,
    pub max_temp: PaintStyle,
    pub min_temp: PaintStyle
}

impl Palette {
    pub const AMBIENT_BACKGROUND: Bgr888 = Bgr888::BLACK;
    pub const AMBIENT_FOREGROUND: Bgr888 = Bgr888::WHITE;

    /// Map the current mode and flags to concrete paints. Pure; the same
    /// inputs always resolve to the same palette.
    pub fn resolve(
        config: &ThemeConfig,
        mode: Mode,
        muted: bool,
        low_bit_ambient: bool,
        burn_in_protection: bool
    ) -> Self {
        // hour, colon and am/pm render bold unless the display is prone to
        // burn-in, in which case bold is off in every mode
        let bold = !burn_in_protection;

        match mode {
            Mode::Interactive => {
                let text_alpha = if muted {
                    PaintStyle::MUTE_ALPHA
                } else {
                    PaintStyle::OPAQUE
                };
                let text = |colour, bold| PaintStyle::new(colour, text_alpha, true, bold);

                Self {
                    background: PaintStyle::new(
                        config.background, PaintStyle::OPAQUE, true, false
                    ),
                    hour: text(config.time, bold),
                    minute: text(config.time, false),
                    colon: text(config.time, bold),
                    am_pm: text(config.time, bold),
                    date: text(config.date, false),
                    divider: PaintStyle::new(
                        config.divider, PaintStyle::OPAQUE, true, false
                    ),
                    max_temp: text(config.max_temp, false),
                    min_temp: text(config.min_temp, false)
                }
            }
            Mode::Ambient => {
                // two fixed colours, full alpha; mute has no effect here
                let aa = !low_bit_ambient;
                let text = |bold| PaintStyle::new(
                    Self::AMBIENT_FOREGROUND, PaintStyle::OPAQUE, aa, bold
                );

                Self {
                    background: PaintStyle::new(
                        Self::AMBIENT_BACKGROUND, PaintStyle::OPAQUE, true, false
                    ),
                    hour: text(bold),
                    minute: text(false),
                    colon: text(bold),
                    am_pm: text(bold),
                    date: text(false),
                    divider: text(false),
                    max_temp: text(false),
                    min_temp: text(false)
                }
            }
        }
    }

    #[cfg(test)]
    fn text_styles(&self) -> [&PaintStyle; 7] {
        [
            &self.hour, &self.minute, &self.colon, &self.am_pm,
            &self.date, &self.max_temp, &self.min_temp
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn resolve(mode: Mode, muted: bool, low_bit: bool, burn_in: bool) -> Palette {
        Palette::resolve(&ThemeConfig::default(), mode, muted, low_bit, burn_in)
    }

    #[test]
    fn interactive_uses_configured_colours() {
        let config = ThemeConfig::default();
        let palette = resolve(Mode::Interactive, false, false, false);

        assert_eq!(palette.background.colour, config.background);
        assert_eq!(palette.hour.colour, config.time);
        assert_eq!(palette.minute.colour, config.time);
        assert_eq!(palette.colon.colour, config.time);
        assert_eq!(palette.am_pm.colour, config.time);
        assert_eq!(palette.date.colour, config.date);
        assert_eq!(palette.divider.colour, config.divider);
        assert_eq!(palette.max_temp.colour, config.max_temp);
        assert_eq!(palette.min_temp.colour, config.min_temp);

        for style in palette.text_styles() {
            assert_eq!(style.alpha, PaintStyle::OPAQUE);
        }
    }

    #[test]
    fn ambient_palette_is_exactly_black_and_white() {
        let palette = resolve(Mode::Ambient, false, false, false);

        let colours: HashSet<(u8, u8, u8)> = [
            palette.background, palette.hour, palette.minute, palette.colon,
            palette.am_pm, palette.date, palette.divider, palette.max_temp,
            palette.min_temp
        ]
        .iter()
        .map(|s| (s.colour.r(), s.colour.g(), s.colour.b()))
        .collect();

        assert_eq!(colours.len(), 2);
        assert_eq!(palette.background.colour, Palette::AMBIENT_BACKGROUND);
        for style in palette.text_styles() {
            assert_eq!(style.colour, Palette::AMBIENT_FOREGROUND);
        }
    }

    #[test]
    fn mute_dims_text_but_not_background_or_divider() {
        let palette = resolve(Mode::Interactive, true, false, false);

        for style in palette.text_styles() {
            assert_eq!(style.alpha, PaintStyle::MUTE_ALPHA);
        }
        assert_eq!(palette.background.alpha, PaintStyle::OPAQUE);
        assert_eq!(palette.divider.alpha, PaintStyle::OPAQUE);
    }

    #[test]
    fn mute_has_no_effect_in_ambient() {
        assert_eq!(
            resolve(Mode::Ambient, true, false, false),
            resolve(Mode::Ambient, false, false, false)
        );
    }

    #[test]
    fn resolver_is_idempotent() {
        for mode in [Mode::Interactive, Mode::Ambient] {
            for muted in [false, true] {
                assert_eq!(
                    resolve(mode, muted, true, true),
                    resolve(mode, muted, true, true)
                );
            }
        }
    }

    #[test]
    fn low_bit_ambient_disables_text_anti_aliasing() {
        let palette = resolve(Mode::Ambient, false, true, false);
        for style in palette.text_styles() {
            assert!(!style.anti_alias);
        }

        // leaving ambient restores anti-aliasing
        let palette = resolve(Mode::Interactive, false, true, false);
        for style in palette.text_styles() {
            assert!(style.anti_alias);
        }
    }

    #[test]
    fn low_bit_without_ambient_keeps_anti_aliasing() {
        let palette = resolve(Mode::Ambient, false, false, false);
        for style in palette.text_styles() {
            assert!(style.anti_alias);
        }
    }

    #[test]
    fn burn_in_protection_forces_normal_weight() {
        for mode in [Mode::Interactive, Mode::Ambient] {
            let palette = resolve(mode, false, false, true);
            assert!(!palette.hour.bold);
            assert!(!palette.colon.bold);
            assert!(!palette.am_pm.bold);

            let palette = resolve(mode, false, false, false);
            assert!(palette.hour.bold);
        }
    }

    #[test]
    fn effective_colour_blends_toward_background() {
        let style = PaintStyle::new(Bgr888::WHITE, PaintStyle::MUTE_ALPHA, true, false);
        let blended = style.effective_colour(Bgr888::BLACK);
        assert_eq!(blended.r(), 100);

        let opaque = PaintStyle::new(Bgr888::WHITE, PaintStyle::OPAQUE, true, false);
        assert_eq!(opaque.effective_colour(Bgr888::BLACK), Bgr888::WHITE);
    }
}
