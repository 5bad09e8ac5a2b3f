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

use u8g2_fonts::{FontRenderer, fonts};

pub const TIME_BOLD: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvB24_tf>();
pub const TIME_REGULAR: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvR24_tf>();
pub const AMPM_BOLD: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvB14_tf>();
pub const AMPM_REGULAR: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvR14_tf>();
pub const DATE_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvR12_tf>();
pub const TEMP_FONT: FontRenderer = FontRenderer::new::<fonts::u8g2_font_helvR18_tf>();

/// Which font a text run renders with. Runs carry the slot rather than the
/// renderer so layouts stay comparable in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontSlot {
    Time,
    AmPm,
    Date,
    Temp
}

pub fn renderer(slot: FontSlot, bold: bool) -> &'static FontRenderer {
    match (slot, bold) {
        (FontSlot::Time, true) => &TIME_BOLD,
        (FontSlot::Time, false) => &TIME_REGULAR,
        (FontSlot::AmPm, true) => &AMPM_BOLD,
        (FontSlot::AmPm, false) => &AMPM_REGULAR,
        // date and temperature rows have no bold variant on the face
        (FontSlot::Date, _) => &DATE_FONT,
        (FontSlot::Temp, _) => &TEMP_FONT
    }
}
