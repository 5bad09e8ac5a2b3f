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

use std::cell::RefCell;

use anyhow::{Result, anyhow};
use embedded_graphics::{
    prelude::*,
    primitives::{Line, PrimitiveStyle}
};
use u8g2_fonts::types::{FontColor, HorizontalAlignment, VerticalPosition};

use crate::{
    clock::{self, ClockFormats, ClockSnapshot, LocaleProvider},
    config::Config,
    drawable::{AppDrawable, AppFrameBuf, DISPLAY_SIZE},
    fonts::{self, FontSlot},
    icon::IconBitmap,
    state::{FaceState, Mode, WeatherSnapshot},
    theme::{Palette, PaintStyle, ThemeConfig}
};

const COLON: &str = ":";

/// Extra pixels added to the measured temperature text height when sizing
/// the condition icon.
const ICON_MARGIN: u32 = 8;

/// Gap between the condition icon and the flanking temperature texts.
const TEMP_GAP: i32 = 8;

/// Shape dependent layout dimensions (the window-insets analog).
#[derive(Debug, Clone, Copy)]
pub struct FaceMetrics {
    /// Baseline of the time row.
    pub y_offset: i32,
    /// Baseline-to-baseline spacing between rows.
    pub line_height: i32,
    /// Half the divider line length.
    pub divider_half_width: i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    Hour,
    Colon,
    Minute,
    AmPm,
    Date,
    MaxTemp,
    MinTemp
}

/// One positioned piece of text. `origin` is the left end of the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub kind: ElementKind,
    pub text: String,
    pub origin: Point,
    pub style: PaintStyle,
    pub font: FontSlot
}

#[derive(Debug, Clone, PartialEq)]
pub struct DividerLine {
    pub start: Point,
    pub end: Point,
    pub style: PaintStyle
}

#[derive(Debug, Clone, PartialEq)]
pub struct IconPlacement {
    pub centre_x: i32,
    pub top: i32,
    pub height: u32,
    pub greyscale: bool,
    pub smooth: bool
}

/// The composed frame: nothing but draw primitives. Rendering it has no
/// side effect beyond the frame buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceLayout {
    pub background: PaintStyle,
    pub runs: Vec<TextRun>,
    pub divider: Option<DividerLine>,
    pub icon: Option<IconPlacement>
}

fn measure(slot: FontSlot, bold: bool, text: &str) -> Result<(i32, u32)> {
    let dims = fonts::renderer(slot, bold)
        .get_rendered_dimensions(text, Point::zero(), VerticalPosition::Baseline)
        .map_err(|e| anyhow!("Font lookup failed: {:?}", e))?;

    let height = dims.bounding_box.map(|b| b.size.height).unwrap_or(0);
    Ok((dims.advance.x, height))
}

/// Compose one frame from a single clock snapshot and the current state.
///
/// Layout, top to bottom, centred on the display: colon-anchored time row,
/// date row, then (only when no peek card obscures the lower region) the
/// divider line and the temperature row with the condition icon between the
/// high and low readings.
pub fn compose(
    snapshot: &ClockSnapshot,
    use_24_hour: bool,
    formats: &ClockFormats,
    palette: &Palette,
    metrics: &FaceMetrics,
    weather: &WeatherSnapshot,
    mode: Mode,
    peek_card: Option<u32>
) -> Result<FaceLayout> {
    let xc = (DISPLAY_SIZE / 2) as i32;
    let mut runs = Vec::new();
    let mut y = metrics.y_offset;

    // time row, anchored on the colon in the dead centre
    let hour = formats.hour_text(snapshot, use_24_hour);
    let minute = formats.minute_text(snapshot);
    let (colon_w, _) = measure(FontSlot::Time, palette.colon.bold, COLON)?;
    let (hour_w, _) = measure(FontSlot::Time, palette.hour.bold, &hour)?;

    runs.push(TextRun {
        kind: ElementKind::Hour,
        text: hour,
        origin: Point::new(xc - colon_w / 2 - hour_w, y),
        style: palette.hour,
        font: FontSlot::Time
    });
    runs.push(TextRun {
        kind: ElementKind::Colon,
        text: COLON.to_string(),
        origin: Point::new(xc - colon_w / 2, y),
        style: palette.colon,
        font: FontSlot::Time
    });
    let minute_x = xc - colon_w / 2 + colon_w;
    let (minute_w, _) = measure(FontSlot::Time, palette.minute.bold, &minute)?;
    runs.push(TextRun {
        kind: ElementKind::Minute,
        text: minute,
        origin: Point::new(minute_x, y),
        style: palette.minute,
        font: FontSlot::Time
    });

    if let Some(am_pm) = formats.am_pm_text(snapshot, use_24_hour) {
        runs.push(TextRun {
            kind: ElementKind::AmPm,
            text: am_pm,
            origin: Point::new(minute_x + minute_w + colon_w / 2, y),
            style: palette.am_pm,
            font: FontSlot::AmPm
        });
    }

    // date row
    y += metrics.line_height;
    let date = formats.date_text(snapshot);
    let (date_w, _) = measure(FontSlot::Date, palette.date.bold, &date)?;
    runs.push(TextRun {
        kind: ElementKind::Date,
        text: date,
        origin: Point::new(xc - date_w / 2, y),
        style: palette.date,
        font: FontSlot::Date
    });

    // the divider and weather row are dropped entirely while a peek card
    // occupies the lower region
    if peek_card.is_some() {
        return Ok(FaceLayout {
            background: palette.background,
            runs,
            divider: None,
            icon: None
        });
    }

    y += metrics.line_height;
    let divider = DividerLine {
        start: Point::new(xc - metrics.divider_half_width, y),
        end: Point::new(xc + metrics.divider_half_width, y),
        style: palette.divider
    };

    // temperature row: high and low flank the condition icon
    y += metrics.line_height;
    let max_text = clock::temperature_text(weather.max_temp);
    let min_text = clock::temperature_text(weather.min_temp);
    let (max_w, max_h) = measure(FontSlot::Temp, palette.max_temp.bold, &max_text)?;

    let icon = weather.icon.as_ref().map(|_| {
        let height = max_h + ICON_MARGIN;
        IconPlacement {
            centre_x: xc,
            // centre the icon on the text block
            top: y - max_h as i32 / 2 - (height / 2) as i32,
            height,
            greyscale: mode == Mode::Ambient,
            smooth: palette.max_temp.anti_alias
        }
    });

    // without an icon the temperatures close ranks around the centre
    let half_span = icon.as_ref()
        .map(|i| (i.height / 2) as i32 + TEMP_GAP)
        .unwrap_or(TEMP_GAP);

    runs.push(TextRun {
        kind: ElementKind::MaxTemp,
        text: max_text,
        origin: Point::new(xc - half_span - max_w, y),
        style: palette.max_temp,
        font: FontSlot::Temp
    });
    runs.push(TextRun {
        kind: ElementKind::MinTemp,
        text: min_text,
        origin: Point::new(xc + half_span, y),
        style: palette.min_temp,
        font: FontSlot::Temp
    });

    Ok(FaceLayout {
        background: palette.background,
        runs,
        divider: Some(divider),
        icon
    })
}

/// Scaled (and possibly desaturated) icon, cached so a frame-per-minute
/// face does not resize the same bitmap over and over.
struct ScaledIcon {
    generation: u64,
    height: u32,
    greyscale: bool,
    smooth: bool,
    bitmap: IconBitmap
}

/// The watch face screen: holds the view state synced from [`FaceState`]
/// and renders one frame per draw call.
pub struct FaceScreen {
    theme: ThemeConfig,
    metrics: FaceMetrics,
    locale: Box<dyn LocaleProvider>,
    formats: ClockFormats,
    palette: Palette,
    mode: Mode,
    peek_card: Option<u32>,
    weather: WeatherSnapshot,
    icon_cache: RefCell<Option<ScaledIcon>>
}

impl FaceScreen {
    pub fn new(config: &Config, locale: Box<dyn LocaleProvider>) -> Self {
        let theme = config.theme.clone();
        let palette = Palette::resolve(
            &theme, Mode::Interactive, false, false, false
        );

        Self {
            theme,
            metrics: config.display.metrics(),
            locale,
            formats: ClockFormats::new(),
            palette,
            mode: Mode::Interactive,
            peek_card: None,
            weather: WeatherSnapshot::default(),
            icon_cache: RefCell::new(None)
        }
    }

    /// Mirror the pieces of face state the composer reads.
    pub fn sync(&mut self, state: &FaceState) {
        self.mode = state.mode;
        self.peek_card = state.peek_card;
        self.weather = state.weather.clone();
    }

    /// Recompute every paint from the current state. Applied as a whole;
    /// see [`Palette::resolve`].
    pub fn resolve_palette(&mut self, state: &FaceState) {
        self.palette = Palette::resolve(
            &self.theme,
            state.mode,
            state.muted,
            state.low_bit_ambient,
            state.burn_in_protection
        );
    }

    pub fn refresh_formats(&mut self) {
        self.formats.refresh();
    }

    fn scaled_icon(&self, source: &IconBitmap, placement: &IconPlacement) -> IconBitmap {
        let mut cache = self.icon_cache.borrow_mut();

        let stale = match cache.as_ref() {
            Some(c) => {
                c.generation != self.weather.icon_generation
                    || c.height != placement.height
                    || c.greyscale != placement.greyscale
                    || c.smooth != placement.smooth
            }
            None => true
        };

        if stale {
            let mut bitmap = source.scaled(placement.height, placement.smooth);
            if placement.greyscale {
                bitmap = bitmap.greyscale();
            }
            *cache = Some(ScaledIcon {
                generation: self.weather.icon_generation,
                height: placement.height,
                greyscale: placement.greyscale,
                smooth: placement.smooth,
                bitmap
            });
        }

        cache.as_ref().map(|c| c.bitmap.clone()).unwrap_or_else(|| source.clone())
    }
}

impl AppDrawable for FaceScreen {
    fn draw(&self, target: &mut AppFrameBuf) -> Result<()> {
        let snapshot = ClockSnapshot::now();
        // the hour style is host state; never cached across frames
        let use_24_hour = self.locale.use_24_hour();

        let layout = compose(
            &snapshot,
            use_24_hour,
            &self.formats,
            &self.palette,
            &self.metrics,
            &self.weather,
            self.mode,
            self.peek_card
        )?;

        let background = layout.background.colour;
        target.clear(background)?;

        for run in &layout.runs {
            let colour = run.style.effective_colour(background);
            fonts::renderer(run.font, run.style.bold)
                .render_aligned(
                    run.text.as_str(),
                    run.origin,
                    VerticalPosition::Baseline,
                    HorizontalAlignment::Left,
                    FontColor::Transparent(colour),
                    target
                )
                .map_err(|e| anyhow!("Text render failed: {:?}", e))?;
        }

        if let Some(divider) = &layout.divider {
            let colour = divider.style.effective_colour(background);
            Line::new(divider.start, divider.end)
                .into_styled(PrimitiveStyle::with_stroke(colour, 1))
                .draw(target)?;
        }

        if let (Some(placement), Some(source)) = (&layout.icon, &self.weather.icon) {
            let bitmap = self.scaled_icon(source, placement);
            let top_left = Point::new(
                placement.centre_x - bitmap.width() as i32 / 2,
                placement.top
            );
            bitmap.draw(target, top_left)?;
        }

        Ok(())
    }
}
