use kurbo::Rect;

use crate::foundation::core::Canvas;
use crate::foundation::error::{RaceError, RaceResult};

/// Fraction of a row filled by its bar.
pub const BAR_FILL: f64 = 0.8;

/// Value axis shared by every frame of a race.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct AxisScale {
    pub max: f64,
    pub step: f64,
}

impl AxisScale {
    /// Axis ending exactly at `max`.
    pub fn fixed(max: f64) -> RaceResult<Self> {
        if !max.is_finite() || max <= 0.0 {
            return Err(RaceError::validation("axis max must be finite and > 0"));
        }
        Ok(Self {
            max,
            step: nice_step(max),
        })
    }

    /// Axis wide enough for `max_count` plus room for the logo and count label past the bar.
    pub fn for_max_count(max_count: u32) -> Self {
        let c = f64::from(max_count);
        let target = (c * 1.25).max(c + 2.0).max(5.0);
        let step = nice_step(target);
        Self {
            max: (target / step).ceil() * step,
            step,
        }
    }

    /// Tick values from 0 through `max`.
    pub fn ticks(&self) -> Vec<f64> {
        let n = (self.max / self.step + 1e-9).floor() as usize;
        (0..=n).map(|i| i as f64 * self.step).collect()
    }
}

/// 1, 2 or 5 times a power of ten giving at most about six intervals; never below 1.
fn nice_step(max: f64) -> f64 {
    let raw = max / 6.0;
    if raw <= 1.0 {
        return 1.0;
    }
    let mag = 10f64.powf(raw.log10().floor());
    let norm = raw / mag;
    let unit = if norm <= 1.0 {
        1.0
    } else if norm <= 2.0 {
        2.0
    } else if norm <= 5.0 {
        5.0
    } else {
        10.0
    };
    unit * mag
}

/// Pixel geometry of one chart frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartLayout {
    pub canvas: Canvas,
    /// Area spanned by the bars; the value axis runs along its top edge.
    pub plot: Rect,
    pub rows: usize,
    pub axis: AxisScale,
    /// Outer margin, tick mark length and line width all derive from this.
    pub unit: f64,
}

impl ChartLayout {
    /// Vertical geometry for `rows` bars; the plot starts at the left margin until
    /// [`ChartLayout::with_label_width`] reserves space for team names.
    pub fn new(canvas: Canvas, rows: usize, axis: AxisScale) -> Self {
        let w = f64::from(canvas.width);
        let h = f64::from(canvas.height);
        let unit = h / 1080.0;
        let margin = 24.0 * unit;
        let top = margin + tick_font_px_for(unit) * 1.6 + tick_len_for(unit);
        Self {
            canvas,
            plot: Rect::new(margin, top, w - margin, h - margin),
            rows,
            axis,
            unit,
        }
    }

    /// Move the plot's left edge right of a label column `label_width` pixels wide.
    ///
    /// The plot keeps at least a third of the canvas width.
    pub fn with_label_width(mut self, label_width: f64) -> Self {
        let margin = 24.0 * self.unit;
        let wanted = margin + label_width.max(0.0) + self.gap() + self.tick_len();
        let max_left = self.plot.x1 - f64::from(self.canvas.width) / 3.0;
        self.plot.x0 = wanted.min(max_left).max(margin);
        self
    }

    pub fn row_pitch(&self) -> f64 {
        self.plot.height() / self.rows.max(1) as f64
    }

    pub fn row_center_y(&self, row: usize) -> f64 {
        self.plot.y0 + (row as f64 + 0.5) * self.row_pitch()
    }

    pub fn bar_height(&self) -> f64 {
        self.row_pitch() * BAR_FILL
    }

    pub fn x_for(&self, value: f64) -> f64 {
        let t = (value / self.axis.max).clamp(0.0, 1.0);
        self.plot.x0 + t * self.plot.width()
    }

    pub fn bar_rect(&self, row: usize, count: u32) -> Rect {
        let cy = self.row_center_y(row);
        let half = self.bar_height() / 2.0;
        Rect::new(self.plot.x0, cy - half, self.x_for(f64::from(count)), cy + half)
    }

    /// Square box a logo thumbnail must fit in, in whole pixels.
    pub fn logo_box_px(&self) -> u32 {
        self.bar_height().floor().max(1.0) as u32
    }

    pub fn label_font_px(&self) -> f32 {
        (self.row_pitch() * 0.5).min(26.0 * self.unit).max(6.0) as f32
    }

    pub fn count_font_px(&self) -> f32 {
        (self.row_pitch() * 0.55).min(28.0 * self.unit).max(6.0) as f32
    }

    pub fn tick_font_px(&self) -> f32 {
        tick_font_px_for(self.unit) as f32
    }

    pub fn year_font_px(&self) -> f32 {
        (100.0 * self.unit).max(12.0) as f32
    }

    pub fn tick_len(&self) -> f64 {
        tick_len_for(self.unit)
    }

    pub fn line_width(&self) -> f64 {
        (1.5 * self.unit).max(1.0)
    }

    /// Horizontal space between neighbouring annotations.
    pub fn gap(&self) -> f64 {
        (8.0 * self.unit).max(2.0)
    }

    /// Bottom-right anchor for the year label.
    pub fn year_anchor(&self) -> (f64, f64) {
        (
            self.plot.x1 - 0.05 * self.plot.width(),
            self.plot.y1 - 0.05 * self.plot.height(),
        )
    }
}

fn tick_font_px_for(unit: f64) -> f64 {
    (20.0 * unit).max(6.0)
}

fn tick_len_for(unit: f64) -> f64 {
    (8.0 * unit).max(2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_thirty_ticks_every_five() {
        let axis = AxisScale::fixed(30.0).unwrap();
        assert_eq!(axis.step, 5.0);
        assert_eq!(axis.ticks(), vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
        assert!(AxisScale::fixed(0.0).is_err());
        assert!(AxisScale::fixed(f64::NAN).is_err());
    }

    #[test]
    fn derived_axis_leaves_headroom() {
        let axis = AxisScale::for_max_count(17);
        assert!(axis.max >= 17.0 * 1.25);
        assert_eq!(axis.max % axis.step, 0.0);

        let tiny = AxisScale::for_max_count(1);
        assert_eq!(tiny.step, 1.0);
        assert_eq!(tiny.max, 5.0);

        let big = AxisScale::for_max_count(400);
        assert_eq!(big.step, 100.0);
        assert_eq!(big.max, 500.0);
    }

    #[test]
    fn rows_split_the_plot_evenly() {
        let canvas = Canvas::new(1920, 1080).unwrap();
        let layout = ChartLayout::new(canvas, 4, AxisScale::fixed(30.0).unwrap());
        let pitch = layout.row_pitch();
        assert!((layout.row_center_y(1) - layout.row_center_y(0) - pitch).abs() < 1e-9);
        assert!((layout.bar_height() - pitch * BAR_FILL).abs() < 1e-9);
        assert!(layout.row_center_y(3) < layout.plot.y1);
    }

    #[test]
    fn bars_scale_with_count_and_clamp_at_axis_max() {
        let canvas = Canvas::new(1000, 500).unwrap();
        let layout = ChartLayout::new(canvas, 2, AxisScale::fixed(10.0).unwrap())
            .with_label_width(100.0);

        let zero = layout.bar_rect(0, 0);
        assert_eq!(zero.width(), 0.0);

        let half = layout.bar_rect(0, 5);
        assert!((half.width() - layout.plot.width() / 2.0).abs() < 1e-9);

        let over = layout.bar_rect(1, 50);
        assert!((over.x1 - layout.plot.x1).abs() < 1e-9);
    }

    #[test]
    fn label_column_is_capped() {
        let canvas = Canvas::new(900, 300).unwrap();
        let layout = ChartLayout::new(canvas, 3, AxisScale::fixed(10.0).unwrap())
            .with_label_width(10_000.0);
        assert!(layout.plot.width() >= 900.0 / 3.0 - 1e-9);
    }
}
