use kurbo::Rect;

use crate::assets::font::FontFace;
use crate::data::palette::TeamColors;
use crate::data::ranking::YearRanking;
use crate::data::table::LogoIndex;
use crate::foundation::core::Canvas;
use crate::foundation::error::{RaceError, RaceResult};
use crate::render::frame::FrameRGBA;
use crate::render::layout::{AxisScale, ChartLayout};
use crate::render::logo::{LogoCache, LogoPolicy};
use crate::render::text::TextPainter;

/// Look of every frame in a race.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartStyle {
    pub canvas: Canvas,
    /// Straight-alpha RGBA8.
    pub background: [u8; 4],
    /// Axis, label and year color (straight-alpha RGBA8).
    pub foreground: [u8; 4],
    pub axis: AxisScale,
}

/// Draws ranked bar chart frames on the CPU.
///
/// Text is skipped when no font is available; bars, axes and logos are always drawn.
pub struct ChartRenderer {
    style: ChartStyle,
    width: u16,
    height: u16,
    text: Option<TextPainter>,
    logos: LogoCache,
    ctx: Option<vello_cpu::RenderContext>,
}

impl ChartRenderer {
    pub fn new(style: ChartStyle, font: Option<&FontFace>, policy: LogoPolicy) -> RaceResult<Self> {
        let width: u16 = style
            .canvas
            .width
            .try_into()
            .map_err(|_| RaceError::render("chart width exceeds u16"))?;
        let height: u16 = style
            .canvas
            .height
            .try_into()
            .map_err(|_| RaceError::render("chart height exceeds u16"))?;
        let text = font.map(TextPainter::new).transpose()?;
        match &text {
            Some(painter) => tracing::debug!(family = painter.family(), "chart text enabled"),
            None => tracing::warn!("no font available; frames will be rendered without text"),
        }
        Ok(Self {
            style,
            width,
            height,
            text,
            logos: LogoCache::new(policy),
            ctx: None,
        })
    }

    /// Geometry used for `ranking`, including the team-name column.
    pub fn layout_for(&mut self, ranking: &YearRanking) -> RaceResult<ChartLayout> {
        let base = ChartLayout::new(self.style.canvas, ranking.len(), self.style.axis);
        let Some(text) = self.text.as_mut() else {
            return Ok(base);
        };
        let size = base.label_font_px();
        let mut widest = 0.0f64;
        for entry in &ranking.entries {
            widest = widest.max(text.layout(&entry.team, size, self.style.foreground)?.width());
        }
        Ok(base.with_label_width(widest))
    }

    /// Render one frame for `ranking`.
    #[tracing::instrument(skip_all, fields(year = ranking.year))]
    pub fn render(
        &mut self,
        ranking: &YearRanking,
        colors: &TeamColors,
        logos: &LogoIndex,
    ) -> RaceResult<FrameRGBA> {
        let layout = self.layout_for(ranking)?;
        let (width, height) = (self.width, self.height);

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let drawn = self.draw_chart(&mut ctx, &layout, ranking, colors, logos);
        let frame = drawn.map(|()| {
            let mut pixmap = vello_cpu::Pixmap::new(width, height);
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            FrameRGBA {
                width: u32::from(width),
                height: u32::from(height),
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            }
        });
        self.ctx = Some(ctx);
        frame
    }

    fn draw_chart(
        &mut self,
        ctx: &mut vello_cpu::RenderContext,
        layout: &ChartLayout,
        ranking: &YearRanking,
        colors: &TeamColors,
        logos: &LogoIndex,
    ) -> RaceResult<()> {
        let fg = self.style.foreground;
        let canvas = Rect::new(
            0.0,
            0.0,
            f64::from(self.style.canvas.width),
            f64::from(self.style.canvas.height),
        );
        fill(ctx, canvas, self.style.background);

        self.draw_axes(ctx, layout)?;

        let lw = layout.line_width();
        let logo_box = layout.logo_box_px();
        for (row, entry) in ranking.entries.iter().enumerate() {
            let cy = layout.row_center_y(row);

            // Left spine tick and team name.
            let tick_x0 = layout.plot.x0 - layout.tick_len();
            fill(
                ctx,
                Rect::new(tick_x0, cy - lw / 2.0, layout.plot.x0, cy + lw / 2.0),
                fg,
            );
            if let Some(text) = self.text.as_mut() {
                let label = text.layout(&entry.team, layout.label_font_px(), fg)?;
                let x = tick_x0 - layout.gap() - label.width();
                text.draw(ctx, &label, x, cy - label.height() / 2.0);
            }

            if entry.count == 0 {
                continue;
            }

            let color = colors.get(&entry.team).unwrap_or(fg);
            let bar = layout.bar_rect(row, entry.count);
            fill(ctx, bar, color);

            let mut x = bar.x1 + layout.gap();
            let logo = self
                .logos
                .get(&entry.team, logos.get(&entry.team), logo_box)?;
            if let Some(logo) = logo {
                let (w, h) = (f64::from(logo.width), f64::from(logo.height));
                let y = (cy - h / 2.0).round();
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_transform(vello_cpu::kurbo::Affine::translate((x.round(), y)));
                ctx.set_paint(logo.image);
                ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                x += w + layout.gap();
            }

            if let Some(text) = self.text.as_mut() {
                let count = text.layout(&entry.count.to_string(), layout.count_font_px(), fg)?;
                text.draw(ctx, &count, x, cy - count.height() / 2.0);
            }
        }

        if let Some(text) = self.text.as_mut() {
            let year = text.layout(&ranking.year.to_string(), layout.year_font_px(), fg)?;
            let (right, bottom) = layout.year_anchor();
            text.draw(ctx, &year, right - year.width(), bottom - year.height());
        }

        Ok(())
    }

    /// Top value axis with ticks and labels, plus the left spine.
    fn draw_axes(&mut self, ctx: &mut vello_cpu::RenderContext, layout: &ChartLayout) -> RaceResult<()> {
        let fg = self.style.foreground;
        let lw = layout.line_width();
        let plot = layout.plot;

        fill(ctx, Rect::new(plot.x0 - lw, plot.y0 - lw, plot.x1, plot.y0), fg);
        fill(ctx, Rect::new(plot.x0 - lw, plot.y0 - lw, plot.x0, plot.y1), fg);

        for value in layout.axis.ticks() {
            let x = layout.x_for(value);
            let tick_top = plot.y0 - lw - layout.tick_len();
            fill(ctx, Rect::new(x - lw / 2.0, tick_top, x + lw / 2.0, plot.y0), fg);

            if let Some(text) = self.text.as_mut() {
                let label = text.layout(&format_tick(value), layout.tick_font_px(), fg)?;
                text.draw(
                    ctx,
                    &label,
                    x - label.width() / 2.0,
                    tick_top - layout.gap() / 2.0 - label.height(),
                );
            }
        }
        Ok(())
    }
}

fn fill(ctx: &mut vello_cpu::RenderContext, rect: Rect, rgba: [u8; 4]) {
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return;
    }
    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
        rgba[0], rgba[1], rgba[2], rgba[3],
    ));
    ctx.fill_rect(&rect_to_cpu(rect));
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_labels_drop_trailing_zeroes() {
        assert_eq!(format_tick(0.0), "0");
        assert_eq!(format_tick(25.0), "25");
        assert_eq!(format_tick(2.5), "2.5");
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let style = ChartStyle {
            canvas: Canvas::new(70_000, 100).unwrap(),
            background: [255; 4],
            foreground: [0, 0, 0, 255],
            axis: AxisScale::fixed(10.0).unwrap(),
        };
        assert!(ChartRenderer::new(style, None, LogoPolicy::Skip).is_err());
    }
}
