/// CPU chart renderer powered by `vello_cpu`.
pub mod cpu;
/// Frame buffers and PNG I/O.
pub mod frame;
/// Chart geometry.
pub mod layout;
/// Per-team logo thumbnails.
pub mod logo;
/// Text shaping and drawing.
pub mod text;

pub use cpu::{ChartRenderer, ChartStyle};
pub use frame::FrameRGBA;
pub use layout::{AxisScale, ChartLayout};
