/// Color parsing and HSV/HSL conversion.
pub mod color;
/// Logo image decoding and thumbnailing.
pub mod decode;
/// Font discovery for chart text.
pub mod font;
