mod beat_indicator;
pub use beat_indicator::BeatIndicator;

mod draggable;
pub use draggable::Draggable;

mod glyph;
pub use glyph::PlaybackGlyph;

mod on_press;
pub use on_press::OnPress;
