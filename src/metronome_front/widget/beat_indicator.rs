use iced::{
    mouse::Cursor,
    widget::canvas::{Frame, Geometry, Path, Program},
    Point, Rectangle, Renderer, Theme,
};

const RADIUS: f32 = 5.0;

/// one dot per pulse of a beat, the first one being the beat itself
#[derive(Clone, Copy, Debug)]
pub struct BeatIndicator {
    pub pulses: u8,
    pub current: Option<u8>,
}

impl<Message> Program<Message> for BeatIndicator {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let palette = theme.extended_palette();

        let step = bounds.width / f32::from(self.pulses.max(1));
        let y = bounds.height / 2.0;

        for pulse in 0..self.pulses {
            let radius = if pulse == 0 { RADIUS * 1.5 } else { RADIUS };
            let color = if self.current == Some(pulse) {
                palette.primary.strong.color
            } else {
                palette.background.strong.color
            };

            let x = step.mul_add(f32::from(pulse), step / 2.0);
            frame.fill(&Path::circle(Point::new(x, y), radius), color);
        }

        vec![frame.into_geometry()]
    }
}
