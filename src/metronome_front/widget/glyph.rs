use iced::{
    mouse::Cursor,
    widget::canvas::{Frame, Geometry, Path, Program},
    Color, Point, Rectangle, Renderer, Size, Theme,
};

/// side length of the square the glyphs are designed in
const VIEW_BOX: f32 = 24.0;

const PLAY_COLOR: Color = Color::from_rgb(0.133, 0.773, 0.369);
const STOP_COLOR: Color = Color::from_rgb(0.937, 0.267, 0.267);

/// the play triangle while stopped, the stop square while running
#[derive(Clone, Copy, Debug)]
pub struct PlaybackGlyph {
    pub playing: bool,
}

impl<Message> Program<Message> for PlaybackGlyph {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());

        let scale = bounds.width.min(bounds.height) / VIEW_BOX;
        let at = |x: f32, y: f32| Point::new(x * scale, y * scale);

        if self.playing {
            frame.fill(
                &Path::rectangle(at(6.0, 6.0), Size::new(12.0 * scale, 12.0 * scale)),
                STOP_COLOR,
            );
        } else {
            let triangle = Path::new(|path| {
                path.move_to(at(8.0, 5.0));
                path.line_to(at(8.0, 19.0));
                path.line_to(at(19.0, 12.0));
                path.close();
            });

            frame.fill(&triangle, PLAY_COLOR);
        }

        vec![frame.into_geometry()]
    }
}
