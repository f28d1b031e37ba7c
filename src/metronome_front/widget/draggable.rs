use crate::helpers::NoDebug;
use iced::{
    advanced::{
        layout::{Limits, Node},
        overlay,
        renderer::Style,
        widget::{tree, Operation, Tree},
        Clipboard, Layout, Shell, Widget,
    },
    event::Status,
    mouse::{self, Cursor, Interaction},
    window::RedrawRequest,
    Element, Event, Length, Point, Rectangle, Renderer, Size, Theme, Vector,
};

#[derive(Default)]
struct State {
    offset: Vector,
    /// where the card was grabbed, relative to its resting position
    grabbed_at: Option<Point>,
}

/// lets its child be dragged around by any part that doesn't handle the press itself
#[derive(Debug)]
pub struct Draggable<'a, Message> {
    content: NoDebug<Element<'a, Message>>,
    enabled: bool,
}

impl<'a, Message> Draggable<'a, Message> {
    pub fn new(content: impl Into<Element<'a, Message>>) -> Self {
        Self {
            content: content.into().into(),
            enabled: true,
        }
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl<Message> Widget<Message, Theme, Renderer> for Draggable<'_, Message> {
    fn size(&self) -> Size<Length> {
        Size::new(Length::Fill, Length::Fill)
    }

    fn tag(&self) -> tree::Tag {
        tree::Tag::of::<State>()
    }

    fn state(&self) -> tree::State {
        tree::State::new(State::default())
    }

    fn children(&self) -> Vec<Tree> {
        vec![Tree::new(&*self.content)]
    }

    fn diff(&self, tree: &mut Tree) {
        tree.diff_children(&[&*self.content]);
    }

    fn layout(&self, tree: &mut Tree, renderer: &Renderer, limits: &Limits) -> Node {
        let max = limits.max();

        let content = self.content.as_widget().layout(
            &mut tree.children[0],
            renderer,
            &Limits::new(Size::ZERO, max),
        );

        // also pulls the card back in after the window shrinks
        let state = tree.state.downcast_mut::<State>();
        state.offset = clamp_offset(state.offset, content.bounds(), max);

        Node::with_children(max, vec![content.translate(state.offset)])
    }

    fn operate(
        &self,
        tree: &mut Tree,
        layout: Layout<'_>,
        renderer: &Renderer,
        operation: &mut dyn Operation,
    ) {
        self.content.as_widget().operate(
            &mut tree.children[0],
            layout.children().next().unwrap(),
            renderer,
            operation,
        );
    }

    fn on_event(
        &mut self,
        tree: &mut Tree,
        event: Event,
        layout: Layout<'_>,
        cursor: Cursor,
        renderer: &Renderer,
        clipboard: &mut dyn Clipboard,
        shell: &mut Shell<'_, Message>,
        viewport: &Rectangle,
    ) -> Status {
        let content_layout = layout.children().next().unwrap();

        if self.content.as_widget_mut().on_event(
            &mut tree.children[0],
            event.clone(),
            content_layout,
            cursor,
            renderer,
            clipboard,
            shell,
            viewport,
        ) == Status::Captured
        {
            return Status::Captured;
        }

        let state = tree.state.downcast_mut::<State>();

        if !self.enabled {
            state.grabbed_at = None;
            return Status::Ignored;
        }

        if let Event::Mouse(event) = event {
            match event {
                mouse::Event::ButtonPressed(mouse::Button::Left) => {
                    if let Some(position) = cursor.position_over(content_layout.bounds()) {
                        state.grabbed_at = Some(position - state.offset);
                        return Status::Captured;
                    }
                }
                mouse::Event::CursorMoved { position } => {
                    if let Some(grabbed_at) = state.grabbed_at {
                        state.offset = position - grabbed_at;
                        shell.invalidate_layout();
                        shell.request_redraw(RedrawRequest::NextFrame);
                        return Status::Captured;
                    }
                }
                mouse::Event::ButtonReleased(mouse::Button::Left) => {
                    if state.grabbed_at.take().is_some() {
                        return Status::Captured;
                    }
                }
                _ => {}
            }
        }

        Status::Ignored
    }

    fn draw(
        &self,
        tree: &Tree,
        renderer: &mut Renderer,
        theme: &Theme,
        style: &Style,
        layout: Layout<'_>,
        cursor: Cursor,
        viewport: &Rectangle,
    ) {
        self.content.as_widget().draw(
            &tree.children[0],
            renderer,
            theme,
            style,
            layout.children().next().unwrap(),
            cursor,
            viewport,
        );
    }

    fn mouse_interaction(
        &self,
        tree: &Tree,
        layout: Layout<'_>,
        cursor: Cursor,
        viewport: &Rectangle,
        renderer: &Renderer,
    ) -> Interaction {
        if tree.state.downcast_ref::<State>().grabbed_at.is_some() {
            return Interaction::Grabbing;
        }

        let content_layout = layout.children().next().unwrap();
        let interaction = self.content.as_widget().mouse_interaction(
            &tree.children[0],
            content_layout,
            cursor,
            viewport,
            renderer,
        );

        if interaction == Interaction::default()
            && self.enabled
            && cursor.is_over(content_layout.bounds())
        {
            Interaction::Grab
        } else {
            interaction
        }
    }

    fn overlay<'b>(
        &'b mut self,
        tree: &'b mut Tree,
        layout: Layout<'_>,
        renderer: &Renderer,
        translation: Vector,
    ) -> Option<overlay::Element<'b, Message, Theme, Renderer>> {
        self.content.as_widget_mut().overlay(
            &mut tree.children[0],
            layout.children().next()?,
            renderer,
            translation,
        )
    }
}

/// the offset closest to `offset` that keeps all of `content` inside `bounds`
fn clamp_offset(offset: Vector, content: Rectangle, bounds: Size) -> Vector {
    let min_x = -content.x;
    let max_x = (bounds.width - content.x - content.width).max(min_x);
    let min_y = -content.y;
    let max_y = (bounds.height - content.y - content.height).max(min_y);

    Vector::new(offset.x.clamp(min_x, max_x), offset.y.clamp(min_y, max_y))
}

impl<'a, Message> From<Draggable<'a, Message>> for Element<'a, Message>
where
    Message: 'a,
{
    fn from(value: Draggable<'a, Message>) -> Self {
        Self::new(value)
    }
}
