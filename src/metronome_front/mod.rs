mod metronome_widget;
pub use metronome_widget::MetronomeWidget;

mod widget;

use crate::config::Config;
use iced::{
    keyboard::{self, key::Named, Key, Modifiers},
    widget::container,
    Element, Subscription, Task, Theme,
};
use widget::Draggable;

#[derive(Debug)]
pub struct GenericMetronome {
    metronome: MetronomeWidget,
    theme: Theme,
}

#[derive(Clone, Copy, Debug)]
pub enum Message {
    Metronome(metronome_widget::Message),
}

impl GenericMetronome {
    pub fn create(config: &Config) -> (Self, Task<Message>) {
        (
            Self {
                metronome: MetronomeWidget::new(config),
                theme: config.theme.into(),
            },
            Task::none(),
        )
    }

    pub fn title(&self) -> String {
        format!("{} BPM - Generic Metronome", self.metronome.bpm())
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Metronome(message) => self.metronome.update(message).map(Message::Metronome),
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        Draggable::new(container(self.metronome.view().map(Message::Metronome)).padding(20))
            .enabled(!self.metronome.slider_engaged())
            .into()
    }

    pub fn theme(&self) -> Theme {
        self.theme.clone()
    }

    pub fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(shortcut)
    }
}

fn shortcut(key: Key, modifiers: Modifiers) -> Option<Message> {
    if modifiers.command() || modifiers.alt() {
        return None;
    }

    let message = match key.as_ref() {
        Key::Named(Named::Space) => metronome_widget::Message::TogglePlayback,
        Key::Named(Named::ArrowUp) => metronome_widget::Message::NudgeTempo(1),
        Key::Named(Named::ArrowDown) => metronome_widget::Message::NudgeTempo(-1),
        Key::Character(c) => {
            metronome_widget::Message::SetSubdivisionMultiplier(c.parse().ok()?)
        }
        _ => return None,
    };

    Some(Message::Metronome(message))
}
