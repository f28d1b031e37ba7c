use super::widget::{BeatIndicator, OnPress, PlaybackGlyph};
use crate::{
    config::Config,
    helpers::NoDebug,
    metronome_back::{Bpm, ClickPlayer, Metronome, Playback, Subdivision, Ticker},
};
use iced::{
    border,
    font::Weight,
    task,
    widget::{
        button, canvas, column, container, horizontal_space, mouse_area, pick_list, row, slider,
        text,
    },
    Alignment::Center,
    Color, Element, Font,
    Length::{Fill, Fixed},
    Shadow, Task, Theme, Vector,
};
use log::trace;
use smol::Timer;
use std::time::Duration;
use strum::VariantArray as _;

const BOLD: Font = Font {
    weight: Weight::Bold,
    ..Font::DEFAULT
};

#[derive(Clone, Copy, Debug)]
pub enum Message {
    TempoDragged(u16),
    NudgeTempo(i16),
    SetSubdivision(Subdivision),
    /// a raw multiplier, ignored unless it is 1, 2, 4 or 8
    SetSubdivisionMultiplier(u8),
    TogglePlayback,
    Tick(u64),
    SliderPressed,
    SliderReleased,
    SliderLeft,
}

/// arms timers as iced tasks, which the widget hands to the runtime after every update
#[derive(Debug, Default)]
pub struct TaskTicker {
    pending: NoDebug<Vec<Task<Message>>>,
}

impl TaskTicker {
    #[cfg(test)]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn take_pending(&mut self) -> Task<Message> {
        Task::batch(std::mem::take(&mut *self.pending))
    }
}

impl Ticker for TaskTicker {
    type Handle = NoDebug<task::Handle>;

    fn start(&mut self, generation: u64, period: Duration) -> Self::Handle {
        trace!("arming timer {generation} every {period:?}");

        let (task, handle) =
            Task::run(Timer::interval(period), move |_| Message::Tick(generation)).abortable();
        self.pending.push(task);

        handle.abort_on_drop().into()
    }
}

#[derive(Debug)]
pub struct MetronomeWidget {
    metronome: Metronome<TaskTicker>,
    player: ClickPlayer,
    slider_engaged: bool,
}

impl MetronomeWidget {
    pub fn new(config: &Config) -> Self {
        let player = ClickPlayer::new(
            config.click_sound.as_deref(),
            config.output_device.as_deref(),
            config.volume,
        );

        Self::with_player(player, config.bpm, config.subdivision)
    }

    pub fn with_player(player: ClickPlayer, bpm: Bpm, subdivision: Subdivision) -> Self {
        Self {
            metronome: Metronome::new(TaskTicker::default(), bpm, subdivision),
            player,
            slider_engaged: false,
        }
    }

    #[cfg(test)]
    pub fn metronome(&self) -> &Metronome<TaskTicker> {
        &self.metronome
    }

    pub fn bpm(&self) -> Bpm {
        self.metronome.bpm()
    }

    pub fn slider_engaged(&self) -> bool {
        self.slider_engaged
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TempoDragged(bpm) => {
                self.slider_engaged = true;
                self.metronome.set_tempo(bpm);
            }
            Message::NudgeTempo(delta) => self.metronome.nudge_tempo(delta),
            Message::SetSubdivision(subdivision) => self.metronome.set_subdivision(subdivision),
            Message::SetSubdivisionMultiplier(multiplier) => {
                self.metronome.set_subdivision_multiplier(multiplier);
            }
            Message::TogglePlayback => {
                self.metronome.toggle_playback();
            }
            Message::Tick(generation) => {
                if self.metronome.tick(generation) {
                    self.player.play();
                }
            }
            Message::SliderPressed => self.slider_engaged = true,
            Message::SliderReleased | Message::SliderLeft => self.slider_engaged = false,
        }

        self.metronome.ticker_mut().take_pending()
    }

    pub fn view(&self) -> Element<'_, Message> {
        let bpm = self.metronome.bpm();
        let subdivision = self.metronome.subdivision();

        let header = row![
            text(bpm.to_string()).size(48).font(BOLD),
            horizontal_space(),
            text("BPM").size(48).font(BOLD),
        ]
        .align_y(Center);

        let tempo = mouse_area(OnPress::new(
            slider(Bpm::RANGE, bpm.get(), Message::TempoDragged).on_release(Message::SliderReleased),
            Message::SliderPressed,
        ))
        .on_exit(Message::SliderLeft);

        let subdivisions = pick_list(
            Subdivision::VARIANTS,
            Some(subdivision),
            Message::SetSubdivision,
        )
        .text_size(20)
        .width(Fill);

        let pulses = canvas(BeatIndicator {
            pulses: subdivision.multiplier(),
            current: self.metronome.current_pulse(),
        })
        .width(Fill)
        .height(Fixed(20.0));

        let playback = button(
            canvas(PlaybackGlyph {
                playing: self.metronome.playback() == Playback::Running,
            })
            .width(Fixed(60.0))
            .height(Fixed(60.0)),
        )
        .style(button::text)
        .on_press(Message::TogglePlayback);

        container(
            column![
                header,
                tempo,
                subdivisions,
                pulses,
                container(playback).center_x(Fill)
            ]
            .spacing(20),
        )
        .padding(40)
        .width(Fixed(320.0))
        .style(card)
        .into()
    }
}

fn card(theme: &Theme) -> container::Style {
    let palette = theme.extended_palette();

    container::Style {
        text_color: Some(palette.background.base.text),
        background: Some(palette.background.weak.color.into()),
        border: border::rounded(16.0),
        shadow: Shadow {
            color: Color {
                a: 0.5,
                ..Color::BLACK
            },
            offset: Vector::new(0.0, 8.0),
            blur_radius: 24.0,
        },
    }
}
