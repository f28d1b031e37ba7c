mod config;
mod helpers;
mod metronome_back;
mod metronome_front;
mod theme;
mod trace;

use config::Config;
use iced::{application, Result};
use metronome_front::GenericMetronome;

fn main() -> Result {
    trace::setup();

    let config = Config::read();

    application(
        GenericMetronome::title,
        GenericMetronome::update,
        GenericMetronome::view,
    )
    .subscription(GenericMetronome::subscription)
    .theme(GenericMetronome::theme)
    .window_size((420.0, 480.0))
    .antialiasing(true)
    .run_with(move || GenericMetronome::create(&config))
}
