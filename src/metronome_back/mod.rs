mod click_sound;
pub use click_sound::ClickSound;

mod live_sample;
pub use live_sample::LiveSample;

mod metronome;
pub use metronome::{Metronome, Playback, Ticker};

mod tempo;
pub use tempo::{Bpm, Subdivision};

use crate::helpers::NoDebug;
use anyhow::{anyhow, Context as _, Result};
use async_channel::{Receiver, Sender};
use cpal::{
    traits::{DeviceTrait as _, HostTrait as _, StreamTrait as _},
    Device, OutputCallbackInfo, Stream, StreamConfig,
};
use log::{error, info, warn};
use std::{num::NonZeroUsize, path::Path, sync::Arc};

/// how many clicks may be queued before the audio thread picks them up
const TRIGGER_QUEUE: usize = 16;

/// plays the click on the audio output, or nothing if the output couldn't be opened
#[derive(Debug)]
pub struct ClickPlayer {
    output: Option<Output>,
}

#[derive(Debug)]
struct Output {
    click: Arc<[f32]>,
    trigger: Sender<Arc<[f32]>>,
    _stream: NoDebug<Stream>,
}

impl ClickPlayer {
    /// loads the click once; falls back to the bundled click if `click_sound` can't be used
    #[must_use]
    pub fn new(click_sound: Option<&Path>, output_device: Option<&str>, volume: f32) -> Self {
        let output = load_click(click_sound)
            .and_then(|click| open_output(click, output_device, clamp_volume(volume)));

        match output {
            Ok(output) => Self {
                output: Some(output),
            },
            Err(err) => {
                warn!("continuing without sound: {err:#}");
                Self::silent()
            }
        }
    }

    #[must_use]
    pub fn silent() -> Self {
        Self { output: None }
    }

    #[cfg(test)]
    pub fn is_silent(&self) -> bool {
        self.output.is_none()
    }

    /// never blocks; the click is dropped if the audio thread is too far behind
    pub fn play(&self) {
        if let Some(output) = &self.output {
            _ = output.trigger.try_send(output.click.clone());
        }
    }
}

/// keeps `volume` within 0.0 and 1.0, NaN meaning full volume
#[must_use]
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        1.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

fn load_click(path: Option<&Path>) -> Result<ClickSound> {
    if let Some(path) = path {
        match ClickSound::from_path(path) {
            Ok(click) => return Ok(click),
            Err(err) => warn!("using the bundled click instead: {err:#}"),
        }
    }

    ClickSound::bundled()
}

fn find_device(name: Option<&str>) -> Result<Device> {
    let host = cpal::default_host();

    if let Some(name) = name {
        if let Some(device) = host
            .output_devices()?
            .find(|device| device.name().is_ok_and(|n| n == name))
        {
            return Ok(device);
        }

        warn!("output device {name:?} not found, using the default one");
    }

    host.default_output_device()
        .ok_or_else(|| anyhow!("no output device available"))
}

fn open_output(click: ClickSound, device_name: Option<&str>, volume: f32) -> Result<Output> {
    let device = find_device(device_name)?;
    let config: StreamConfig = device
        .default_output_config()
        .context("failed to query the output config")?
        .into();

    let channels = NonZeroUsize::new(usize::from(config.channels))
        .ok_or_else(|| anyhow!("output device has no channels"))?;

    let click: Arc<[f32]> = click.prepare(config.sample_rate.0, volume)?.into();
    let (trigger, receiver) = async_channel::bounded(TRIGGER_QUEUE);

    let stream = build_output_stream(&device, &config, channels, receiver)?;
    stream.play().context("failed to start the output stream")?;

    info!(
        "playing clicks on {:?} at {}Hz with {channels} channels",
        device.name().unwrap_or_default(),
        config.sample_rate.0
    );

    Ok(Output {
        click,
        trigger,
        _stream: stream.into(),
    })
}

pub fn build_output_stream(
    device: &Device,
    config: &StreamConfig,
    channels: NonZeroUsize,
    receiver: Receiver<Arc<[f32]>>,
) -> Result<Stream> {
    let mut voices = Vec::<LiveSample>::with_capacity(TRIGGER_QUEUE);

    device
        .build_output_stream(
            config,
            move |data: &mut [f32], _: &OutputCallbackInfo| {
                data.fill(0.0);

                while let Ok(click) = receiver.try_recv() {
                    voices.push(LiveSample::new(click));
                }

                for voice in &mut voices {
                    voice.fill_buf(data, channels);
                }

                voices.retain(|voice| !voice.over());
            },
            |err| error!("output stream error: {err}"),
            None,
        )
        .context("failed to build the output stream")
}
