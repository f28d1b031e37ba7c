use anyhow::{anyhow, Context as _, Result};
use log::{debug, info};
use rubato::{
    Resampler as _, SincFixedIn, SincInterpolationParameters, SincInterpolationType,
    WindowFunction,
};
use std::{fs::File, io::Cursor, path::Path};
use symphonia::core::{
    audio::SampleBuffer,
    codecs::DecoderOptions,
    errors::Error,
    formats::FormatOptions,
    io::{MediaSource, MediaSourceStream, MediaSourceStreamOptions},
    meta::MetadataOptions,
    probe::Hint,
};

static BUNDLED_CLICK: &[u8] = include_bytes!("../../assets/metronome.wav");

/// a decoded click, down-mixed to mono
#[derive(Clone, Debug)]
pub struct ClickSound {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl ClickSound {
    pub fn bundled() -> Result<Self> {
        let mut hint = Hint::new();
        hint.with_extension("wav");

        Self::decode(Box::new(Cursor::new(BUNDLED_CLICK)), &hint)
            .context("failed to decode the bundled click sound")
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(extension);
        }

        Self::decode(Box::new(file), &hint)
            .with_context(|| format!("failed to decode {}", path.display()))
    }

    pub fn decode(source: Box<dyn MediaSource>, hint: &Hint) -> Result<Self> {
        let mut format = symphonia::default::get_probe()
            .format(
                hint,
                MediaSourceStream::new(source, MediaSourceStreamOptions::default()),
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )?
            .format;

        let track = format
            .default_track()
            .ok_or_else(|| anyhow!("no audio track"))?;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| anyhow!("unknown sample rate"))?;
        let track_id = track.id;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())?;

        let mut samples = Vec::new();
        let mut sample_buffer = None;

        while let Ok(packet) = format.next_packet() {
            if packet.track_id() != track_id {
                continue;
            }

            match decoder.decode(&packet) {
                Ok(audio_buf) => {
                    let spec = *audio_buf.spec();
                    let channels = spec.channels.count().max(1);

                    let buf = sample_buffer.get_or_insert_with(|| {
                        SampleBuffer::<f32>::new(audio_buf.capacity() as u64, spec)
                    });
                    buf.copy_interleaved_ref(audio_buf);

                    samples.extend(
                        buf.samples()
                            .chunks_exact(channels)
                            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                    );
                }
                Err(Error::DecodeError(err)) => debug!("skipping undecodable packet: {err}"),
                Err(err) => return Err(err.into()),
            }
        }

        if samples.is_empty() {
            return Err(anyhow!("no samples were decoded"));
        }

        info!("decoded click: {} samples at {sample_rate}Hz", samples.len());

        Ok(Self {
            samples,
            sample_rate,
        })
    }

    #[cfg(test)]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[cfg(test)]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// converts the click to `sample_rate` and scales it by `volume`
    pub fn prepare(self, sample_rate: u32, volume: f32) -> Result<Vec<f32>> {
        let mut samples = resample(self.sample_rate, sample_rate, self.samples)?;
        samples.iter_mut().for_each(|s| *s *= volume);
        Ok(samples)
    }
}

pub fn resample(from: u32, to: u32, samples: Vec<f32>) -> Result<Vec<f32>> {
    if from == to || samples.is_empty() {
        return Ok(samples);
    }

    let mut resampler = SincFixedIn::<f32>::new(
        f64::from(to) / f64::from(from),
        2.0,
        SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 128,
            window: WindowFunction::Blackman,
        },
        samples.len(),
        1,
    )?;

    let mut resampled = resampler.process(&[samples], None)?;

    Ok(resampled.pop().unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn wav(channels: u16, sample_rate: u32, frames: &[&[i16]]) -> Vec<u8> {
        let mut bytes = Cursor::new(Vec::new());

        let mut writer = WavWriter::new(
            &mut bytes,
            WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        )
        .unwrap();

        for frame in frames {
            for s in *frame {
                writer.write_sample(*s).unwrap();
            }
        }

        writer.finalize().unwrap();
        bytes.into_inner()
    }

    fn decode(bytes: Vec<u8>) -> Result<ClickSound> {
        let mut hint = Hint::new();
        hint.with_extension("wav");
        ClickSound::decode(Box::new(Cursor::new(bytes)), &hint)
    }

    #[test]
    fn bundled_click_decodes() {
        let click = ClickSound::bundled().unwrap();

        assert_eq!(click.sample_rate(), 44100);
        assert!(!click.samples().is_empty());
        assert!(click.samples().iter().all(|s| s.abs() <= 1.0));
        assert!(click.samples().iter().any(|s| s.abs() > 0.1));
    }

    #[test]
    fn stereo_is_averaged_to_mono() {
        let bytes = wav(
            2,
            48000,
            &[&[16384, 0], &[-16384, -16384], &[8192, 24576]],
        );

        let click = decode(bytes).unwrap();

        assert_eq!(click.sample_rate(), 48000);
        assert_eq!(click.samples(), [0.25, -0.5, 0.5]);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(decode(b"definitely not a wave file".to_vec()).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(ClickSound::from_path(Path::new("/nonexistent/click.wav")).is_err());
    }

    #[test]
    fn same_rate_is_untouched() {
        let samples = vec![0.5, -0.5, 0.25];

        assert_eq!(resample(44100, 44100, samples.clone()).unwrap(), samples);
        assert!(resample(44100, 48000, Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn resampling_scales_length() {
        let samples = vec![0.0; 4410];

        let resampled = resample(44100, 88200, samples).unwrap();

        assert!(resampled.len().abs_diff(8820) <= 256, "{}", resampled.len());
    }

    #[test]
    fn prepare_applies_volume() {
        let click = ClickSound {
            samples: vec![0.5, -1.0],
            sample_rate: 48000,
        };

        assert_eq!(click.prepare(48000, 0.5).unwrap(), [0.25, -0.5]);
    }
}
