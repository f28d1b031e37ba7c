use super::tempo::{tick_interval, tick_interval_ms, Bpm, Subdivision};
use log::{debug, info};
use std::time::Duration;

/// starts repeating timers
///
/// dropping the returned handle must cancel the timer it belongs to
pub trait Ticker {
    type Handle;

    fn start(&mut self, generation: u64, period: Duration) -> Self::Handle;
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Playback {
    #[default]
    Stopped,
    Running,
}

#[derive(Debug)]
struct Armed<H> {
    generation: u64,
    period: Duration,
    _handle: H,
}

#[derive(Debug)]
pub struct Metronome<T: Ticker> {
    bpm: Bpm,
    subdivision: Subdivision,
    playback: Playback,
    ticker: T,
    /// the only live timer, if any
    timer: Option<Armed<T::Handle>>,
    generation: u64,
    /// ticks accepted since playback last started
    ticks: u64,
}

impl<T: Ticker> Metronome<T> {
    pub fn new(ticker: T, bpm: Bpm, subdivision: Subdivision) -> Self {
        Self {
            bpm,
            subdivision,
            playback: Playback::Stopped,
            ticker,
            timer: None,
            generation: 0,
            ticks: 0,
        }
    }

    pub fn bpm(&self) -> Bpm {
        self.bpm
    }

    pub fn subdivision(&self) -> Subdivision {
        self.subdivision
    }

    pub fn playback(&self) -> Playback {
        self.playback
    }

    pub fn is_playing(&self) -> bool {
        self.playback == Playback::Running
    }

    pub fn tick_interval_ms(&self) -> f64 {
        tick_interval_ms(self.bpm, self.subdivision)
    }

    pub fn tick_interval(&self) -> Duration {
        tick_interval(self.bpm, self.subdivision)
    }

    /// period of the currently armed timer
    #[cfg(test)]
    pub fn armed_period(&self) -> Option<Duration> {
        self.timer.as_ref().map(|armed| armed.period)
    }

    #[cfg(test)]
    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn ticker_mut(&mut self) -> &mut T {
        &mut self.ticker
    }

    pub fn set_tempo(&mut self, bpm: u16) {
        let bpm = Bpm::new(bpm);

        if bpm != self.bpm {
            self.bpm = bpm;
            self.interval_changed();
        }
    }

    pub fn nudge_tempo(&mut self, delta: i16) {
        self.set_tempo(self.bpm.saturating_add_signed(delta).get());
    }

    pub fn set_subdivision(&mut self, subdivision: Subdivision) {
        if subdivision != self.subdivision {
            self.subdivision = subdivision;
            self.interval_changed();
        }
    }

    /// returns whether `multiplier` was one of 1, 2, 4 or 8
    pub fn set_subdivision_multiplier(&mut self, multiplier: u8) -> bool {
        Subdivision::from_multiplier(multiplier).map_or_else(
            || {
                debug!("ignoring subdivision multiplier {multiplier}");
                false
            },
            |subdivision| {
                self.set_subdivision(subdivision);
                true
            },
        )
    }

    pub fn toggle_playback(&mut self) -> Playback {
        self.playback = match self.playback {
            Playback::Stopped => Playback::Running,
            Playback::Running => Playback::Stopped,
        };
        self.ticks = 0;

        info!(
            "metronome {:?} at {} bpm, {}",
            self.playback, self.bpm, self.subdivision
        );

        self.rearm();
        self.playback
    }

    /// returns whether the tick belongs to the armed timer, i.e. whether a click should sound
    pub fn tick(&mut self, generation: u64) -> bool {
        let current = self
            .timer
            .as_ref()
            .is_some_and(|armed| armed.generation == generation);

        if current && self.is_playing() {
            self.ticks += 1;
            true
        } else {
            debug!("dropping stale tick from timer {generation}");
            false
        }
    }

    /// index of the last tick within its beat, `0` being the beat itself
    pub fn current_pulse(&self) -> Option<u8> {
        if !self.is_playing() || self.ticks == 0 {
            return None;
        }

        let multiplier = u64::from(self.subdivision.multiplier());
        Some(((self.ticks - 1) % multiplier) as u8)
    }

    fn interval_changed(&mut self) {
        debug!("tick interval is now {}ms", self.tick_interval_ms());

        if self.is_playing() {
            self.ticks = 0;
            self.rearm();
        }
    }

    fn rearm(&mut self) {
        // the old handle is dropped, and thereby cancelled, before a new one exists
        self.timer = None;

        if self.is_playing() {
            self.generation += 1;
            let period = self.tick_interval();

            self.timer = Some(Armed {
                generation: self.generation,
                period,
                _handle: self.ticker.start(self.generation, period),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::Cell, rc::Rc};
    use strum::VariantArray as _;

    #[derive(Debug, Default)]
    struct FakeTicker {
        live: Rc<Cell<usize>>,
        started: Vec<(u64, Duration)>,
    }

    #[derive(Debug)]
    struct FakeHandle(Rc<Cell<usize>>);

    impl Drop for FakeHandle {
        fn drop(&mut self) {
            self.0.set(self.0.get() - 1);
        }
    }

    impl Ticker for FakeTicker {
        type Handle = FakeHandle;

        fn start(&mut self, generation: u64, period: Duration) -> FakeHandle {
            self.live.set(self.live.get() + 1);
            self.started.push((generation, period));
            FakeHandle(self.live.clone())
        }
    }

    fn metronome() -> Metronome<FakeTicker> {
        Metronome::new(FakeTicker::default(), Bpm::default(), Subdivision::default())
    }

    fn live(metronome: &Metronome<FakeTicker>) -> usize {
        metronome.ticker().live.get()
    }

    fn last_generation(metronome: &Metronome<FakeTicker>) -> u64 {
        metronome.ticker().started.last().unwrap().0
    }

    #[test]
    fn starts_stopped_with_defaults() {
        let metronome = metronome();

        assert_eq!(metronome.playback(), Playback::Stopped);
        assert_eq!(metronome.bpm().get(), 120);
        assert_eq!(metronome.subdivision(), Subdivision::X1);
        assert_eq!(metronome.tick_interval_ms(), 500.0);
        assert_eq!(metronome.armed_period(), None);
        assert_eq!(live(&metronome), 0);
    }

    #[test]
    fn interval_follows_every_change() {
        let mut metronome = metronome();

        for bpm in Bpm::RANGE {
            metronome.set_tempo(bpm);
            for subdivision in Subdivision::VARIANTS {
                metronome.set_subdivision(*subdivision);
                assert_eq!(
                    metronome.tick_interval_ms(),
                    60000.0 / f64::from(bpm) / f64::from(subdivision.multiplier())
                );
            }
        }
    }

    #[test]
    fn toggle_arms_and_cancels_one_timer() {
        let mut metronome = metronome();

        assert_eq!(metronome.toggle_playback(), Playback::Running);
        assert_eq!(live(&metronome), 1);
        assert_eq!(
            metronome.ticker().started,
            [(1, Duration::from_millis(500))]
        );
        assert_eq!(metronome.armed_period(), Some(Duration::from_millis(500)));

        assert_eq!(metronome.toggle_playback(), Playback::Stopped);
        assert_eq!(live(&metronome), 0);
        assert_eq!(metronome.armed_period(), None);
        assert_eq!(metronome.ticker().started.len(), 1);
    }

    #[test]
    fn changing_subdivision_while_running_rearms() {
        let mut metronome = metronome();
        metronome.toggle_playback();
        let first = last_generation(&metronome);

        metronome.set_subdivision(Subdivision::X4);

        assert_eq!(metronome.playback(), Playback::Running);
        assert_eq!(metronome.tick_interval_ms(), 125.0);
        assert_eq!(live(&metronome), 1);
        assert_eq!(metronome.armed_period(), Some(Duration::from_millis(125)));
        assert_ne!(last_generation(&metronome), first);
        assert!(!metronome.tick(first));
        assert!(metronome.tick(last_generation(&metronome)));
    }

    #[test]
    fn changing_tempo_while_running_rearms() {
        let mut metronome = metronome();
        metronome.toggle_playback();

        for bpm in [60, 61, 240, 40] {
            metronome.set_tempo(bpm);
            assert_eq!(live(&metronome), 1);
            assert_eq!(metronome.armed_period(), Some(metronome.tick_interval()));
        }

        assert_eq!(metronome.ticker().started.len(), 5);
    }

    #[test]
    fn unchanged_values_do_not_rearm() {
        let mut metronome = metronome();
        metronome.toggle_playback();

        metronome.set_tempo(120);
        metronome.set_tempo(500);
        metronome.set_tempo(240);
        metronome.set_subdivision(Subdivision::X1);

        assert_eq!(metronome.ticker().started.len(), 2);
        assert_eq!(live(&metronome), 1);
    }

    #[test]
    fn changes_while_stopped_arm_nothing() {
        let mut metronome = metronome();

        metronome.set_tempo(90);
        metronome.set_subdivision(Subdivision::X8);

        assert!(metronome.ticker().started.is_empty());
        assert_eq!(live(&metronome), 0);

        metronome.toggle_playback();
        assert_eq!(
            metronome.armed_period(),
            Some(tick_interval(Bpm::new(90), Subdivision::X8))
        );
    }

    #[test]
    fn stale_and_stopped_ticks_are_dropped() {
        let mut metronome = metronome();
        assert!(!metronome.tick(0));

        metronome.toggle_playback();
        let generation = last_generation(&metronome);
        assert!(metronome.tick(generation));

        metronome.toggle_playback();
        assert!(!metronome.tick(generation));

        metronome.toggle_playback();
        assert!(!metronome.tick(generation));
        assert!(metronome.tick(last_generation(&metronome)));
    }

    #[test]
    fn drop_cancels_timer() {
        let mut metronome = metronome();
        metronome.toggle_playback();
        let live = metronome.ticker().live.clone();
        assert_eq!(live.get(), 1);

        drop(metronome);

        assert_eq!(live.get(), 0);
    }

    #[test]
    fn raw_multipliers_outside_the_set_are_ignored() {
        let mut metronome = metronome();

        assert!(!metronome.set_subdivision_multiplier(3));
        assert_eq!(metronome.subdivision(), Subdivision::X1);

        assert!(metronome.set_subdivision_multiplier(8));
        assert_eq!(metronome.subdivision(), Subdivision::X8);
    }

    #[test]
    fn nudge_is_clamped() {
        let mut metronome = metronome();

        metronome.nudge_tempo(1);
        assert_eq!(metronome.bpm().get(), 121);

        metronome.set_tempo(240);
        metronome.nudge_tempo(1);
        assert_eq!(metronome.bpm().get(), 240);

        metronome.set_tempo(40);
        metronome.nudge_tempo(-1);
        assert_eq!(metronome.bpm().get(), 40);
    }

    #[test]
    fn pulse_wraps_per_beat() {
        let mut metronome = metronome();
        metronome.set_subdivision(Subdivision::X4);
        assert_eq!(metronome.current_pulse(), None);

        metronome.toggle_playback();
        assert_eq!(metronome.current_pulse(), None);

        let generation = last_generation(&metronome);
        let pulses = (0..6)
            .map(|_| {
                metronome.tick(generation);
                metronome.current_pulse().unwrap()
            })
            .collect::<Vec<_>>();
        assert_eq!(pulses, [0, 1, 2, 3, 0, 1]);

        metronome.toggle_playback();
        assert_eq!(metronome.current_pulse(), None);
    }
}
