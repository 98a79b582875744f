//! Interrupt-side consumer of completed buffers.
//!
//! Runs on every converter END event. It must stay short: no allocation,
//! no waiting. Encoding and radio work happen later in the broadcast task,
//! which picks the reading up from the `ReadingSignal`.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::error::Error;
use crate::reading::{LightReading, ReadingSignal};
use crate::sampling::acquisition::{BufferPair, Converter, ConverterConfig, Slot, Submission};

/// Derives the published reading from a completed buffer.
///
/// The last sample of the burst wins; earlier samples are read and dropped.
#[derive(Default)]
pub struct Aggregator {
    events: u32,
}

impl Aggregator {
    pub const fn new() -> Self {
        Self { events: 0 }
    }

    pub fn consume(&mut self, samples: &[i16]) -> Option<LightReading> {
        let mut reading = None;
        for &sample in samples {
            reading = Some(LightReading::from_raw(sample));
        }
        self.events = self.events.wrapping_add(1);
        reading
    }

    /// Buffers consumed so far (diagnostic).
    pub fn events(&self) -> u32 {
        self.events
    }
}

/// Sampling counters mirrored out of the interrupt for the broadcast task.
pub struct SampleStats {
    events: AtomicU32,
    starved: AtomicU32,
}

impl SampleStats {
    pub const fn new() -> Self {
        Self {
            events: AtomicU32::new(0),
            starved: AtomicU32::new(0),
        }
    }

    /// Buffers consumed.
    pub fn events(&self) -> u32 {
        self.events.load(Ordering::Relaxed)
    }

    /// Completions that found no buffer queued, i.e. lost bursts.
    pub fn starved(&self) -> u32 {
        self.starved.load(Ordering::Relaxed)
    }
}

impl Default for SampleStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Buffers, converter and aggregator owned together.
///
/// Lives in a static for the life of the device: the converter writes
/// into the buffers by address.
pub struct SamplePath<C: Converter, const N: usize> {
    buffers: BufferPair<N>,
    converter: C,
    aggregator: Aggregator,
}

impl<C: Converter, const N: usize> SamplePath<C, N> {
    pub const fn new(converter: C) -> Self {
        Self {
            buffers: BufferPair::new(),
            converter,
            aggregator: Aggregator::new(),
        }
    }

    /// Configure the converter and put both buffers in flight.
    ///
    /// The converter must fill a whole buffer on every trigger.
    pub fn arm(&mut self, config: &ConverterConfig) -> Result<(), Error> {
        config.validate()?;
        if config.samples_per_trigger as usize != N {
            return Err(Error::ConverterConfig);
        }
        self.converter.configure(config)?;
        self.submit(Slot::A)?;
        self.submit(Slot::B)
    }

    fn submit(&mut self, slot: Slot) -> Result<(), Error> {
        let how = self.buffers.submit(slot)?;
        self.converter
            .submit(self.buffers.samples_mut(slot), how == Submission::Started)
    }

    /// Handle one END event: swap buffers, derive the reading, re-arm the
    /// drained buffer and publish.
    pub fn on_buffer_done(&mut self, out: &ReadingSignal) -> Result<LightReading, Error> {
        let done = self.buffers.complete()?;
        if done.next.is_some() {
            self.converter.start_next();
        }

        let reading = self
            .aggregator
            .consume(self.buffers.samples(done.drained))
            .unwrap_or_default();

        self.submit(done.drained)?;
        out.signal(reading);
        Ok(reading)
    }

    /// Copy the diagnostic counters into `stats`.
    pub fn report(&self, stats: &SampleStats) {
        stats.events.store(self.aggregator.events(), Ordering::Relaxed);
        stats.starved.store(self.buffers.starved(), Ordering::Relaxed);
    }

    pub fn buffers(&self) -> &BufferPair<N> {
        &self.buffers
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn converter(&self) -> &C {
        &self.converter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_sample_wins() {
        let mut agg = Aggregator::new();
        assert_eq!(
            agg.consume(&[100, 200, 300, 400, 1234]),
            Some(LightReading(1234))
        );
        assert_eq!(agg.consume(&[4095, 4095, 4095, 4095, 7]), Some(LightReading(7)));
        assert_eq!(agg.events(), 2);
    }

    #[test]
    fn earlier_samples_do_not_matter() {
        let mut agg = Aggregator::new();
        let a = agg.consume(&[0, 0, 0, 0, 512]);
        let b = agg.consume(&[-5, 4095, 17, 3000, 512]);
        assert_eq!(a, b);
    }

    #[test]
    fn empty_buffer_yields_nothing() {
        let mut agg = Aggregator::new();
        assert_eq!(agg.consume(&[]), None);
        assert_eq!(agg.events(), 1);
    }

    struct NullConverter;

    impl Converter for NullConverter {
        fn configure(&mut self, _config: &ConverterConfig) -> Result<(), Error> {
            Ok(())
        }

        fn submit(&mut self, _buffer: &mut [i16], _start: bool) -> Result<(), Error> {
            Ok(())
        }

        fn start_next(&mut self) {}
    }

    #[test]
    fn arm_requires_one_buffer_per_trigger() {
        let mut cfg = crate::config::converter_config();
        cfg.samples_per_trigger = 1;
        let mut path = SamplePath::<_, 5>::new(NullConverter);
        assert_eq!(path.arm(&cfg), Err(Error::ConverterConfig));
        assert_eq!(path.buffers().active_count(), 0);

        cfg.samples_per_trigger = 5;
        assert_eq!(path.arm(&cfg), Ok(()));
        assert_eq!(path.buffers().active_count(), 1);
    }

    #[test]
    fn report_mirrors_counters() {
        let mut path = SamplePath::<_, 5>::new(NullConverter);
        path.arm(&crate::config::converter_config()).unwrap();
        let readings = ReadingSignal::new();
        let stats = SampleStats::new();

        path.on_buffer_done(&readings).unwrap();
        path.on_buffer_done(&readings).unwrap();
        path.report(&stats);
        assert_eq!(stats.events(), 2);
        assert_eq!(stats.starved(), 0);
    }

    #[test]
    fn event_counter_wraps() {
        let mut agg = Aggregator { events: u32::MAX };
        agg.consume(&[1]);
        assert_eq!(agg.events(), 0);
    }
}
