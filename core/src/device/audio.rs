//! Audio mixer, downsampler, and the shared sample ring between the
//! emulation loop and the host audio callback (spec.md §4.9, §5).
//!
//! Grounded on the frontend's `audio.rs` `AudioPlayer` ring-buffer shape,
//! but moved into the core: spec.md §5 calls the ring a core-owned shared
//! resource (producer = emulation loop, consumer = host audio callback)
//! and recommends atomics with release/acquire semantics on the two
//! indices, which is what `AtomicUsize` gives for free here.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::ay8910::Ay8910RateBridge;
use super::timer8253::Timer8253;

pub const RING_SIZE: usize = 4000;
const LOW_WATERMARK: usize = 1000;
const HIGH_WATERMARK: usize = 3000;
const INITIAL_DOWNSAMPLE_RATE: u32 = 30;

/// Fixed-capacity single-producer/single-consumer float ring. Indices are
/// monotonic and only ever taken modulo `RING_SIZE` on access, so a
/// consumer on another thread can read `len()` and catch up without the
/// producer ever needing to block.
pub struct AudioRing {
    buf: [f32; RING_SIZE],
    producer: AtomicUsize,
    consumer: AtomicUsize,
}

impl AudioRing {
    fn new() -> Self {
        Self {
            buf: [0.0; RING_SIZE],
            producer: AtomicUsize::new(0),
            consumer: AtomicUsize::new(0),
        }
    }

    fn push(&mut self, sample: f32) {
        let idx = self.producer.load(Ordering::Relaxed);
        self.buf[idx % RING_SIZE] = sample;
        self.producer.store(idx.wrapping_add(1), Ordering::Release);
    }

    /// Samples currently available to the consumer.
    pub fn len(&self) -> usize {
        let p = self.producer.load(Ordering::Acquire);
        let c = self.consumer.load(Ordering::Relaxed);
        p.wrapping_sub(c).min(RING_SIZE)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AudioRing {
    fn default() -> Self {
        Self::new()
    }
}

/// Mixes the i8253 timer, AY-3-8910 PSG, and beeper into a downsampled
/// stream, buffering into [`AudioRing`].
pub struct AudioMixer {
    pub timer: Timer8253,
    pub ay: Ay8910RateBridge,
    pub ring: AudioRing,

    accumulator: f32,
    sample_count: u32,
    downsample_rate: u32,
    last_sample: f32,
    pub mute: bool,
}

impl AudioMixer {
    pub fn new() -> Self {
        Self {
            timer: Timer8253::new(),
            ay: Ay8910RateBridge::new(),
            ring: AudioRing::new(),
            accumulator: 0.0,
            sample_count: 0,
            downsample_rate: INITIAL_DOWNSAMPLE_RATE,
            last_sample: 0.0,
            mute: false,
        }
    }

    pub fn reset(&mut self) {
        self.timer.reset();
        self.ay.reset();
        self.ring = AudioRing::new();
        self.accumulator = 0.0;
        self.sample_count = 0;
        self.downsample_rate = INITIAL_DOWNSAMPLE_RATE;
        self.last_sample = 0.0;
    }

    /// Advances `cycles` CPU cycles' worth of mixer ticks. Each tick mixes
    /// `timer.clock(1) + ay.clock(2) + beeper`, scaled by the mute toggle.
    /// When `optimize` is set the PSG/timer state still advances (so
    /// register write timings stay correct for software polling them) but
    /// no downsampling or ring write happens.
    pub fn clock(&mut self, cycles: u32, beeper: f32, optimize: bool) {
        let scalar = if self.mute { 0.0 } else { 1.0 };
        for _ in 0..cycles {
            let timer_out = self.timer.clock(1);
            let ay_out = self.ay.clock(2);
            let sample = (timer_out + ay_out + beeper) * scalar;

            if optimize {
                continue;
            }

            self.accumulator += sample;
            self.sample_count += 1;
            if self.sample_count >= self.downsample_rate {
                let avg = self.accumulator / self.sample_count as f32;
                self.last_sample = avg;
                self.ring.push(avg);
                self.accumulator = 0.0;
                self.sample_count = 0;
            }
        }
    }

    /// Fills `out` with `n` samples, adapting `downsample_rate` to the
    /// current buffer fill (spec.md §4.9).
    pub fn read_samples(&mut self, out: &mut [f32]) {
        let n = out.len();
        let available = self.ring.len();
        if available < LOW_WATERMARK {
            out.fill(self.last_sample);
            self.downsample_rate = self.downsample_rate.saturating_sub(1).max(1);
            return;
        }

        let c = self.ring.consumer.load(Ordering::Relaxed);
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.ring.buf[(c.wrapping_add(i)) % RING_SIZE];
        }
        let advance = n.min(available);
        self.ring
            .consumer
            .store(c.wrapping_add(advance), Ordering::Release);

        if available.saturating_sub(advance) > HIGH_WATERMARK {
            let c2 = self.ring.consumer.load(Ordering::Relaxed);
            self.ring
                .consumer
                .store(c2.wrapping_add(n), Ordering::Release);
            self.downsample_rate = self.downsample_rate.saturating_add(1);
        }
    }
}

impl Default for AudioMixer {
    fn default() -> Self {
        Self::new()
    }
}
