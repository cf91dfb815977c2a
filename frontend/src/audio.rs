//! SDL2 audio playback, pulling downsampled samples straight out of the
//! core's lock-free ring (spec.md §4.9, §5: "the audio ring has one
//! producer... and one consumer... the host audio callback").
//!
//! Grounded on the teacher's own `audio.rs`, but simplified from a
//! push-into-a-`Mutex<VecDeque>`-then-pull-in-an-`AudioCallback` shape to
//! SDL2's queue API: the core already buffers and adapts its own output
//! rate (`device::audio::AudioMixer::read_samples`), so the frontend only
//! needs to top up a hardware queue once per host frame rather than run
//! its own ring and fade logic.

use sdl2::audio::{AudioQueue, AudioSpecDesired};

/// Matches the core's nominal downsample target (1.5 MHz / 30 ≈ 50 kHz,
/// spec.md §4.9).
pub const SAMPLE_RATE: i32 = 50_000;

/// Initializes SDL2 audio playback as a queue the emulation loop tops up
/// once per frame. Returns `None` if SDL2 can't open a device (the
/// frontend then just runs silent rather than aborting).
pub fn init(sdl_audio: &sdl2::AudioSubsystem) -> Option<AudioQueue<f32>> {
    let desired_spec = AudioSpecDesired {
        freq: Some(SAMPLE_RATE),
        channels: Some(1),
        samples: Some(1024),
    };

    let queue: AudioQueue<f32> = sdl_audio.open_queue(None, &desired_spec).ok()?;
    queue.resume();
    Some(queue)
}

/// Tops up the hardware queue, keeping it from running dry without
/// letting it grow past a few frames' worth of latency.
pub fn feed(queue: &AudioQueue<f32>, samples: &[f32]) {
    const MAX_QUEUED_SAMPLES: u32 = SAMPLE_RATE as u32 / 5; // ~200ms of slack
    if queue.size() < MAX_QUEUED_SAMPLES {
        let _ = queue.queue_audio(samples);
    }
}
