//! Host event loop: grounded on the teacher's own `emulator.rs`
//! poll-input / run-frame / render shape, generalized from calling a
//! `Machine` trait directly into driving `Board::request` (spec.md §6, §9
//! — the core owns the loop internals, the frontend only drives the
//! typed request API once per host frame).

use sdl2::event::Event;
use sdl2::keyboard::Scancode;

use vector06c_core::board::Board;
use vector06c_core::device::display::{FRAME_HEIGHT, FRAME_WIDTH};
use vector06c_core::request::{KeyEventAction, Request, Response};

use crate::audio::{self};
use crate::input::KeyMap;
use crate::overlay;
use crate::video::Video;

/// Target host frame rate (spec.md §5: "target: 50 fps").
const TARGET_FPS: u32 = 50;

pub fn run(board: &mut Board, key_map: &KeyMap, scale: u32, show_fps: bool) {
    let sdl_context = sdl2::init().expect("Failed to initialize SDL2");
    let sdl_video = sdl_context.video().expect("Failed to init SDL video");
    let sdl_audio = sdl_context.audio().expect("Failed to init SDL audio");

    let mut video = Video::new(
        &sdl_video,
        "Vector-06C",
        FRAME_WIDTH as u32,
        FRAME_HEIGHT as u32,
        scale,
    );
    let audio_queue = audio::init(&sdl_audio);

    let mut event_pump = sdl_context.event_pump().expect("Failed to get event pump");

    board.request(Request::Run);

    let frame_period = std::time::Duration::from_secs_f64(1.0 / TARGET_FPS as f64);
    let mut audio_buf = vec![0f32; audio::SAMPLE_RATE as usize / TARGET_FPS as usize];
    let mut last_fps_report = std::time::Instant::now();
    let mut frames_since_report = 0u32;
    let mut fps_text = String::from("--");

    'main: loop {
        let frame_start = std::time::Instant::now();

        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,

                Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => break 'main,

                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => {
                    if let Some(matrix_code) = key_map.get(sc) {
                        board.request(Request::KeyHandling {
                            scancode: matrix_code,
                            action: KeyEventAction::Down,
                        });
                    }
                }

                Event::KeyUp {
                    scancode: Some(sc), ..
                } => {
                    if let Some(matrix_code) = key_map.get(sc) {
                        board.request(Request::KeyHandling {
                            scancode: matrix_code,
                            action: KeyEventAction::Up,
                        });
                    }
                }

                _ => {}
            }
        }

        // Run one frame of emulation (spec.md §6: EXECUTE_FRAME_NO_BREAKS
        // — this frontend has no debugger UI, so breakpoints never apply).
        board.request(Request::ExecuteFrameNoBreaks);

        board.read_audio_samples(&mut audio_buf);
        if let Some(queue) = &audio_queue {
            audio::feed(queue, &audio_buf);
        }

        if let Response::Frame(mut frame) = board.request(Request::GetFrame { vsync: true }) {
            if show_fps {
                overlay::draw_fps(&mut frame, FRAME_WIDTH, &fps_text);
            }
            video.present(&frame);
        }

        frames_since_report += 1;
        if last_fps_report.elapsed() >= std::time::Duration::from_secs(1) {
            fps_text = format!("{:.1}", frames_since_report as f64 / last_fps_report.elapsed().as_secs_f64());
            frames_since_report = 0;
            last_fps_report = std::time::Instant::now();
        }

        // Pace to the host's 50 fps target; SDL vsync (`present_vsync` in
        // `Video::new`) usually does this for us, but a sleep keeps frame
        // timing sane on displays that refresh faster than 50 Hz.
        let elapsed = frame_start.elapsed();
        if elapsed < frame_period {
            std::thread::sleep(frame_period - elapsed);
        }
    }

    board.request(Request::Exit);
}
