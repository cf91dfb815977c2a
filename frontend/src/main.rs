//! Thin SDL2 demo host exercising `vector06c-core`'s request API
//! (spec.md §1: "out of scope... specified only by the contracts the core
//! exposes"). Grounded on the teacher's own `main.rs` shape: parse CLI
//! args with `clap`, load images from disk, build a key map, hand off to
//! the event loop, persist mutable state on exit.

use std::path::PathBuf;

use clap::Parser;

use vector06c_core::board::Board;
use vector06c_core::request::{Request, Response};

mod audio;
mod emulator;
mod input;
mod overlay;
mod rom_path;
mod video;

/// Vector-06C emulator core demo frontend.
#[derive(Parser)]
#[command(name = "vector06c", about = "Vector-06C cycle-accurate emulator")]
struct Args {
    /// Boot ROM image (monitor ROM, mirrored to fill the low 16 KiB shadow window).
    #[arg(long)]
    rom: PathBuf,

    /// Floppy image for drive 0 (raw 820 KiB CHS image).
    #[arg(long)]
    fdd0: Option<PathBuf>,
    /// Floppy image for drive 1.
    #[arg(long)]
    fdd1: Option<PathBuf>,
    /// Floppy image for drive 2.
    #[arg(long)]
    fdd2: Option<PathBuf>,
    /// Floppy image for drive 3.
    #[arg(long)]
    fdd3: Option<PathBuf>,

    /// Window scale factor.
    #[arg(long, default_value_t = 2)]
    scale: u32,

    /// Draw an FPS counter in the top-left corner.
    #[arg(long)]
    fps: bool,
}

fn main() {
    let mut args = Args::parse();

    let mut board = Board::new();

    let rom = rom_path::read_image(&args.rom).unwrap_or_else(|e| {
        eprintln!("Fatal: failed to read boot ROM {}: {e}", args.rom.display());
        std::process::exit(1);
    });
    let report = board.load_rom(rom);
    for w in &report.warnings {
        eprintln!("Warning: {w}");
    }
    for p in &report.prints {
        println!("{p}");
    }

    let fdd_paths: [Option<PathBuf>; 4] = [
        args.fdd0.take(),
        args.fdd1.take(),
        args.fdd2.take(),
        args.fdd3.take(),
    ];
    for (drive, path) in fdd_paths.iter().enumerate() {
        let Some(path) = path else { continue };
        match rom_path::read_image(path) {
            Ok(image) => match board.request(Request::MountFdd { drive, image }) {
                Response::Ok => {}
                Response::Error(w) => eprintln!("Warning: drive {drive}: {w}"),
                _ => unreachable!(),
            },
            Err(e) => eprintln!("Warning: failed to read floppy image {}: {e}", path.display()),
        }
    }

    let key_map = input::default_key_map();
    board.request(Request::Reset);
    emulator::run(&mut board, &key_map, args.scale, args.fps);

    // Persist any floppy writes back to their original path on quit
    // (spec.md §6: "persistence of floppy images" is a host concern).
    for (drive, path) in fdd_paths.iter().enumerate() {
        let Some(path) = path else { continue };
        if let Response::FddImage(data) = board.request(Request::DismountFdd { drive })
            && let Err(e) = std::fs::write(path, data)
        {
            eprintln!("Warning: failed to save floppy image {}: {e}", path.display());
        }
    }
}
