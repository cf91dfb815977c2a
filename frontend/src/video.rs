//! SDL2 window + streaming texture, grounded on the teacher's own
//! `video.rs`. The Vector-06C core hands back whole `ARGB8888` words
//! (`device::display::FrameBuffer`, spec.md §6 "frame buffer format"), so
//! the streaming texture is created in that format directly rather than
//! the teacher's `RGB24`, and `present` takes a `&[u32]` instead of a byte
//! slice.

use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, TextureCreator};
use sdl2::video::{Window, WindowContext};

pub struct Video {
    canvas: Canvas<Window>,
    texture_creator: TextureCreator<WindowContext>,
    width: u32,
    height: u32,
}

impl Video {
    /// Create an SDL window and renderer for the given native resolution.
    pub fn new(
        sdl_video: &sdl2::VideoSubsystem,
        title: &str,
        native_width: u32,
        native_height: u32,
        scale: u32,
    ) -> Self {
        let window = sdl_video
            .window(title, native_width * scale, native_height * scale)
            .position_centered()
            .build()
            .expect("Failed to create window");

        let canvas = window
            .into_canvas()
            .accelerated()
            .present_vsync()
            .build()
            .expect("Failed to create canvas");

        let texture_creator = canvas.texture_creator();

        Self {
            canvas,
            texture_creator,
            width: native_width,
            height: native_height,
        }
    }

    /// Upload an `ARGB8888` framebuffer (one `u32` per pixel, spec.md §6)
    /// to the texture and present it.
    pub fn present(&mut self, framebuffer: &[u32]) {
        let mut texture = self
            .texture_creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, self.width, self.height)
            .expect("Failed to create texture");

        let bytes: &[u8] = bytemuck_cast_u32_slice(framebuffer);

        texture
            .update(None, bytes, (self.width * 4) as usize)
            .expect("Failed to update texture");

        self.canvas.clear();
        self.canvas
            .copy(&texture, None, None)
            .expect("Failed to copy texture");
        self.canvas.present();
    }
}

/// Reinterprets a `u32` pixel slice as raw bytes in host (native) byte
/// order, which is exactly what `PixelFormatEnum::ARGB8888` expects to
/// unpack on a little-endian host — the same byte layout spec.md §6
/// specifies for the frame buffer.
fn bytemuck_cast_u32_slice(pixels: &[u32]) -> &[u8] {
    // SAFETY: `u32` has no padding and any bit pattern is valid; a `&[u32]`
    // is a valid `&[u8]` of four times the length under the same lifetime.
    unsafe {
        std::slice::from_raw_parts(pixels.as_ptr() as *const u8, std::mem::size_of_val(pixels))
    }
}
