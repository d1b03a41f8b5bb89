//! Built-in animations and frame-by-frame playback onto a pixel sink.
//!
//! Playback is split per frame so the caller decides how to wait out the
//! frame delay: the firmware awaits an embassy timer, the simulator sleeps
//! and refreshes its window.

use crate::blit::{Blitter, Transfer};
use crate::gif::{FrameInfo, GifError, GifPlayer};
use crate::sink::{ExclusiveWrite, PixelSink};

/// Boot animation: a red disc covers the black screen.
pub const OUT_ANIMATION: &[u8] = include_bytes!("../assets/out.gif");

/// Closing animation: a green disc covers the countdown screen.
pub const IN_ANIMATION: &[u8] = include_bytes!("../assets/in.gif");

/// Decode the next frame of `gif` and blit it onto `sink`.
///
/// The sink is held for exactly one frame and every transfer has finished
/// when this returns. Returns `None` once the animation is over.
pub fn play_frame<S, T>(
    gif: &mut GifPlayer<'_>,
    blitter: &mut Blitter<T>,
    sink: &mut S,
) -> Result<Option<FrameInfo>, GifError>
where
    S: PixelSink + ?Sized,
    T: Transfer,
{
    let mut display = ExclusiveWrite::new(sink);
    let frame = gif.play_frame(|line| blitter.draw(&mut *display, line));
    blitter.flush(&mut *display);
    frame
}
