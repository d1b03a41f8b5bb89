//! Vape Timer Firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Heat-up countdown on the Pimoroni PIM715 Display Pack 2.8".
//!
//! # Flow
//!
//! 1. Boot: black screen, "out" animation, start screen ("Heizen!")
//! 2. A button press starts a countdown, redrawn once per second
//! 3. At the end: "in" animation, then the end screen ("Vape!")
//!
//! Animations stream straight from flash to the panel through the scanline
//! blitter. Text screens are rendered into a framebuffer and flushed whole.
//!
//! # Button Controls
//!
//! - **A** (top left): 5 minute countdown
//! - **B** (bottom left): 30 second countdown
//!
//! Pressing either button while a countdown runs restarts it.
//!
//! # Features
//!
//! - `dma`: double-buffered DMA transfers for animation scanlines (each
//!   transfer completes before the next line is staged)

#![no_std]
#![no_main]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]

mod display;
mod st7789;

use core::convert::Infallible;

use defmt::{info, warn};
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::spi::Spi;
use embassy_time::{Instant, Timer};
use embedded_graphics::prelude::*;
use static_cell::{ConstStaticCell, StaticCell};
use vape_timer::animation::{self, IN_ANIMATION, OUT_ANIMATION};
use vape_timer::blit::{Blitter, Transfer};
use vape_timer::button::ButtonState;
use vape_timer::colors::BLACK;
use vape_timer::config::POLL_INTERVAL_MS;
use vape_timer::countdown::{Countdown, CountdownEvent, TimerPreset};
use vape_timer::gif::GifPlayer;
use vape_timer::memory::MemoryStats;
use vape_timer::screens::{draw_countdown_screen, draw_end_screen, draw_start_screen};
use vape_timer::sink::PixelOrder;
use {defmt_rtt as _, panic_probe as _};

use crate::display::{SPI_FREQUENCY_HZ, display_spi_config};
use crate::st7789::{BUFFER_SIZE, St7789, St7789Renderer};

#[cfg(feature = "dma")]
type Strategy = vape_timer::blit::DoubleBuffered;
#[cfg(not(feature = "dma"))]
type Strategy = vape_timer::blit::Blocking;

// Program metadata for `picotool info`
#[unsafe(link_section = ".bi_entries")]
#[used]
pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
    embassy_rp::binary_info::rp_program_name!(c"pico2-vape-timer"),
    embassy_rp::binary_info::rp_program_description!(c"Vape heat-up timer on PIM715 Display"),
    embassy_rp::binary_info::rp_cargo_version!(),
    embassy_rp::binary_info::rp_program_build_attribute!(),
];

/// Text-screen framebuffer.
static FRAMEBUFFER: ConstStaticCell<[u8; BUFFER_SIZE]> = ConstStaticCell::new([0; BUFFER_SIZE]);

/// Decoder state of the animation being played (~17 KiB, kept out of the task future).
static PLAYER: StaticCell<Option<GifPlayer<'static>>> = StaticCell::new();

/// Scanline blitter with its staging buffers.
static BLITTER: StaticCell<Blitter<Strategy>> = StaticCell::new();

/// Log stack and static RAM usage at the current stack depth.
fn log_memory(when: &str) {
    let stats = MemoryStats::from_stack_pointer(cortex_m::register::msp::read());
    info!(
        "Memory {}: stack {} / {} bytes ({}%), statics {}%",
        when,
        stats.stack_used,
        stats.stack_total,
        stats.stack_percent(),
        stats.static_percent()
    );
}

/// Render a screen into the framebuffer and send it to the panel.
async fn show_screen<F>(
    panel: &mut St7789<'_>,
    framebuffer: &mut [u8],
    draw: F,
) where
    F: FnOnce(&mut St7789Renderer<'_>) -> Result<(), Infallible>,
{
    {
        let mut renderer = St7789Renderer::new(framebuffer);
        draw(&mut renderer).ok();
    }
    panel.flush_frame(framebuffer).await;
}

/// Play an embedded animation to its end, waiting out each frame's delay.
///
/// A decoding error stops the animation where it is; the screen that
/// follows covers whatever was drawn.
async fn play_animation<T: Transfer>(
    name: &str,
    data: &'static [u8],
    slot: &mut Option<GifPlayer<'static>>,
    blitter: &mut Blitter<T>,
    panel: &mut St7789<'_>,
) {
    let gif = match GifPlayer::open(data, PixelOrder::BigEndian) {
        Ok(gif) => slot.insert(gif),
        Err(e) => {
            warn!("Skipping {} animation: {}", name, e);
            return;
        }
    };
    info!("Opened {} GIF; canvas size = {} x {}", name, gif.canvas_width(), gif.canvas_height());

    blitter.reset_stats();
    let start = Instant::now();
    let mut frames = 0u32;
    loop {
        match animation::play_frame(gif, blitter, panel) {
            Ok(Some(frame)) => {
                frames += 1;
                Timer::after_millis(u64::from(frame.delay_ms)).await;
            }
            Ok(None) => break,
            Err(e) => {
                warn!("{} animation stopped after {} frames: {}", name, frames, e);
                break;
            }
        }
    }
    info!(
        "{} animation: {} frames in {} ms, {}",
        name,
        frames,
        start.elapsed().as_millis(),
        blitter.stats()
    );
    log_memory("after animation");
}

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    info!("Vape timer starting...");

    let p = embassy_rp::init(Default::default());

    // Initialize display pins
    // PIM715 pinout: CS=17, DC=16, CLK=18, MOSI=19, Backlight=20
    let cs = Output::new(p.PIN_17, Level::High);
    let dc = Output::new(p.PIN_16, Level::Low);
    let _backlight = Output::new(p.PIN_20, Level::High); // Turn on backlight

    // Initialize async SPI with DMA (TX-only, display doesn't need MISO)
    let spi = Spi::new_txonly(p.SPI0, p.PIN_18, p.PIN_19, p.DMA_CH0, display_spi_config());

    let mut panel = St7789::new(spi, dc, cs);
    panel.init().await;
    info!("Display initialized, SPI at {} MHz", SPI_FREQUENCY_HZ / 1_000_000);

    let framebuffer = FRAMEBUFFER.take();
    let player = PLAYER.init(None);
    let blitter = BLITTER.init(Blitter::new(Strategy::new()));
    log_memory("at boot");

    // Clear the panel before the first animation to prevent grainy noise
    show_screen(&mut panel, framebuffer, |d| d.clear(BLACK)).await;

    play_animation("out", OUT_ANIMATION, player, blitter, &mut panel).await;
    show_screen(&mut panel, framebuffer, |d| draw_start_screen(d)).await;

    // Initialize buttons (active-low with internal pull-up)
    // PIM715: A=12, B=13
    let btn_a = Input::new(p.PIN_12, Pull::Up);
    let btn_b = Input::new(p.PIN_13, Pull::Up);
    let mut btn_a_state = ButtonState::new();
    let mut btn_b_state = ButtonState::new();

    let mut countdown = Countdown::new();

    loop {
        let now_ms = Instant::now().as_millis();

        if btn_a_state.just_pressed(btn_a.is_low(), now_ms) {
            countdown.start(TimerPreset::FiveMinutes, now_ms);
            info!("Countdown started: {} s", countdown.remaining());
        }
        if btn_b_state.just_pressed(btn_b.is_low(), now_ms) {
            countdown.start(TimerPreset::ThirtySeconds, now_ms);
            info!("Countdown started: {} s", countdown.remaining());
        }

        match countdown.poll(now_ms) {
            Some(CountdownEvent::Tick(remaining)) => {
                show_screen(&mut panel, framebuffer, |d| draw_countdown_screen(d, remaining)).await;
            }
            Some(CountdownEvent::Finished) => {
                info!("Countdown finished");
                play_animation("in", IN_ANIMATION, player, blitter, &mut panel).await;
                show_screen(&mut panel, framebuffer, |d| draw_end_screen(d)).await;
            }
            None => {}
        }

        Timer::after_millis(POLL_INTERVAL_MS).await;
    }
}
