//! Vape Timer Simulator for Windows/Desktop.
//!
//! Runs the firmware's flow in an `embedded-graphics-simulator` window:
//! the same animations, screens and countdown, with the keyboard standing
//! in for the Display Pack buttons.
//!
//! # Keys
//!
//! - **A**: 5 minute countdown (top-left button)
//! - **B**: 30 second countdown (bottom-left button)

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]

mod timing;

use std::thread;
use std::time::{Duration, Instant};

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use vape_timer::animation::{self, IN_ANIMATION, OUT_ANIMATION};
use vape_timer::blit::Blitter;
use vape_timer::button::ButtonState;
use vape_timer::colors::BLACK;
use vape_timer::config::{SCREEN_HEIGHT, SCREEN_WIDTH};
use vape_timer::countdown::{Countdown, CountdownEvent, TimerPreset};
use vape_timer::gif::GifPlayer;
use vape_timer::screens::{draw_countdown_screen, draw_end_screen, draw_start_screen};
use vape_timer::sink::{DrawTargetSink, PixelOrder};

use crate::timing::{POLL_INTERVAL, millis_since};

/// Keyboard state of the two buttons.
#[derive(Default)]
struct Keys {
    a: bool,
    b: bool,
}

impl Keys {
    /// Track key presses and releases. Returns `false` once the window is closed.
    fn update(
        &mut self,
        window: &mut Window,
    ) -> bool {
        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => return false,
                SimulatorEvent::KeyDown { keycode, .. } => self.set(keycode, true),
                SimulatorEvent::KeyUp { keycode, .. } => self.set(keycode, false),
                _ => {}
            }
        }
        true
    }

    fn set(
        &mut self,
        keycode: Keycode,
        down: bool,
    ) {
        match keycode {
            Keycode::A => self.a = down,
            Keycode::B => self.b = down,
            _ => {}
        }
    }
}

/// Play an embedded animation, refreshing the window after every frame.
///
/// Returns `false` if the window was closed meanwhile.
fn play_animation(
    name: &str,
    data: &[u8],
    display: &mut SimulatorDisplay<Rgb565>,
    window: &mut Window,
    keys: &mut Keys,
) -> bool {
    let mut gif = match GifPlayer::open(data, PixelOrder::LittleEndian) {
        Ok(gif) => gif,
        Err(e) => {
            eprintln!("Skipping {name} animation: {e}");
            return true;
        }
    };
    let mut blitter = Blitter::blocking();

    loop {
        let frame = animation::play_frame(
            &mut gif,
            &mut blitter,
            &mut DrawTargetSink::new(&mut *display, PixelOrder::LittleEndian),
        );
        match frame {
            Ok(Some(frame)) => {
                window.update(display);
                if !keys.update(window) {
                    return false;
                }
                thread::sleep(Duration::from_millis(u64::from(frame.delay_ms)));
            }
            Ok(None) => return true,
            Err(e) => {
                eprintln!("{name} animation stopped: {e}");
                return true;
            }
        }
    }
}

fn main() {
    let mut display: SimulatorDisplay<Rgb565> = SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(2).build();
    let mut window = Window::new("Vape Timer Sim", &output_settings);
    let mut keys = Keys::default();

    display.clear(BLACK).ok();
    window.update(&display);

    if !play_animation("out", OUT_ANIMATION, &mut display, &mut window, &mut keys) {
        return;
    }
    draw_start_screen(&mut display).ok();

    let start = Instant::now();
    let mut btn_a_state = ButtonState::new();
    let mut btn_b_state = ButtonState::new();
    let mut countdown = Countdown::new();

    loop {
        window.update(&display);
        if !keys.update(&mut window) {
            return;
        }

        let now_ms = millis_since(start);
        if btn_a_state.just_pressed(keys.a, now_ms) {
            countdown.start(TimerPreset::FiveMinutes, now_ms);
        }
        if btn_b_state.just_pressed(keys.b, now_ms) {
            countdown.start(TimerPreset::ThirtySeconds, now_ms);
        }

        match countdown.poll(now_ms) {
            Some(CountdownEvent::Tick(remaining)) => {
                draw_countdown_screen(&mut display, remaining).ok();
            }
            Some(CountdownEvent::Finished) => {
                if !play_animation("in", IN_ANIMATION, &mut display, &mut window, &mut keys) {
                    return;
                }
                draw_end_screen(&mut display).ok();
            }
            None => {}
        }

        thread::sleep(POLL_INTERVAL);
    }
}
