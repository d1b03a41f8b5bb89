//! Vape timer library - display pipeline and timer logic shared by the
//! firmware and the desktop simulator.
//!
//! This library contains everything that doesn't touch hardware and can be
//! tested on the host machine. The `pico2` firmware and the `simulator`
//! binary add the display driver, the buttons and the main loop.
//!
//! # Display Pipeline
//!
//! ```text
//! GIF bytes ──► gif::GifPlayer ──Scanline──► blit::Blitter ──► sink::PixelSink
//!               (LZW, one line)              (palette, runs,    (ST7789 or any
//!                                             blocking/DMA)      DrawTarget)
//! ```
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test --lib
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the firmware builds the library as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Configuration
pub mod colors;
pub mod config;
pub mod memory;
pub mod styles;

// Display pipeline
pub mod animation;
pub mod blit;
pub mod gif;
pub mod palette;
pub mod sink;

// Timer
pub mod button;
pub mod countdown;
pub mod screens;
