//! Static text screens shown between animations.
//!
//! # Screen Flow
//!
//! 1. **Start** ([`draw_start_screen`]): after the boot animation, until a
//!    button is pressed
//! 2. **Countdown** ([`draw_countdown_screen`]): redrawn once per second
//! 3. **End** ([`draw_end_screen`]): after the closing animation
//!
//! # Visual Layout
//!
//! ```text
//! ┌────────────────────────────────────┐
//! │<- 5min                             │  Label next to button A
//! │                                    │
//! │                          Heizen!   │  Headline, right-aligned 10px from edge
//! │                                    │
//! │<- 30s                              │  Label next to button B
//! └────────────────────────────────────┘
//! ```
//!
//! All screens are generic over `DrawTarget<Color = Rgb565>` and redraw the
//! whole display: background first, then text.

mod countdown;
mod end;
mod layout;
mod start;

pub use countdown::draw_countdown_screen;
pub use end::draw_end_screen;
pub use start::draw_start_screen;
