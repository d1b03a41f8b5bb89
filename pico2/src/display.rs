//! Board wiring for the Pimoroni PIM715 Display Pack 2.8" (ST7789).
//!
//! | Signal    | GPIO | Notes                         |
//! |-----------|------|-------------------------------|
//! | DC        | 16   | Low = command, high = data    |
//! | CS        | 17   | Held low for a whole frame    |
//! | CLK       | 18   | SPI0 CLK                      |
//! | MOSI      | 19   | SPI0 TX                       |
//! | Backlight | 20   | High = on                     |
//! | Button A  | 12   | Top left, active-low          |
//! | Button B  | 13   | Bottom left, active-low       |
//!
//! Reset is tied to the RUN pin, so the panel resets with the Pico.

use embassy_rp::spi::Config as SpiConfig;

/// Highest SPI clock the ST7789 accepts.
pub const SPI_FREQUENCY_HZ: u32 = 62_500_000;

/// SPI configuration for the ST7789 display.
pub fn display_spi_config() -> SpiConfig {
    let mut config = SpiConfig::default();
    config.frequency = SPI_FREQUENCY_HZ;
    config
}
