//! RAM budget and stack usage for the RP2350.
//!
//! # Memory Layout (RP2350)
//!
//! - RAM: 512KB at 0x20000000 (striped across SRAM0-7)
//! - Statics: the text-screen framebuffer, the GIF player and the blitter
//! - Stack: grows downward from the top of RAM
//!
//! The firmware reads the main stack pointer and hands it to
//! [`MemoryStats::from_stack_pointer`]; everything else is arithmetic and
//! runs on the host.

use crate::config::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// RP2350 RAM configuration.
pub const RAM_START: u32 = 0x2000_0000;
pub const RAM_SIZE: u32 = 512 * 1024; // 512KB
pub const RAM_END: u32 = RAM_START + RAM_SIZE;

/// Text-screen framebuffer, RGB565.
pub const FRAMEBUFFER_SIZE: u32 = SCREEN_WIDTH * SCREEN_HEIGHT * 2; // 153,600 bytes

/// Framebuffer plus ~32KB for the GIF player, the blitter and the HAL.
pub const STATIC_ESTIMATE: u32 = FRAMEBUFFER_SIZE + 32 * 1024;

/// Memory statistics snapshot.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MemoryStats {
    /// Main stack pointer the snapshot was taken from.
    pub stack_ptr: u32,
    /// Bytes between the top of RAM and the stack pointer.
    pub stack_used: u32,
    /// RAM left over for the stack once the statics are placed.
    pub stack_total: u32,
    /// Estimated static RAM.
    pub static_ram: u32,
    pub ram_total: u32,
}

impl MemoryStats {
    /// Snapshot for a main stack pointer value.
    ///
    /// A pointer above the top of RAM reads as an empty stack.
    pub const fn from_stack_pointer(stack_ptr: u32) -> Self {
        Self {
            stack_ptr,
            stack_used: RAM_END.saturating_sub(stack_ptr),
            stack_total: RAM_SIZE.saturating_sub(STATIC_ESTIMATE),
            static_ram: STATIC_ESTIMATE,
            ram_total: RAM_SIZE,
        }
    }

    /// Stack usage as a percentage of the stack budget.
    pub const fn stack_percent(&self) -> u32 {
        if self.stack_total > 0 {
            (self.stack_used * 100) / self.stack_total
        } else {
            0
        }
    }

    /// Static RAM as a percentage of total RAM.
    pub const fn static_percent(&self) -> u32 {
        if self.ram_total > 0 {
            (self.static_ram * 100) / self.ram_total
        } else {
            0
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(FRAMEBUFFER_SIZE, 153_600);
        assert_eq!(STATIC_ESTIMATE, 186_368);
        assert_eq!(RAM_END, 0x2008_0000);
    }

    #[test]
    fn test_stack_used_from_pointer() {
        let stats = MemoryStats::from_stack_pointer(RAM_END - 4096);
        assert_eq!(stats.stack_used, 4096);
        assert_eq!(stats.stack_total, 524_288 - 186_368);
        assert_eq!(stats.stack_percent(), 1);
    }

    #[test]
    fn test_pointer_at_top_of_ram_is_empty_stack() {
        assert_eq!(MemoryStats::from_stack_pointer(RAM_END).stack_used, 0);
        assert_eq!(MemoryStats::from_stack_pointer(RAM_END + 16).stack_used, 0);
    }

    #[test]
    fn test_static_percent() {
        // 186368 / 524288 * 100 = ~35%
        assert_eq!(MemoryStats::from_stack_pointer(RAM_END).static_percent(), 35);
    }

    #[test]
    fn test_default_has_no_budget() {
        let stats = MemoryStats::default();
        assert_eq!(stats.stack_percent(), 0);
        assert_eq!(stats.static_percent(), 0);
    }
}
