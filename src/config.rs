// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client configuration.

use crate::mem::PAGE_SIZE;

/// Parameters for creating a [`UefiSecApp`](crate::UefiSecApp).
///
/// ```
/// use uefisecapp::Config;
///
/// let config = Config::default().with_initial_arena_size(4 * 4096);
/// assert_eq!(config.app_name, "qcom.tz.uefisecapp");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Name the secure application is registered under with the secure OS.
    /// Must be shorter than [`MAX_APP_NAME_SIZE`](crate::tee::MAX_APP_NAME_SIZE).
    pub app_name: &'static str,

    /// Size of the arena allocated at creation time.
    pub initial_arena_size: usize,

    /// Allocation granularity of the DMA allocator. Must be a power of two.
    pub page_size: usize,
}

impl Config {
    /// Name of the UEFI variable service application.
    pub const DEFAULT_APP_NAME: &'static str = "qcom.tz.uefisecapp";

    /// Use a different application name.
    #[must_use]
    pub const fn with_app_name(mut self, app_name: &'static str) -> Self {
        self.app_name = app_name;
        self
    }

    /// Use a different initial arena size.
    #[must_use]
    pub const fn with_initial_arena_size(mut self, size: usize) -> Self {
        self.initial_arena_size = size;
        self
    }

    /// Use a different allocation granularity.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: Self::DEFAULT_APP_NAME,
            initial_arena_size: PAGE_SIZE,
            page_size: PAGE_SIZE,
        }
    }
}
