//! Runtime tunables.
//!
//! Settings live in a thread-local cell, as [`Set`](crate::Set) handles are themselves confined to
//! a single thread.

use std::cell::Cell;

/// Settings consulted by rendering and by the exponential constructions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Cardinality above which [`Set::power`](crate::Set::power) logs a warning.
    pub power_warn_threshold: usize,
    /// Whether string scalars are rendered within double quotes.
    pub quote_strings: bool,
}

impl Config {
    /// The default settings.
    pub const DEFAULT: Self = Self {
        power_warn_threshold: 20,
        quote_strings: true,
    };
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

thread_local! {
    /// Current settings for this thread.
    static CONFIG: Cell<Config> = const { Cell::new(Config::DEFAULT) };
}

/// Gets the current settings.
#[must_use]
pub fn get() -> Config {
    CONFIG.with(Cell::get)
}

/// Replaces the current settings, returning the previous ones.
pub fn set(config: Config) -> Config {
    CONFIG.with(|cell| cell.replace(config))
}

/// Runs `f` with the given settings, restoring the previous ones afterwards.
pub fn with<T, F: FnOnce() -> T>(config: Config, f: F) -> T {
    /// Restores the settings on drop, so that a panic in `f` doesn't leak them.
    struct Restore(Config);
    impl Drop for Restore {
        fn drop(&mut self) {
            set(self.0);
        }
    }

    let _restore = Restore(set(config));
    f()
}
