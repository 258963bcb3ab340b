//! Configuration primitives for the TLE7230 driver.

/// User-facing configuration for the TLE7230 pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Send a reset command to both devices during initialization.
    pub reset_on_init: bool,
    /// Skip the `CTL` write of a relay update when the register already
    /// holds the requested value.
    ///
    /// Leaving this off keeps one write per update, which also refreshes
    /// the diagnosis word.
    pub skip_redundant_writes: bool,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Resets both devices' registers during initialization.
    pub fn reset_on_init(mut self, enabled: bool) -> Self {
        self.config.reset_on_init = enabled;
        self
    }

    /// Skips `CTL` writes that would not change the register.
    pub fn skip_redundant_writes(mut self, enabled: bool) -> Self {
        self.config.skip_redundant_writes = enabled;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reset_on_init: false,
            skip_redundant_writes: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn builder_overrides_defaults() {
        let config = Config::new()
            .reset_on_init(true)
            .skip_redundant_writes(true)
            .build();
        assert!(config.reset_on_init);
        assert!(config.skip_redundant_writes);
        assert_eq!(Config::new().build(), Config::default());
    }
}
