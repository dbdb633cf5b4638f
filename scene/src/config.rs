//! Synchronization settings.

use std::time::Duration;

use codec::CodecLimits;
use schema::ComponentKind;
use serde::Deserialize;

/// Settings shared by the host and observer managers.
///
/// Deserializes from the `sync` section of the CLI config file; missing
/// fields take their defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Target sync ticks per second.
    pub tick_rate_hz: f32,
    /// Skip emission while any connection has more than this many bytes queued.
    pub max_queued_bytes: usize,
    /// Observer blends the newest frame over the host frame interval.
    pub interpolate: bool,
    /// Registered component kinds.
    pub kinds: Vec<ComponentKind>,
    pub max_string_bytes: usize,
    pub max_materials: usize,
    pub max_bones: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let limits = CodecLimits::default();
        Self {
            tick_rate_hz: 30.0,
            max_queued_bytes: 1024 * 1024,
            interpolate: false,
            kinds: ComponentKind::ALL.to_vec(),
            max_string_bytes: limits.max_string_bytes,
            max_materials: limits.max_materials,
            max_bones: limits.max_bones,
        }
    }
}

impl SyncConfig {
    /// Small limits, every kind registered.
    #[must_use]
    pub fn for_testing() -> Self {
        let limits = CodecLimits::for_testing();
        Self {
            max_queued_bytes: 64 * 1024,
            max_string_bytes: limits.max_string_bytes,
            max_materials: limits.max_materials,
            max_bones: limits.max_bones,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn codec_limits(&self) -> CodecLimits {
        CodecLimits {
            max_string_bytes: self.max_string_bytes,
            max_materials: self.max_materials,
            max_bones: self.max_bones,
        }
    }

    /// Time between ticks; rates without a representable period fall back
    /// to 30 Hz.
    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        let secs = 1.0 / self.tick_rate_hz;
        Duration::try_from_secs_f32(secs)
            .ok()
            .filter(|interval| secs.is_finite() && !interval.is_zero())
            .unwrap_or_else(|| Duration::from_secs_f32(1.0 / 30.0))
    }
}
