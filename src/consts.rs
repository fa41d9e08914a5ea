/// Default firmware maximum for `numProfiles`.
pub const DEFAULT_MAX_PROFILES: usize = 8;

/// Default firmware maximum for `numLayers`.
pub const DEFAULT_MAX_LAYERS: usize = 8;

/// Default firmware maximum for `numKeys`. Key indices are bytes, so this is also the ceiling.
pub const DEFAULT_MAX_KEYS: usize = 256;

/// Default firmware maximum for `numAdvancedKeys`.
pub const DEFAULT_MAX_ADVANCED_KEYS: usize = 64;

/// Largest accepted `adcResolution`, in bits.
pub const ADC_RESOLUTION_MAX: u8 = 16;

/// First keycode of the `MO(n)` block.
pub const MO_BASE: u8 = 0xC0;

/// First keycode of the `PF(n)` block.
pub const PF_BASE: u8 = 0xC8;

/// Number of indices each parameterized block can encode.
pub const PARAM_SLOTS: u8 = 8;

/// A single-name label selects between on and off.
pub const TOGGLE_OPTION_COUNT: usize = 2;

/// Minimum length of a multi-valued label.
pub const MIN_CHOICE_OPTIONS: usize = 3;
