//! Peripheral capabilities compiled into the image.
//!
//! Every capability is one cargo feature. Its interface module is re-exported here
//! only when the feature is enabled, otherwise referencing it fails to build:
//!
#![cfg_attr(not(feature = "button"), doc = "```compile_fail")]
#![cfg_attr(feature = "button", doc = "```")]
//! use esp_bridge::capabilities::button::ButtonEvent;
//!
//! assert_eq!(ButtonEvent::SingleClick as u32, 4);
//! ```
//!
//! Both LED strip transports may be enabled together, the board picks which
//! handle it builds.

use core::fmt;

use derive_more::Display;

#[cfg(feature = "button")]
pub use hal::button;
#[cfg(feature = "littlefs")]
pub use hal::fs;
#[cfg(feature = "led-strip")]
pub use hal::led_strip;
#[cfg(feature = "ntc")]
pub use hal::ntc;
#[cfg(feature = "bootloader-ota")]
pub use hal::ota;

#[non_exhaustive]
#[derive(Copy, Clone, Debug, Display, PartialEq, Eq)]
pub enum Capability {
    #[display(fmt = "button")]
    Button,
    #[display(fmt = "led-strip")]
    LedStrip,
    #[display(fmt = "bootloader-ota")]
    BootloaderOta,
    #[display(fmt = "ntc")]
    Ntc,
    #[display(fmt = "littlefs")]
    LittleFs,
}

impl Capability {
    pub const ALL: [Capability; 5] =
        [Self::Button, Self::LedStrip, Self::BootloaderOta, Self::Ntc, Self::LittleFs];

    /// Name of the cargo feature selecting this capability
    pub fn feature(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::LedStrip => "led-strip",
            Self::BootloaderOta => "bootloader-ota",
            Self::Ntc => "ntc",
            Self::LittleFs => "littlefs",
        }
    }

    const fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Immutable set of enabled capabilities.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FeatureFlags(u8);

impl FeatureFlags {
    pub const NONE: Self = Self(0);

    /// Capabilities this image was built with
    pub const BUILD: Self = {
        let mut flags = Self::NONE;
        if cfg!(feature = "button") {
            flags = flags.with(Capability::Button);
        }
        if cfg!(feature = "led-strip") {
            flags = flags.with(Capability::LedStrip);
        }
        if cfg!(feature = "bootloader-ota") {
            flags = flags.with(Capability::BootloaderOta);
        }
        if cfg!(feature = "ntc") {
            flags = flags.with(Capability::Ntc);
        }
        if cfg!(feature = "littlefs") {
            flags = flags.with(Capability::LittleFs);
        }
        flags
    };

    /// Bit `n` selects `Capability::ALL[n]`, unknown bits are dropped
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & ((1 << Capability::ALL.len()) - 1))
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn with(self, capability: Capability) -> Self {
        Self(self.0 | capability.bit())
    }

    pub const fn contains(self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Capability> {
        Capability::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl fmt::Display for FeatureFlags {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "none");
        }
        for (index, capability) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", capability)?;
        }
        Ok(())
    }
}

/// Native types and functions one capability brings into the image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Declaration {
    pub capability: Capability,
    pub types: &'static [&'static str],
    pub operations: &'static [&'static str],
}

pub const DECLARATIONS: [Declaration; 5] = [
    Declaration {
        capability: Capability::Button,
        types: &[
            "button_handle_t",
            "button_config_t",
            "button_gpio_config_t",
            "button_adc_config_t",
            "button_matrix_config_t",
            "button_event_t",
            "button_cb_t",
        ],
        operations: &[
            "iot_button_new_gpio_device",
            "iot_button_new_adc_device",
            "iot_button_new_matrix_device",
            "iot_button_register_cb",
            "iot_button_unregister_cb",
            "iot_button_get_event",
            "iot_button_get_key_level",
            "iot_button_delete",
        ],
    },
    Declaration {
        capability: Capability::LedStrip,
        types: &[
            "led_strip_handle_t",
            "led_strip_config_t",
            "led_strip_rmt_config_t",
            "led_strip_spi_config_t",
            "led_model_t",
            "led_color_component_format_t",
        ],
        operations: &[
            "led_strip_new_rmt_device",
            "led_strip_new_spi_device",
            "led_strip_set_pixel",
            "led_strip_set_pixel_rgbw",
            "led_strip_set_pixel_hsv",
            "led_strip_refresh",
            "led_strip_clear",
            "led_strip_del",
        ],
    },
    Declaration {
        capability: Capability::BootloaderOta,
        types: &["esp_partition_t", "esp_ota_handle_t", "esp_ota_img_states_t"],
        operations: &[
            "esp_ota_get_running_partition",
            "esp_ota_get_next_update_partition",
            "esp_ota_get_state_partition",
            "esp_ota_begin",
            "esp_ota_write",
            "esp_ota_end",
            "esp_ota_abort",
            "esp_ota_set_boot_partition",
            "esp_ota_mark_app_valid_cancel_rollback",
            "esp_ota_mark_app_invalid_rollback_and_reboot",
        ],
    },
    Declaration {
        capability: Capability::Ntc,
        types: &["ntc_device_handle_t", "ntc_config_t", "ntc_circuit_mode_t"],
        operations: &["ntc_dev_create", "ntc_dev_get_temperature", "ntc_dev_delete"],
    },
    Declaration {
        capability: Capability::LittleFs,
        types: &["esp_vfs_littlefs_conf_t"],
        operations: &[
            "esp_vfs_littlefs_register",
            "esp_vfs_littlefs_unregister",
            "esp_littlefs_mounted",
            "esp_littlefs_info",
            "open",
            "read",
            "write",
            "close",
            "unlink",
            "access",
        ],
    },
];

/// Declaration blocks of exactly the capabilities in `flags`, in `Capability::ALL` order.
pub fn surface(flags: FeatureFlags) -> impl Iterator<Item = &'static Declaration> {
    DECLARATIONS.iter().filter(move |d| flags.contains(d.capability))
}

pub fn exposed() -> impl Iterator<Item = &'static Declaration> {
    surface(FeatureFlags::BUILD)
}
