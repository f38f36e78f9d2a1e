//! App OTA partitions through `esp_ota_ops`.

use core::ffi::{c_char, c_void};
use core::ptr;

use hal::ota::{Ota, OtaUpdate, Slot, SlotState};

use super::{esp_err_t, EspError, ESP_ERR_NOT_FOUND};

pub type esp_ota_handle_t = u32;

const OTA_SIZE_UNKNOWN: usize = 0xFFFFFFFF;
const SUBTYPE_APP_FACTORY: u32 = 0x00;
const SUBTYPE_APP_OTA_MIN: u32 = 0x10;
const SUBTYPE_APP_OTA_LAST: u32 = 0x1F;

#[repr(C)]
pub struct esp_partition_t {
    flash_chip: *const c_void,
    partition_type: u32,
    subtype: u32,
    address: u32,
    size: u32,
    erase_size: u32,
    label: [c_char; 17],
    encrypted: bool,
    readonly: bool,
}

extern "C" {
    fn esp_ota_get_running_partition() -> *const esp_partition_t;
    fn esp_ota_get_next_update_partition(start_from: *const esp_partition_t) -> *const esp_partition_t;
    fn esp_ota_get_state_partition(partition: *const esp_partition_t, state: *mut u32) -> esp_err_t;
    fn esp_ota_begin(
        partition: *const esp_partition_t,
        image_size: usize,
        handle: *mut esp_ota_handle_t,
    ) -> esp_err_t;
    fn esp_ota_write(handle: esp_ota_handle_t, data: *const c_void, size: usize) -> esp_err_t;
    fn esp_ota_end(handle: esp_ota_handle_t) -> esp_err_t;
    fn esp_ota_abort(handle: esp_ota_handle_t) -> esp_err_t;
    fn esp_ota_set_boot_partition(partition: *const esp_partition_t) -> esp_err_t;
    fn esp_ota_mark_app_valid_cancel_rollback() -> esp_err_t;
    fn esp_ota_mark_app_invalid_rollback_and_reboot() -> esp_err_t;
}

fn to_slot(partition: *const esp_partition_t) -> Result<Slot, EspError> {
    let partition = unsafe { partition.as_ref() }.ok_or(EspError(ESP_ERR_NOT_FOUND))?;
    let index = match partition.subtype {
        SUBTYPE_APP_FACTORY => u8::MAX,
        subtype @ SUBTYPE_APP_OTA_MIN..=SUBTYPE_APP_OTA_LAST => (subtype - SUBTYPE_APP_OTA_MIN) as u8,
        _ => return Err(EspError(ESP_ERR_NOT_FOUND)),
    };
    Ok(Slot { index, address: partition.address, size: partition.size })
}

/// OTA slots of the running image, factory slot has index `u8::MAX`.
#[derive(Default)]
pub struct EspOta;

impl EspOta {
    fn next_partition(&self) -> Result<*const esp_partition_t, EspError> {
        let partition = unsafe { esp_ota_get_next_update_partition(ptr::null()) };
        match partition.is_null() {
            true => Err(EspError(ESP_ERR_NOT_FOUND)),
            false => Ok(partition),
        }
    }

    fn find(&self, slot: &Slot) -> Result<*const esp_partition_t, EspError> {
        let running = unsafe { esp_ota_get_running_partition() };
        for partition in [running, self.next_partition()?] {
            if to_slot(partition)? == *slot {
                return Ok(partition);
            }
        }
        Err(EspError(ESP_ERR_NOT_FOUND))
    }
}

impl Ota for EspOta {
    type Error = EspError;
    type Update = EspOtaUpdate;

    fn running_slot(&self) -> Result<Slot, EspError> {
        to_slot(unsafe { esp_ota_get_running_partition() })
    }

    fn next_slot(&self) -> Result<Slot, EspError> {
        to_slot(self.next_partition()?)
    }

    fn slot_state(&self, slot: &Slot) -> Result<SlotState, EspError> {
        let partition = self.find(slot)?;
        let mut state = 0u32;
        crate::esp!(esp_ota_get_state_partition(partition, &mut state))?;
        Ok(match state {
            0 => SlotState::New,
            1 => SlotState::PendingVerify,
            2 => SlotState::Valid,
            3 => SlotState::Invalid,
            4 => SlotState::Aborted,
            _ => SlotState::Undefined,
        })
    }

    fn begin(&mut self, image_size: Option<usize>) -> Result<EspOtaUpdate, EspError> {
        let partition = self.next_partition()?;
        let mut handle: esp_ota_handle_t = 0;
        let size = image_size.unwrap_or(OTA_SIZE_UNKNOWN);
        crate::esp!(esp_ota_begin(partition, size, &mut handle))?;
        Ok(EspOtaUpdate { handle, partition })
    }

    fn mark_running_valid(&mut self) -> Result<(), EspError> {
        crate::esp!(esp_ota_mark_app_valid_cancel_rollback())
    }

    /// Reboots into the previous image on success
    fn rollback(&mut self) -> Result<(), EspError> {
        crate::esp!(esp_ota_mark_app_invalid_rollback_and_reboot())
    }
}

pub struct EspOtaUpdate {
    handle: esp_ota_handle_t,
    partition: *const esp_partition_t,
}

impl OtaUpdate for EspOtaUpdate {
    type Error = EspError;

    fn write(&mut self, chunk: &[u8]) -> Result<(), EspError> {
        crate::esp!(esp_ota_write(self.handle, chunk.as_ptr() as *const c_void, chunk.len()))
    }

    /// Validates the image and selects it for the next boot
    fn complete(self) -> Result<(), EspError> {
        crate::esp!(esp_ota_end(self.handle))?;
        crate::esp!(esp_ota_set_boot_partition(self.partition))
    }

    fn abort(self) -> Result<(), EspError> {
        crate::esp!(esp_ota_abort(self.handle))
    }
}
