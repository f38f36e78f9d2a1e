//! espressif/button component.

use core::convert::TryFrom;
use core::ffi::c_void;
use core::ptr;

use hal::button::{Button, ButtonConfig, ButtonEvent, KeyScan, Listener, MatrixConfig, Wiring};
use heapless::Vec;
use spin::Mutex;

use crate::slots::Slots;

use super::{esp_err_t, EspError, ESP_ERR_NO_MEM};

pub type button_handle_t = *mut c_void;
type button_cb_t = unsafe extern "C" fn(button_handle: *mut c_void, usr_data: *mut c_void);

#[repr(C)]
struct button_config_t {
    long_press_time: u16,
    short_press_time: u16,
}

#[repr(C)]
struct button_gpio_config_t {
    gpio_num: i32,
    active_level: u8,
    enable_power_save: bool,
    disable_pull: bool,
}

#[repr(C)]
struct button_adc_config_t {
    adc_handle: *mut c_void,
    unit_id: u32,
    adc_channel: u8,
    button_index: u8,
    min: u16,
    max: u16,
}

#[repr(C)]
struct button_matrix_config_t {
    row_gpios: *const i32,
    col_gpios: *const i32,
    row_gpio_num: u32,
    col_gpio_num: u32,
}

#[repr(C)]
struct button_driver_t {
    enable_power_save: bool,
    get_key_level: unsafe extern "C" fn(driver: *mut button_driver_t) -> u8,
    enter_power_save: Option<unsafe extern "C" fn(driver: *mut button_driver_t) -> esp_err_t>,
    del: Option<unsafe extern "C" fn(driver: *mut button_driver_t) -> esp_err_t>,
}

extern "C" {
    fn iot_button_new_gpio_device(
        config: *const button_config_t,
        gpio: *const button_gpio_config_t,
        ret: *mut button_handle_t,
    ) -> esp_err_t;
    fn iot_button_new_adc_device(
        config: *const button_config_t,
        adc: *const button_adc_config_t,
        ret: *mut button_handle_t,
    ) -> esp_err_t;
    fn iot_button_new_matrix_device(
        config: *const button_config_t,
        matrix: *const button_matrix_config_t,
        ret: *mut button_handle_t,
        size: *mut usize,
    ) -> esp_err_t;
    fn iot_button_create(
        config: *const button_config_t,
        driver: *const button_driver_t,
        ret: *mut button_handle_t,
    ) -> esp_err_t;
    fn iot_button_register_cb(
        handle: button_handle_t,
        event: u32,
        event_args: *mut c_void,
        cb: button_cb_t,
        usr_data: *mut c_void,
    ) -> esp_err_t;
    fn iot_button_get_event(handle: button_handle_t) -> u32;
    fn iot_button_get_key_level(handle: button_handle_t) -> u8;
    fn iot_button_delete(handle: button_handle_t) -> esp_err_t;
}

pub const MAX_SUBSCRIPTIONS: usize = 32;
pub const MAX_MATRIX_BUTTONS: usize = 16;

#[derive(Copy, Clone)]
struct Subscription {
    /// Address of the owning button handle
    owner: usize,
    id: u32,
    listener: &'static dyn Listener,
}

static SUBSCRIPTIONS: Mutex<Slots<Subscription, MAX_SUBSCRIPTIONS>> = Mutex::new(Slots::new());

unsafe extern "C" fn on_button(handle: *mut c_void, usr_data: *mut c_void) {
    let subscription = match SUBSCRIPTIONS.lock().get(usr_data as usize) {
        Some(subscription) => *subscription,
        None => return,
    };
    if let Ok(event) = ButtonEvent::try_from(iot_button_get_event(handle)) {
        subscription.listener.on_event(subscription.id, event);
    }
}

/// Driver header followed by the scanner, recovered from the header pointer.
#[repr(C)]
struct CustomDriver {
    driver: button_driver_t,
    scan: &'static dyn KeyScan,
}

unsafe extern "C" fn custom_key_level(driver: *mut button_driver_t) -> u8 {
    (*(driver as *const CustomDriver)).scan.key_level()
}

fn raw_config(config: &ButtonConfig) -> button_config_t {
    button_config_t {
        long_press_time: config.long_press_ms(),
        short_press_time: config.short_press_ms(),
    }
}

pub struct IotButton {
    handle: button_handle_t,
    id: u32,
}

unsafe impl Send for IotButton {}

impl IotButton {
    pub fn new(wiring: Wiring, config: &ButtonConfig) -> Result<Self, EspError> {
        let raw = raw_config(config);
        let mut handle: button_handle_t = ptr::null_mut();
        match wiring {
            Wiring::Gpio(gpio) => {
                let gpio_config = button_gpio_config_t {
                    gpio_num: gpio.gpio,
                    active_level: gpio.active_level as u8,
                    enable_power_save: gpio.enable_power_save,
                    disable_pull: gpio.disable_pull,
                };
                crate::esp!(iot_button_new_gpio_device(&raw, &gpio_config, &mut handle))?;
            }
            Wiring::Adc(adc) => {
                let adc_config = button_adc_config_t {
                    adc_handle: ptr::null_mut(),
                    unit_id: adc.unit as u32,
                    adc_channel: adc.channel,
                    button_index: adc.button_index,
                    min: adc.min_mv,
                    max: adc.max_mv,
                };
                crate::esp!(iot_button_new_adc_device(&raw, &adc_config, &mut handle))?;
            }
        }
        debug!("Button {} created", wiring.id());
        Ok(Self { handle, id: wiring.id() })
    }

    /// One button per row and column crossing, ids are `0x200 | index`
    pub fn matrix(
        matrix: &MatrixConfig,
        config: &ButtonConfig,
    ) -> Result<Vec<Self, MAX_MATRIX_BUTTONS>, EspError> {
        let raw = raw_config(config);
        let matrix_config = button_matrix_config_t {
            row_gpios: matrix.rows.as_ptr(),
            col_gpios: matrix.cols.as_ptr(),
            row_gpio_num: matrix.rows.len() as u32,
            col_gpio_num: matrix.cols.len() as u32,
        };
        let mut handles = [ptr::null_mut(); MAX_MATRIX_BUTTONS];
        let mut size = handles.len();
        if matrix.buttons() > size {
            return Err(EspError(ESP_ERR_NO_MEM));
        }
        let ret = handles.as_mut_ptr();
        crate::esp!(iot_button_new_matrix_device(&raw, &matrix_config, ret, &mut size))?;
        let mut buttons = Vec::new();
        for (index, handle) in handles[..size].iter().enumerate() {
            buttons.push(Self { handle: *handle, id: 0x200 | index as u32 }).ok();
        }
        Ok(buttons)
    }

    /// Button whose level comes from `scan`, for keys outside the stock wirings
    pub fn custom(id: u32, scan: &'static dyn KeyScan, config: &ButtonConfig) -> Result<Self, EspError> {
        let driver = button_driver_t {
            enable_power_save: false,
            get_key_level: custom_key_level,
            enter_power_save: None,
            del: None,
        };
        let custom: &'static mut CustomDriver = match alloc_driver(CustomDriver { driver, scan }) {
            Some(custom) => custom,
            None => return Err(EspError(ESP_ERR_NO_MEM)),
        };
        let mut handle: button_handle_t = ptr::null_mut();
        crate::esp!(iot_button_create(&raw_config(config), &custom.driver, &mut handle))?;
        Ok(Self { handle, id })
    }
}

const MAX_CUSTOM_DRIVERS: usize = 4;

/// Driver descriptors must outlive the button, the component keeps the pointer
fn alloc_driver(driver: CustomDriver) -> Option<&'static mut CustomDriver> {
    static mut DRIVERS: [Option<CustomDriver>; MAX_CUSTOM_DRIVERS] = [None, None, None, None];
    static NEXT: Mutex<usize> = Mutex::new(0);
    let mut next = NEXT.lock();
    if *next >= MAX_CUSTOM_DRIVERS {
        return None;
    }
    let slot = unsafe { &mut DRIVERS[*next] };
    *next += 1;
    Some(slot.insert(driver))
}

impl Button for IotButton {
    type Error = EspError;

    fn id(&self) -> u32 {
        self.id
    }

    fn is_pressed(&self) -> bool {
        unsafe { iot_button_get_key_level(self.handle) != 0 }
    }

    fn subscribe(&mut self, event: ButtonEvent, listener: &'static dyn Listener) -> Result<(), EspError> {
        let subscription = Subscription { owner: self.handle as usize, id: self.id, listener };
        let index = SUBSCRIPTIONS.lock().insert(subscription).ok_or(EspError(ESP_ERR_NO_MEM))?;
        let usr_data = index as *mut c_void;
        let handle = self.handle;
        crate::esp!(iot_button_register_cb(handle, event as u32, ptr::null_mut(), on_button, usr_data))
    }
}

impl Drop for IotButton {
    fn drop(&mut self) {
        if let Err(e) = crate::esp!(iot_button_delete(self.handle)) {
            warn!("Button {} delete failed: {}", self.id, e);
        }
        let owner = self.handle as usize;
        SUBSCRIPTIONS.lock().retain(|subscription| subscription.owner != owner);
    }
}
