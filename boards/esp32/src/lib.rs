#![no_std]

#[macro_use]
extern crate esp_bridge;
#[macro_use]
extern crate log;

use core::panic::PanicInfo;
use core::ptr::addr_of_mut;

use chips::esp_idf::button::IotButton;
use chips::esp_idf::console::Console;
use chips::esp_idf::led_strip::RmtLedStrip;
use chips::esp_idf::ledc::{LedcConfig, LedcPwm};
use chips::esp_idf::littlefs::LittleFs;
use chips::esp_idf::ntc::NtcThermistor;
use chips::esp_idf::ota::EspOta;
use chips::esp_idf::{system, EspError, ESP_ERR_INVALID_STATE};
use esp_bridge::app::{self, Board, Idle, Peripherals};
use esp_bridge::event::EventQueue;
use esp_bridge::{boot, logger};
use fugit::ExtU32;
use hal::button::{ButtonConfig, GpioConfig, Wiring};
use hal::led_strip::rmt::RmtConfig;
use hal::led_strip::StripConfig;
use hal::ntc::ThermistorConfig;
use log::LevelFilter;

const LED_GPIO: i32 = 10;
const PIXELS: u32 = 4;
const MOTOR_GPIO: i32 = 5;
/// Speed up, slow down and stop
const BUTTON_GPIOS: [i32; 3] = [6, 7, 8];
const NTC_ADC_CHANNEL: u8 = 2;
const IDLE_MS: u32 = 10;

#[derive(Default)]
pub struct EspBoard {
    taken: bool,
}

impl Board for EspBoard {
    type Error = EspError;
    type Motor = LedcPwm;
    type Strip = RmtLedStrip;
    type Button = IotButton;
    type Thermistor = NtcThermistor;
    type FileSystem = LittleFs;
    type Ota = EspOta;

    fn name(&self) -> &'static str {
        "esp32"
    }

    fn take(&mut self) -> Result<Peripherals<Self>, EspError> {
        if self.taken {
            return Err(EspError(ESP_ERR_INVALID_STATE));
        }
        self.taken = true;

        let strip = RmtLedStrip::new(&StripConfig::new(LED_GPIO, PIXELS), &RmtConfig::default())?;
        let motor = LedcPwm::new(LedcConfig::new(MOTOR_GPIO))?;
        let config = ButtonConfig { long_press_time: Some(1500.millis()), short_press_time: None };
        let mut buttons = heapless::Vec::new();
        for gpio in BUTTON_GPIOS.iter() {
            let button = IotButton::new(Wiring::Gpio(GpioConfig::new(*gpio)), &config)?;
            buttons.push(button).ok();
        }
        let thermistor = NtcThermistor::new(&ThermistorConfig::ntc_10k(0, NTC_ADC_CHANNEL))?;
        Ok(Peripherals { motor, strip, buttons, thermistor, fs: LittleFs::new(), ota: EspOta })
    }

    fn millis(&self) -> u64 {
        system::uptime_millis()
    }

    fn idle(&mut self) -> Idle {
        system::delay_ms(IDLE_MS);
        Idle::Continue
    }
}

static EVENTS: EventQueue = EventQueue::new();
static mut LOG_BUFFER: [u8; 2048] = [0u8; 2048];
static mut CONSOLE: Console = Console;

fn log_to_console(line: &str) {
    println!("{}", line);
}

#[no_mangle]
pub extern "C" fn rust_primary() -> i32 {
    let (buffer, console) = unsafe { (&mut *addr_of_mut!(LOG_BUFFER), &mut *addr_of_mut!(CONSOLE)) };
    esp_bridge::console::init(console);
    logger::init(buffer, LevelFilter::Info, system::uptime_millis, Some(log_to_console));
    app::main(EspBoard::default(), &EVENTS)
}

/// Called by the IDF main task once the scheduler runs, returns to IDF after reporting.
#[no_mangle]
pub extern "C" fn app_main() {
    boot::run_image(Console, rust_primary);
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    error!("{}", info);
    println!("Log history:");
    esp_bridge::console::__write_console(format_args!("{}", LogHistory));
    system::restart()
}

struct LogHistory;

impl core::fmt::Display for LogHistory {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        logger::dump(f)
    }
}
