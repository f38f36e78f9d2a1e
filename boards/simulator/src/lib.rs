#[macro_use]
extern crate log;

pub mod peripherals;

use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use std::sync::Mutex;

use drivers::logfs::LogFs;
use esp_bridge::app::{self, Board, Idle, Peripherals};
use esp_bridge::capabilities::button::ButtonEvent;
use esp_bridge::capabilities::fs::{FileSystem, MountConfig};
use esp_bridge::event::{Event, EventQueue};

use peripherals::{SharedFlash, SimButton, SimOta, SimPwm, SimStrip, SimThermistor, SECTOR_WORDS};

/// GPIOs of the speed up, slow down and stop buttons
pub const BUTTON_GPIOS: [u32; 3] = [6, 7, 8];
pub const STEP_MS: u64 = 1000;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Step {
    /// Single click on button 1 to 3
    Click(usize),
    Speed(u8),
    Temperature(f32),
    Shutdown,
}

impl std::str::FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        let (name, value) = match s.trim().split_once(':') {
            Some((name, value)) => (name, Some(value)),
            None => (s.trim(), None),
        };
        let invalid = || format!("Invalid step {}", s);
        match (name, value) {
            ("click", Some(value)) => match value.parse::<usize>() {
                Ok(button) if (1..=BUTTON_GPIOS.len()).contains(&button) => Ok(Self::Click(button)),
                _ => Err(invalid()),
            },
            ("speed", Some(value)) => value.parse().map(Self::Speed).map_err(|_| invalid()),
            ("temp", Some(value)) => value.parse().map(Self::Temperature).map_err(|_| invalid()),
            ("shutdown", None) => Ok(Self::Shutdown),
            _ => Err(invalid()),
        }
    }
}

/// Parses `click:1,speed:5,temp:70,shutdown`
pub fn parse_script(script: &str) -> Result<Vec<Step>, String> {
    script.split(',').filter(|s| !s.trim().is_empty()).map(str::parse).collect()
}

/// Handles kept by the board to drive and inspect the peripherals.
#[derive(Clone, Default)]
pub struct Probe {
    pub pwm: SimPwm,
    pub strip: SimStrip,
    pub buttons: Vec<SimButton>,
    pub thermistor: SimThermistor,
    pub flash: SharedFlash,
    pub ota: SimOta,
}

pub struct Simulator {
    events: &'static EventQueue,
    script: VecDeque<Step>,
    millis: u64,
    probe: Probe,
    taken: bool,
}

impl Simulator {
    pub fn new(events: &'static EventQueue, script: Vec<Step>) -> Self {
        let buttons = BUTTON_GPIOS.iter().map(|gpio| SimButton::new(*gpio)).collect();
        let probe = Probe { buttons, ..Default::default() };
        Self { events, script: script.into(), millis: 0, probe, taken: false }
    }

    /// Stores `config` as the config file before boot
    pub fn with_config(self, config: &[u8]) -> Result<Self, String> {
        let mut fs = LogFs::new(self.probe.flash.clone(), SECTOR_WORDS);
        fs.mount(&MountConfig::default()).map_err(|e| format!("Mount failed: {}", e))?;
        let path = esp_bridge::config::PATH;
        fs.write(path, config).map_err(|e| format!("Write {} failed: {}", path, e))?;
        fs.unmount().map_err(|e| format!("Unmount failed: {}", e))?;
        Ok(self)
    }

    pub fn probe(&self) -> Probe {
        self.probe.clone()
    }

    fn play(&mut self, step: Step) {
        debug!("Step {:?}", step);
        match step {
            Step::Click(button) => self.probe.buttons[button - 1].fire(ButtonEvent::SingleClick),
            Step::Speed(speed) => {
                self.events.push(Event::SetSpeed(speed));
            }
            Step::Temperature(celsius) => self.probe.thermistor.set(celsius),
            Step::Shutdown => {
                self.events.push(Event::Shutdown);
            }
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AlreadyTaken;

impl Board for Simulator {
    type Error = AlreadyTaken;
    type Motor = SimPwm;
    type Strip = SimStrip;
    type Button = SimButton;
    type Thermistor = SimThermistor;
    type FileSystem = LogFs<SharedFlash>;
    type Ota = SimOta;

    fn name(&self) -> &'static str {
        "simulator"
    }

    fn take(&mut self) -> Result<Peripherals<Self>, AlreadyTaken> {
        if self.taken {
            return Err(AlreadyTaken);
        }
        self.taken = true;
        let probe = self.probe.clone();
        Ok(Peripherals {
            motor: probe.pwm,
            strip: probe.strip,
            buttons: probe.buttons.into_iter().collect(),
            thermistor: probe.thermistor,
            fs: LogFs::new(probe.flash, SECTOR_WORDS),
            ota: probe.ota,
        })
    }

    fn millis(&self) -> u64 {
        self.millis
    }

    /// Each idle period plays the next scripted step
    fn idle(&mut self) -> Idle {
        self.millis += STEP_MS;
        match self.script.pop_front() {
            Some(step) => {
                self.play(step);
                Idle::Continue
            }
            None => Idle::Halt,
        }
    }
}

static EVENTS: EventQueue = EventQueue::new();
static SETUP: Mutex<Option<Setup>> = Mutex::new(None);

#[derive(Clone, Debug, Default)]
pub struct Setup {
    pub script: Vec<Step>,
    pub config: Option<Vec<u8>>,
}

/// Scenario played by the next `rust_primary` call
pub fn configure(setup: Setup) {
    *SETUP.lock().unwrap_or_else(|e| e.into_inner()) = Some(setup);
}

#[no_mangle]
pub extern "C" fn rust_primary() -> i32 {
    let setup = SETUP.lock().unwrap_or_else(|e| e.into_inner()).take().unwrap_or_default();
    EVENTS.clear();
    let simulator = Simulator::new(&EVENTS, setup.script);
    let simulator = match setup.config {
        Some(config) => match simulator.with_config(&config) {
            Ok(simulator) => simulator,
            Err(e) => {
                error!("{}", e);
                return -1;
            }
        },
        None => simulator,
    };
    app::main(simulator, &EVENTS)
}

/// Process standard output as bootstrap console.
#[derive(Copy, Clone, Debug, Default)]
pub struct Stdout;

impl fmt::Write for Stdout {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut stdout = std::io::stdout();
        stdout.write_all(s.as_bytes()).and_then(|_| stdout.flush()).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod test {
    use esp_bridge::capabilities::led_strip::Rgb;
    use esp_bridge::event::EventQueue;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    use super::{Probe, Simulator, Step};

    fn run(script: Vec<Step>) -> (i32, Probe) {
        let events: &'static EventQueue = Box::leak(Box::new(EventQueue::new()));
        let simulator = Simulator::new(events, script);
        let probe = simulator.probe();
        (esp_bridge::app::main(simulator, events), probe)
    }

    #[test]
    fn test_parse_script() {
        use super::parse_script;

        let script = parse_script("click:1, speed:5,temp:70.5,shutdown").unwrap();
        let expected =
            vec![Step::Click(1), Step::Speed(5), Step::Temperature(70.5), Step::Shutdown];
        assert_eq!(script, expected);
        assert_eq!(parse_script("").unwrap(), Vec::<Step>::new());
        assert!(parse_script("click:4").is_err());
        assert!(parse_script("speed").is_err());
        assert!(parse_script("jump:1").is_err());
    }

    #[test]
    fn test_speed_buttons() {
        let script = vec![Step::Click(1), Step::Click(1), Step::Click(1), Step::Click(2), Step::Shutdown];
        let (status, probe) = run(script);
        assert_eq!(status, 0);
        assert_eq!(probe.pwm.duties(), vec![0, 520, 550, 570, 550, 0]);
        assert!(!probe.pwm.is_enabled());

        let black = Rgb::BLACK;
        let idle = Rgb::new(100, 100, 100);
        let blue = Rgb::new(0, 17, 199);
        let frames = probe.strip.frames();
        assert_eq!(frames.first(), Some(&[Rgb::new(0, 0, 100), black, black, black]));
        assert_eq!(frames[2], [black, black, blue, blue]);
        assert_eq!(frames[4], [blue, blue, blue, blue]);
        assert_eq!(frames.last(), Some(&[black, black, black, idle]));
    }

    #[test]
    fn test_stop_button() {
        let (status, probe) = run(vec![Step::Speed(12), Step::Click(3), Step::Shutdown]);
        assert_eq!(status, 0);
        assert_eq!(probe.pwm.duties(), vec![0, 800, 0, 0]);
    }

    #[test]
    fn test_halt_without_shutdown() {
        let (status, probe) = run(vec![Step::Speed(20)]);
        assert_eq!(status, 0);
        assert_eq!(probe.pwm.duties(), vec![0, 1000, 0]);
    }

    #[test]
    fn test_overheat() {
        let script = vec![Step::Speed(10), Step::Temperature(70.0), Step::Click(1), Step::Speed(5)];
        let (status, probe) = run(script);
        assert_eq!(status, 0);
        assert_eq!(probe.pwm.duties(), vec![0, 750, 0, 0]);
    }

    #[test]
    fn test_config_created() {
        use drivers::logfs::LogFs;
        use esp_bridge::capabilities::fs::{FileSystem, MountConfig};
        use esp_bridge::config::{parse, Config, PATH};

        use super::peripherals::SECTOR_WORDS;

        let (status, probe) = run(vec![Step::Shutdown]);
        assert_eq!(status, 0);
        let mut fs = LogFs::new(probe.flash, SECTOR_WORDS);
        fs.mount(&MountConfig::default()).unwrap();
        let mut buffer = [0u8; 512];
        let size = fs.read(PATH, &mut buffer).unwrap();
        assert_eq!(parse(&buffer[..size]).unwrap(), Config::default());
    }

    #[test]
    fn test_preloaded_config() {
        let events: &'static EventQueue = Box::leak(Box::new(EventQueue::new()));
        let config = br#"{"motor":{"min_power":20,"max_power":60}}"#;
        let script = vec![Step::Speed(20), Step::Shutdown];
        let simulator = Simulator::new(events, script).with_config(config).unwrap();
        let probe = simulator.probe();
        assert_eq!(esp_bridge::app::main(simulator, events), 0);
        assert_eq!(probe.pwm.duties(), vec![0, 600, 0]);
    }

    #[test]
    fn test_malformed_config() {
        let events: &'static EventQueue = Box::leak(Box::new(EventQueue::new()));
        let script = vec![Step::Speed(20), Step::Shutdown];
        let simulator = Simulator::new(events, script).with_config(b"{motor").unwrap();
        let probe = simulator.probe();
        assert_eq!(esp_bridge::app::main(simulator, events), 0);
        assert_eq!(probe.pwm.duties(), vec![0, 1000, 0]);
    }

    #[test]
    fn test_ota_confirmed() {
        use esp_bridge::capabilities::ota::SlotState;

        let (_, probe) = run(vec![Step::Shutdown]);
        assert_eq!(probe.ota.state().states[0], Some(SlotState::Valid));
    }

    #[test]
    fn test_peripherals_taken_once() {
        use esp_bridge::app::Board;

        let events: &'static EventQueue = Box::leak(Box::new(EventQueue::new()));
        let mut simulator = Simulator::new(events, vec![Step::Shutdown]);
        assert!(simulator.take().is_ok());
        assert_eq!(esp_bridge::app::main(simulator, events), -1);
    }

    #[test]
    #[serial]
    fn test_entry_point() {
        use esp_bridge::boot::run_image;

        use super::{configure, rust_primary, Setup};

        configure(Setup { script: vec![Step::Shutdown], config: None });
        let mut console = String::new();
        assert_eq!(run_image(&mut console, rust_primary), 0);
        assert_eq!(console, "booting\nstatus: 0\n");
    }

    #[test]
    #[serial]
    fn test_entry_point_failure() {
        use esp_bridge::boot::run_image;

        use super::{configure, rust_primary, Setup};

        let config = vec![b'x'; 8192];
        configure(Setup { script: vec![Step::Shutdown], config: Some(config) });
        let mut console = String::new();
        assert_eq!(run_image(&mut console, rust_primary), -1);
        assert_eq!(console, "booting\nstatus: -1\n");
    }
}
