//! Host bootstrap: the single handoff from the native runtime into the application.

use core::fmt::Write;

/// Signature of the foreign application entry point, `rust_primary` on every board.
pub type EntryPoint = unsafe extern "C" fn() -> i32;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Uninitialized,
    PreCall,
    PostCall,
    Halted,
}

pub struct Bootstrap<W> {
    console: W,
    stage: Stage,
    status: Option<i32>,
}

impl<W: Write> Bootstrap<W> {
    pub fn new(console: W) -> Self {
        Self { console, stage: Stage::Uninitialized, status: None }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Calls `entry` once and reports its status without interpreting it.
    ///
    /// A bootstrap hands off only once, later calls return the observed status.
    /// If `entry` never returns neither does this.
    pub fn run(&mut self, entry: EntryPoint) -> i32 {
        if let Some(status) = self.status {
            return status;
        }
        self.stage = Stage::PreCall;
        writeln!(self.console, "booting").ok();
        let status = unsafe { entry() };
        self.stage = Stage::PostCall;
        writeln!(self.console, "status: {}", status).ok();
        self.status = Some(status);
        self.stage = Stage::Halted;
        status
    }

    pub fn into_console(self) -> W {
        self.console
    }
}

pub fn run_image<W: Write>(console: W, entry: EntryPoint) -> i32 {
    Bootstrap::new(console).run(entry)
}

#[cfg(test)]
mod test {
    use core::fmt;
    use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::string::String;
    use std::sync::{Arc, Mutex};

    extern "C" fn success() -> i32 {
        0
    }

    extern "C" fn failure() -> i32 {
        -1
    }

    #[test]
    fn test_status_reported() {
        use super::run_image;

        let mut console = String::new();
        assert_eq!(run_image(&mut console, success), 0);
        assert_eq!(console, "booting\nstatus: 0\n");

        let mut console = String::new();
        assert_eq!(run_image(&mut console, failure), -1);
        assert_eq!(console, "booting\nstatus: -1\n");
    }

    #[test]
    fn test_status_verbatim() {
        use super::run_image;

        extern "C" fn extreme() -> i32 {
            i32::MIN
        }

        let mut console = String::new();
        assert_eq!(run_image(&mut console, extreme), i32::MIN);
        assert_eq!(console, std::format!("booting\nstatus: {}\n", i32::MIN));
    }

    static CALLS: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn counted() -> i32 {
        CALLS.fetch_add(1, Ordering::SeqCst) as i32 + 42
    }

    #[test]
    fn test_single_handoff() {
        use super::{Bootstrap, Stage};

        let mut bootstrap = Bootstrap::new(String::new());
        assert_eq!(bootstrap.stage(), Stage::Uninitialized);
        assert_eq!(bootstrap.run(counted), 42);
        assert_eq!(bootstrap.stage(), Stage::Halted);
        assert_eq!(bootstrap.run(counted), 42);
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(bootstrap.into_console(), "booting\nstatus: 42\n");
    }

    static FAILED_CALLS: AtomicUsize = AtomicUsize::new(0);

    extern "C" fn failing() -> i32 {
        FAILED_CALLS.fetch_add(1, Ordering::SeqCst);
        -2
    }

    #[test]
    fn test_failure_only_reported() {
        use super::{Bootstrap, Stage};

        let mut bootstrap = Bootstrap::new(String::new());
        assert_eq!(bootstrap.run(failing), -2);
        assert_eq!(bootstrap.stage(), Stage::Halted);
        assert_eq!(bootstrap.run(failing), -2);
        assert_eq!(FAILED_CALLS.load(Ordering::SeqCst), 1);
        assert_eq!(bootstrap.into_console(), "booting\nstatus: -2\n");
    }

    #[test]
    fn test_independent_runs() {
        use super::run_image;

        let mut console = String::new();
        assert_eq!(run_image(&mut console, success), 0);
        assert_eq!(run_image(&mut console, failure), -1);
        assert_eq!(console, "booting\nstatus: 0\nbooting\nstatus: -1\n");
    }

    #[derive(Clone, Default)]
    struct Shared(Arc<Mutex<String>>);

    impl fmt::Write for Shared {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.0.lock().unwrap().push_str(s);
            Ok(())
        }
    }

    static ENTERED: AtomicBool = AtomicBool::new(false);

    extern "C" fn forever() -> i32 {
        ENTERED.store(true, Ordering::SeqCst);
        loop {
            std::thread::park();
        }
    }

    #[test]
    fn test_entry_never_returns() {
        use std::time::{Duration, Instant};

        use super::run_image;

        let console = Shared::default();
        let writer = console.clone();
        std::thread::spawn(move || run_image(writer, forever));
        let deadline = Instant::now() + Duration::from_secs(5);
        while !ENTERED.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(ENTERED.load(Ordering::SeqCst));
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(*console.0.lock().unwrap(), "booting\n");
    }
}
