/// FreeRTOS tick rate of the stock IDF configuration
pub const TICK_RATE_HZ: u32 = 100;

extern "C" {
    pub fn esp_restart() -> !;
    pub fn esp_timer_get_time() -> i64;
    pub fn vTaskDelay(ticks: u32);
}

pub fn uptime_millis() -> u64 {
    (unsafe { esp_timer_get_time() } / 1000) as u64
}

/// Blocks the calling task for at least one tick
pub fn delay_ms(ms: u32) {
    let ticks = (ms * TICK_RATE_HZ / 1000).max(1);
    unsafe { vTaskDelay(ticks) }
}

pub fn restart() -> ! {
    warn!("Restarting");
    unsafe { esp_restart() }
}
