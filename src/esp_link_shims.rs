//! Time driver symbols for `async-io-mini` timers.
//!
//! `async_io_mini::Timer` reads ticks and registers wakers through the
//! embassy-time driver interface (`_embassy_time_now`,
//! `_embassy_time_schedule_wake`) at the default 1 MHz tick rate. On the
//! device the clock is `esp_timer`; on the host it is a monotonic origin
//! taken on first use.

use core::task::Waker;
use core::time::Duration;

use log::error;

#[cfg(target_os = "espidf")]
fn now_micros() -> u64 {
    // SAFETY: reads the free-running system timer, valid from any task.
    unsafe { esp_idf_svc::sys::esp_timer_get_time() as u64 }
}

#[cfg(not(target_os = "espidf"))]
fn now_micros() -> u64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    ORIGIN.get_or_init(Instant::now).elapsed().as_micros() as u64
}

#[unsafe(no_mangle)]
fn _embassy_time_now() -> u64 {
    now_micros()
}

/// Wake `waker` once the clock reaches `at` (microseconds).
#[unsafe(no_mangle)]
fn _embassy_time_schedule_wake(at: u64, waker: &Waker) {
    let now = now_micros();
    if at <= now {
        waker.wake_by_ref();
        return;
    }

    let sleeper = waker.clone();
    let spawned = std::thread::Builder::new()
        .name("timer-wake".into())
        .spawn(move || {
            std::thread::sleep(Duration::from_micros(at - now));
            sleeper.wake();
        });
    if let Err(e) = spawned {
        // The timer re-polls and schedules again.
        error!("timer: wake thread spawn failed: {e}");
        waker.wake_by_ref();
    }
}
