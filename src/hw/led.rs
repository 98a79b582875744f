//! Advertising indication on LED1 (active low on the nRF52840-DK).

use embassy_nrf::gpio::Output;
use embassy_time::Timer;
use light_beacon::config::{LED_OFF_MS, LED_ON_MS};

#[embassy_executor::task]
pub async fn advertising_indication(mut led: Output<'static>) -> ! {
    loop {
        led.set_low();
        Timer::after_millis(LED_ON_MS).await;
        led.set_high();
        Timer::after_millis(LED_OFF_MS).await;
    }
}
