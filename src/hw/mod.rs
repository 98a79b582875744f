//! nRF52840 implementations of the pipeline's hardware seams.
//!
//! | Seam          | Peripheral                     |
//! |---------------|--------------------------------|
//! | `SampleClock` | TIMER3 @ 31.25 kHz, CC[0]      |
//! | `EventRouter` | PPI channel 0                  |
//! | `Converter`   | SAADC, AIN0, END interrupt     |
//! | `Radio`       | SoftDevice S140 advertising set|
//!
//! The SoftDevice owns TIMER0, RTC0 and PPI channels 17-31; everything here
//! stays clear of those.

pub mod led;
pub mod radio;
pub mod saadc;
pub mod trigger;
