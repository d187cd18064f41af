//! Peripheral drivers built on `embedded-hal`.

pub mod activity_led;
