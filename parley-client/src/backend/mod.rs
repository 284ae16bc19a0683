mod rtc_backend;

pub use rtc_backend::*;
