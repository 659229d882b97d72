//! CAPTCHA generation.
//!
//! Challenges are random text rendered as an SVG image. The expected
//! answer is stored in the session by the issuing route, overwriting any
//! prior unconsumed challenge; there is no other expiry.

mod generator;

pub use generator::{CaptchaGenerator, Challenge};
