//! HTTP-facing pieces: the serving capability, the standard contact page,
//! the reCAPTCHA submission handler and the Askama templates.

pub mod contact;
pub mod handler;
pub mod handlers;
pub mod serve;

pub use contact::ContactFormPage;
pub use handler::{CaptchaGate, INVALID_CAPTCHA};
pub use serve::{PageRequest, PageResponse, RenderContext, ServeError, ServePage, ServeResult};
