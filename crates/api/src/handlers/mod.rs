//! HTTP-Handler

pub mod audio;
pub mod raeume;
