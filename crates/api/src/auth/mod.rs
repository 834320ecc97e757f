//! Session tokens and the cookie that carries them.

pub mod session;
