/// Re-export `Config` from `parsegate-core` for use within this crate.
///
/// Environment parsing lives in `parsegate-core` so the classifier backend can
/// read the same settings without depending on the server.
pub use parsegate_core::config::Config;
