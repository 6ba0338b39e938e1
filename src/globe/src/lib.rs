pub mod config;
pub mod error;
pub mod timeline;
pub mod types;

pub mod camera;
pub mod orientation;
pub mod auto_rotation;
pub mod route;
pub mod overlay;
pub mod nudge;

pub mod state;
pub use state::*;

pub use config::GlobeConfig;
pub use error::ConfigError;

/// Route `log` output to stderr. `RUST_LOG` overrides the default of `warn`.
#[cfg(feature = "debug")]
pub fn init_debug() {
    use log::LevelFilter;

    // Another logger may already be installed by the host.
    let _ = env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .parse_default_env()
        .try_init();
}
