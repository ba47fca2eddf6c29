//! stderr logging via `env_logger`; `RUST_LOG` overrides the default `info` filter.

pub fn init() {
    let env = env_logger::Env::default().default_filter_or("info");
    // a second init (tests, embedding hosts) keeps the first logger
    let _ = env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .try_init();
}
