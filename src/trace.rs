const DEFAULT_LOG_FILTER: &str = "generic_metronome=info";

pub fn setup() {
    let directives = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_owned());

    env_logger::Builder::new()
        .format_target(false)
        .parse_filters(&directives)
        .init();
}
