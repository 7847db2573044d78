use shadow_operative_cli::log_filter;
use tracing_subscriber::filter::LevelFilter;

#[test]
fn missing_or_blank_directives_default_to_warnings() {
    assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::WARN));
    assert_eq!(log_filter(Some("  ")).max_level_hint(), Some(LevelFilter::WARN));
}

#[test]
fn directives_can_raise_verbosity_above_the_default() {
    assert_eq!(log_filter(Some("debug")).max_level_hint(), Some(LevelFilter::DEBUG));
    assert_eq!(
        log_filter(Some("shadow_operative_system_guards=trace")).max_level_hint(),
        Some(LevelFilter::TRACE)
    );
}

#[test]
fn directives_can_lower_verbosity_below_the_default() {
    assert_eq!(log_filter(Some("error")).max_level_hint(), Some(LevelFilter::ERROR));
    assert_eq!(log_filter(Some("off")).max_level_hint(), Some(LevelFilter::OFF));
}
