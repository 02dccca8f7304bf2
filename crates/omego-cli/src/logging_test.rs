use super::*;

#[test]
fn test_base_level() {
    assert_eq!(base_level(None), 20);
    assert_eq!(base_level(Some("30")), 30);
    assert_eq!(base_level(Some(" 40 ")), 40);
    assert_eq!(base_level(Some("DEBUG")), 10);
}

#[test]
fn test_verbose_and_quiet_steps() {
    assert_eq!(effective_level(20, 0, 0), 20);
    assert_eq!(effective_level(20, 1, 0), 10);
    assert_eq!(effective_level(20, 2, 0), 0);
    assert_eq!(effective_level(20, 0, 2), 40);
    assert_eq!(effective_level(20, 1, 1), 20);
}

#[test]
fn test_level_filter() {
    assert_eq!(level_filter(0), LevelFilter::TRACE);
    assert_eq!(level_filter(10), LevelFilter::DEBUG);
    assert_eq!(level_filter(20), LevelFilter::INFO);
    assert_eq!(level_filter(25), LevelFilter::INFO);
    assert_eq!(level_filter(30), LevelFilter::WARN);
    assert_eq!(level_filter(40), LevelFilter::ERROR);
    assert_eq!(level_filter(50), LevelFilter::ERROR);
    assert_eq!(level_filter(60), LevelFilter::OFF);
}
