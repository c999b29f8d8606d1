// Unit tests for business rules

use super::*;

fn tb(num: i32, den: i32) -> Timebase {
    Timebase::new(num, den).unwrap()
}

fn hd_stream() -> VideoStreamDescriptor {
    VideoStreamDescriptor::new(1920, 1080, "avc1", tb(1, 12800), tb(1, 50), tb(25, 1))
}

fn item(duration: f64, streams: Vec<VideoStreamDescriptor>) -> MediaItem {
    MediaItem::valid("clip.mp4", TimeSpec::from_seconds(duration), streams)
}

#[test]
fn test_matches_is_reflexive() {
    let stream = hd_stream();
    assert!(StreamCompatibility::matches(&stream, &stream));
}

#[test]
fn test_matches_is_symmetric() {
    let a = hd_stream();
    let mut b = hd_stream();
    b.height = 720;
    assert_eq!(
        StreamCompatibility::matches(&a, &b),
        StreamCompatibility::matches(&b, &a)
    );
    assert_eq!(
        StreamCompatibility::matches(&a, &hd_stream()),
        StreamCompatibility::matches(&hd_stream(), &a)
    );
}

#[test]
fn test_any_relevant_field_breaks_the_match() {
    let base = hd_stream();
    let variants: Vec<Box<dyn Fn(&mut VideoStreamDescriptor)>> = vec![
        Box::new(|s: &mut VideoStreamDescriptor| s.width = 1280),
        Box::new(|s: &mut VideoStreamDescriptor| s.height = 720),
        Box::new(|s: &mut VideoStreamDescriptor| s.codec_tag = "hvc1".to_string()),
        Box::new(|s: &mut VideoStreamDescriptor| s.tbn = tb(1, 90000)),
        Box::new(|s: &mut VideoStreamDescriptor| s.tbc = tb(1, 60)),
        Box::new(|s: &mut VideoStreamDescriptor| s.tbr = tb(30, 1)),
    ];

    for change in variants {
        let mut other = base.clone();
        change(&mut other);
        assert!(!StreamCompatibility::matches(&base, &other), "{:?}", other);
    }
}

#[test]
fn test_informational_fields_are_ignored() {
    let a = hd_stream().with_index(0).with_codec_name("h264").with_pixel_format("yuv420p");
    let b = hd_stream().with_index(3).with_codec_name("other").with_pixel_format("yuv444p");
    assert!(StreamCompatibility::matches(&a, &b));
}

#[test]
fn test_validator_rejects_fewer_than_two_items() {
    let none: Vec<MediaItem> = vec![];
    assert_eq!(
        RequestValidator::validate(&none),
        Err(DomainError::ValidationFailed(TOO_FEW_ITEMS_MESSAGE.to_string()))
    );

    let invalid_single = vec![MediaItem::invalid("a.mp4", "broken")];
    assert_eq!(
        RequestValidator::validate(&invalid_single),
        Err(DomainError::ValidationFailed(TOO_FEW_ITEMS_MESSAGE.to_string()))
    );
}

#[test]
fn test_validator_rejects_items_that_are_not_ready() {
    for bad in [MediaItem::pending("b.mp4"), MediaItem::invalid("b.mp4", "broken")] {
        let items = vec![item(1.0, vec![]), bad, item(2.0, vec![])];
        let err = RequestValidator::validate(&items).unwrap_err();
        assert!(err.is_user_facing());
        assert_eq!(err, DomainError::ValidationFailed(ITEMS_NOT_READY_MESSAGE.to_string()));
    }
}

#[test]
fn test_validator_sums_durations() {
    let items = vec![item(10.0, vec![]), item(20.0, vec![]), item(0.25, vec![])];
    assert_eq!(RequestValidator::validate(&items).unwrap().seconds, 30.25);
}

#[test]
fn test_selector_uses_demuxer_for_uniform_streams() {
    let items = vec![item(1.0, vec![hd_stream()]), item(1.0, vec![hd_stream()])];
    let decision = StrategySelector::select(&items);
    assert_eq!(decision.strategy, ConcatStrategy::Demuxer);
    assert_eq!(decision.mismatch, None);
}

#[test]
fn test_selector_uses_demuxer_without_video() {
    let items = vec![item(1.0, vec![]), item(1.0, vec![])];
    assert_eq!(StrategySelector::select(&items).strategy, ConcatStrategy::Demuxer);
}

#[test]
fn test_selector_uses_demuxer_with_a_single_stream() {
    let mut odd = hd_stream();
    odd.width = 640;
    let items = vec![item(1.0, vec![]), item(1.0, vec![odd]), item(1.0, vec![])];
    assert_eq!(StrategySelector::select(&items).strategy, ConcatStrategy::Demuxer);
}

#[test]
fn test_selector_falls_back_to_filter_on_mismatch() {
    let mut small = hd_stream();
    small.width = 1280;
    let items = vec![item(5.0, vec![hd_stream()]), item(7.0, vec![small])];
    let decision = StrategySelector::select(&items);
    assert_eq!(decision.strategy, ConcatStrategy::Filter);
    assert_eq!(decision.mismatch, Some(StreamMismatch { item: 1, stream: 0 }));
}

#[test]
fn test_selector_reports_only_the_first_mismatch() {
    let mut small = hd_stream();
    small.width = 1280;
    let items = vec![
        item(1.0, vec![hd_stream()]),
        item(1.0, vec![hd_stream(), small.clone()]),
        item(1.0, vec![small]),
        // matches the reference again, must not revert the decision
        item(1.0, vec![hd_stream()]),
    ];
    let decision = StrategySelector::select(&items);
    assert_eq!(decision.strategy, ConcatStrategy::Filter);
    assert_eq!(decision.mismatch, Some(StreamMismatch { item: 1, stream: 1 }));
}

#[test]
fn test_selector_compares_against_the_first_stream_only() {
    // b and c agree with each other but not with a
    let a = hd_stream();
    let mut b = hd_stream();
    b.codec_tag = "hvc1".to_string();
    let c = b.clone();
    let items = vec![item(1.0, vec![a]), item(1.0, vec![b]), item(1.0, vec![c])];
    assert_eq!(
        StrategySelector::select(&items).mismatch,
        Some(StreamMismatch { item: 1, stream: 0 })
    );
}

#[test]
fn test_check_paths_rejects_line_breaks() {
    let items = vec![
        MediaItem::valid("/v/a\nb.mp4", TimeSpec::from_seconds(1.0), vec![]),
        MediaItem::valid("/v/c.mp4", TimeSpec::from_seconds(1.0), vec![]),
    ];
    let err = RequestValidator::check_paths(&items).unwrap_err();
    assert!(matches!(err, DomainError::BadArgs(_)));
    assert!(err.is_user_facing());

    let carriage_return = vec![MediaItem::valid("/v/a\r.mp4", TimeSpec::zero(), vec![])];
    assert!(RequestValidator::check_paths(&carriage_return).is_err());
}

#[test]
fn test_check_paths_accepts_ordinary_names() {
    let items = vec![
        MediaItem::valid("/v/it's here.mp4", TimeSpec::from_seconds(1.0), vec![]),
        item(1.0, vec![]),
    ];
    assert!(RequestValidator::check_paths(&items).is_ok());
}
