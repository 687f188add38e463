//! End-to-end batch conversion scenarios

use std::path::Path;
use std::sync::mpsc;

use pixshift::orchestrator::{run_batch, spawn_batch, CancelToken, ProgressEvent};
use pixshift::{
    BatchPolicy, ConversionRequest, Error, JobState, OutputFormat, SizePreset, SizeSpec,
    SourceImage, Unit,
};

fn source(width: u32, height: u32) -> SourceImage {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut buf = Vec::new();
    pixshift::image::compress_to_png(&img, &mut buf, pixshift::PngCompression::Fast).unwrap();
    SourceImage::from_bytes(&buf, "name").unwrap()
}

fn px(width: f64, height: f64) -> SizeSpec {
    SizeSpec::Custom {
        width,
        height,
        unit: Unit::Pixel,
    }
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn webp_batch_produces_expected_files() {
    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new(
        source(2000, 2000),
        OutputFormat::WebP,
        vec![px(128.0, 128.0), px(512.0, 512.0)],
    );

    let outcome = run_batch(&request, dir.path(), &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(outcome.state, JobState::Completed);
    assert_eq!(
        file_names(dir.path()),
        vec!["name_128x128.webp", "name_512x512.webp"]
    );

    for path in &outcome.written {
        let decoded = image::open(path).unwrap();
        assert!(decoded.width() <= 512);
    }
}

#[test]
fn cancel_between_sizes_stops_the_batch() {
    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new(
        source(400, 400),
        OutputFormat::Png,
        vec![px(100.0, 100.0), px(200.0, 200.0), px(300.0, 300.0)],
    );

    let token = CancelToken::new();
    let cancel_after_first = token.clone();

    // cancellation is only observed at the next item boundary
    let outcome = run_batch(&request, dir.path(), &token, move |event| {
        if matches!(event, ProgressEvent::ItemCompleted { index: 0, .. }) {
            cancel_after_first.cancel();
        }
    })
    .unwrap();

    assert_eq!(outcome.state, JobState::Cancelled);
    assert_eq!(outcome.written.len(), 1);
    assert_eq!(file_names(dir.path()), vec!["name_100x100.png"]);
}

#[test]
fn fail_fast_aborts_on_first_bad_size() {
    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new(
        source(100, 100),
        OutputFormat::Png,
        vec![px(50.0, 50.0), px(-1.0, 50.0), px(60.0, 60.0)],
    );

    let outcome = run_batch(&request, dir.path(), &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(outcome.state, JobState::Failed);
    assert_eq!(outcome.written.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(outcome.failures[0].1, Error::InvalidDimension(_)));
}

#[test]
fn continue_on_error_converts_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let mut request = ConversionRequest::new(
        source(100, 100),
        OutputFormat::Png,
        vec![px(50.0, 50.0), px(-1.0, 50.0), px(60.0, 60.0)],
    );
    request.policy = BatchPolicy::ContinueOnError;

    let outcome = run_batch(&request, dir.path(), &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(outcome.state, JobState::Completed);
    assert_eq!(
        file_names(dir.path()),
        vec!["name_50x50.png", "name_60x60.png"]
    );
    assert_eq!(outcome.failures.len(), 1);
}

#[test]
fn oversized_targets_are_skipped_with_a_reason() {
    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new(
        source(100, 100),
        OutputFormat::Png,
        vec![px(9000.0, 100.0), px(50.0, 50.0)],
    );

    let outcome = run_batch(&request, dir.path(), &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(outcome.state, JobState::Completed);
    assert_eq!(outcome.skipped.len(), 1);
    assert!(outcome.skipped[0].1.contains("8000"));
    assert_eq!(file_names(dir.path()), vec!["name_50x50.png"]);
}

#[test]
fn ico_batch_reports_downscaling() {
    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new(
        source(800, 800),
        OutputFormat::Ico,
        vec![px(512.0, 512.0)],
    );

    let outcome = run_batch(&request, dir.path(), &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(outcome.state, JobState::Completed);
    assert_eq!(outcome.reports[0].dimensions, (256, 256));
    assert!(outcome.reports[0]
        .notes
        .iter()
        .any(|note| note.contains("downscaled")));

    let decoded = image::open(&outcome.written[0]).unwrap();
    assert!(decoded.width() <= 256 && decoded.height() <= 256);
}

#[test]
fn unwritable_destination_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"file in the way").unwrap();

    let request = ConversionRequest::new(
        source(100, 100),
        OutputFormat::Png,
        vec![px(50.0, 50.0)],
    );

    let err = run_batch(&request, &blocker, &CancelToken::new(), |_| {}).unwrap_err();
    assert!(matches!(err, Error::UnwritableDestination { .. }));
}

#[test]
fn worker_thread_streams_progress_events() {
    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new(
        source(200, 200),
        OutputFormat::Jpg,
        vec![px(100.0, 100.0), SizeSpec::Preset(SizePreset::Px128)],
    );

    let (event_tx, event_rx) = mpsc::channel();
    let handle = spawn_batch(
        request,
        dir.path().to_path_buf(),
        CancelToken::new(),
        event_tx,
    );

    // track state the way a frontend would, starting idle
    let mut state = JobState::default();
    assert_eq!(state, JobState::Idle);

    let mut events = Vec::new();
    for event in event_rx {
        if let ProgressEvent::BatchFinished { state: finished } = &event {
            state = *finished;
        }
        events.push(event);
    }
    let outcome = handle.join().unwrap().unwrap();

    assert_eq!(state, JobState::Completed);
    assert_eq!(outcome.state, JobState::Completed);
    assert!(matches!(
        events.first(),
        Some(ProgressEvent::BatchStarted { total: 2 })
    ));
    assert!(matches!(
        events.last(),
        Some(ProgressEvent::BatchFinished {
            state: JobState::Completed
        })
    ));
    let completed = events
        .iter()
        .filter(|event| matches!(event, ProgressEvent::ItemCompleted { .. }))
        .count();
    assert_eq!(completed, 2);
}

#[test]
fn colliding_names_get_a_counter_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new(
        source(100, 100),
        OutputFormat::Png,
        vec![px(50.0, 50.0)],
    );

    run_batch(&request, dir.path(), &CancelToken::new(), |_| {}).unwrap();
    run_batch(&request, dir.path(), &CancelToken::new(), |_| {}).unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec!["name_50x50.png", "name_50x50_1.png"]
    );
}

#[test]
fn preview_leaves_the_destination_untouched() {
    let request = ConversionRequest::new(
        source(300, 300),
        OutputFormat::WebP,
        vec![px(100.0, 100.0)],
    );

    let preview = pixshift::preview::preview(&request).unwrap();
    assert_eq!(preview.outcome.state, JobState::Completed);

    let (report, path) = preview.items().next().unwrap();
    assert_eq!(report.file_name, "name_100x100.webp");
    assert!(report.encoded_len > 0);
    assert!(path.exists());

    let scratch = preview.dir().to_path_buf();
    drop(preview);
    assert!(!scratch.exists());
}
