//! Rendering a full lesson deck on disk

use std::fs;

use lessondok_core::{
    document_name, file_name, FieldRecord, OutputKind, RenderEvent, SubstitutionPlan,
    COMPLETION_CHECKLIST, KEY_TERMS,
};
use lessondok_pptx::test_utils::{text_shape, text_shape_lines, PptxFixture};
use lessondok_pptx::{SlideDeck, SlideMedia, SlideRenderer, FALLBACK_TEXT};
use tempfile::TempDir;

fn lesson() -> FieldRecord {
    FieldRecord::from_pairs([
        ("id", "1"),
        ("unit", "3"),
        ("period", "2"),
        ("title", "Loops"),
        ("mainTopic", "Iteration"),
        ("warmUp", "Count to ten"),
        (COMPLETION_CHECKLIST, "read ch1|do hw2"),
        (KEY_TERMS, "Loop: repeats a block|Counter: tracks passes"),
        ("videoLecture", "https://youtu.be/abc123"),
        ("lectureVideoTitle", "Loops explained"),
        ("videoTopic", "n/a"),
        ("shortsVideoTitle", "Counting"),
    ])
}

/// Twelve slides laid out like the lesson deck template
fn lesson_deck() -> Vec<u8> {
    let mut fixture = PptxFixture::new()
        .slide(&text_shape_lines(2, &["{{title}}", "Unit {{unit}} period {{period}}"]))
        .slide(&text_shape(2, "Warm up: {{warmUp}}"))
        .slide(&text_shape_lines(2, &["Key terms", "{{keyTermsAndDefinitions}}"]))
        .slide(&text_shape(2, "{{mainTopic}}"))
        .slide(&text_shape(2, "Discussion"));
    for n in 6..=10 {
        fixture = fixture.slide(&text_shape(2, &format!("Slide {}", n)));
    }
    fixture
        .slide(&text_shape(2, "Answer key"))
        .slide(&text_shape_lines(2, &["Checklist", "{{completionChecklist}}"]))
        .build()
}

#[test]
fn renders_lesson_deck_to_new_file() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("deck.pptx");
    fs::write(&template, lesson_deck()).unwrap();
    let original = fs::read(&template).unwrap();

    let record = lesson();
    let name = document_name(OutputKind::SlideDeck, &record);
    assert_eq!(name, "U3P2 Presentation Loops Iteration");
    let output = dir.path().join(file_name(&name, OutputKind::SlideDeck));

    let plan = SubstitutionPlan::slide_deck();
    let media = SlideMedia::default();
    let report = SlideRenderer::new(&plan, &media)
        .render_file(&template, &output, &record)
        .unwrap();

    assert_eq!(fs::read(&template).unwrap(), original);
    assert!(output.ends_with("U3P2 Presentation Loops Iteration.pptx"));

    let deck = SlideDeck::open(&output).unwrap();
    assert_eq!(deck.slide_count(), 12);
    assert_eq!(
        deck.slide(1).unwrap().paragraphs(),
        vec!["Loops", "Unit 3 period 2"]
    );
    assert_eq!(
        deck.slide(3).unwrap().paragraphs(),
        vec![
            "Key terms",
            "\u{2022} Loop: repeats a block.",
            "\u{2022} Counter: tracks passes."
        ]
    );
    assert_eq!(
        deck.slide(12).unwrap().paragraphs(),
        vec!["Checklist", "\u{2022} read ch1.", "\u{2022} do hw2."]
    );

    // lecture video linked, topic video fell back
    let lecture = deck.slide(6).unwrap();
    assert!(!lecture.is_hidden());
    assert!(lecture.paragraphs().contains(&"Loops explained".to_string()));
    let topic = deck.slide(7).unwrap();
    assert!(topic.is_hidden());
    assert!(topic.paragraphs().contains(&FALLBACK_TEXT.to_string()));

    assert!(deck.slide(11).unwrap().is_hidden());
    assert!(deck.slide(12).unwrap().is_hidden());
    assert_eq!(report.hidden_slides(), vec![7, 11, 12]);
    assert!(report.events().iter().any(|e| matches!(
        e,
        RenderEvent::MediaFallback { slide: 7, field, .. } if field == "videoTopic"
    )));
    assert!(report.unresolved().is_empty());
}

#[test]
fn missing_template_is_reported() {
    let dir = TempDir::new().unwrap();
    let plan = SubstitutionPlan::slide_deck();
    let media = SlideMedia::default();

    let err = SlideRenderer::new(&plan, &media)
        .render_file(
            &dir.path().join("missing.pptx"),
            &dir.path().join("out.pptx"),
            &lesson(),
        )
        .unwrap_err();

    assert_eq!(err.code(), "PPTX001");
    assert!(!dir.path().join("out.pptx").exists());
}
