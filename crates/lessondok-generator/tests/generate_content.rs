//! Content generation through a scripted generator

use lessondok_core::FieldRecord;
use lessondok_generator::test_utils::StubGenerator;
use lessondok_generator::{generate_lesson_content, PromptTemplate, ResponseMapping};

fn sequence_row() -> FieldRecord {
    FieldRecord::from_pairs([
        ("id", "7"),
        ("unit", "3"),
        ("title", "Loops"),
        ("period", "2"),
        ("mainTopic", "Iteration"),
        ("subTopics", "for, while"),
        ("bigIdeaQuiz", "Big idea 3"),
        ("lectureVideoTitle", "Loops explained"),
        ("videoLecture", "https://youtu.be/abc123"),
    ])
}

fn prompt() -> PromptTemplate {
    PromptTemplate {
        role: "You are a teacher.".to_string(),
        ..Default::default()
    }
}

#[test]
fn fenced_answer_becomes_activity_row() {
    let stub = StubGenerator::new("gpt-4o-mini").answer(
        "```json\n{\"Introduction\": \"Loops repeat work.\", \"Completion Checklist\": \"read ch1|do hw2\"}\n```",
    );

    let row = generate_lesson_content(&stub, &sequence_row(), &prompt(), &ResponseMapping::default())
        .unwrap();

    assert_eq!(row.text("introduction"), Some("Loops repeat work."));
    assert_eq!(row.text("completionChecklist"), Some("read ch1|do hw2"));
    assert_eq!(row.text("title"), Some("Loops"));
    assert_eq!(row.text("endOfLessonQuiz"), Some("Big idea 3"));
    assert_eq!(row.text("model"), Some("gpt-4o-mini"));

    let calls = stub.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].text("subTopics"), Some("for, while"));
    assert!(!calls[0].contains("videoLecture"));
}

#[test]
fn malformed_answer_is_a_parse_failure() {
    let stub = StubGenerator::new("gpt-4o-mini").answer("I cannot help with that.");

    let err = generate_lesson_content(&stub, &sequence_row(), &prompt(), &ResponseMapping::default())
        .unwrap_err();

    assert!(err.is_parse_failure());
    assert_eq!(err.raw_payload(), Some("I cannot help with that."));
}
