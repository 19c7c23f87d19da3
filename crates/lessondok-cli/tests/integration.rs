//! Integration tests for the lessondok CLI
//!
//! These tests run the generation commands against a CSV store and
//! templates in a temporary directory.

use std::fs;
use std::path::Path;

use lessondok_cli::{documents_command, RunReport, Settings};
use lessondok_core::{OutputKind, RenderReport};
use lessondok_data::{CsvStore, RecordStore};
use lessondok_ooxml::test_utils::{checklist_table, extract_document_xml, DocxFixture};
use lessondok_pptx::test_utils::{text_shape_lines, PptxFixture};
use lessondok_pptx::{SlideDeck, SlideMedia};
use tempfile::TempDir;

const CONTENT: &str = "\
id,unit,period,title,mainTopic,completionChecklist,akTrueFalse,activityDocCreated,slideCreated,lessonPlanCreated,activityLink,slideLink
1,3,2,Loops,Iteration,read ch1|do hw2,False,FALSE,FALSE,FALSE,,
2,3,3,Sets,Collections,a,True,TRUE,TRUE,TRUE,,
";

/// Store, templates and settings for one course
fn course(dir: &Path) -> Settings {
    let root = dir.join("lessons");
    fs::create_dir_all(&root).unwrap();
    fs::write(root.join("activity_content.csv"), CONTENT).unwrap();

    let body = format!(
        "{}<w:p><w:r><w:t>Answer: {{{{akTrueFalse}}}}</w:t></w:r></w:p>",
        checklist_table("{{completionChecklist}}")
    );
    let docx = DocxFixture::new(&body)
        .header(r#"<w:p><w:r><w:t>{{title}}</w:t></w:r></w:p>"#)
        .build();
    fs::write(dir.join("activity.docx"), &docx).unwrap();
    fs::write(dir.join("plan.docx"), &docx).unwrap();
    let pptx = PptxFixture::new()
        .slide(&text_shape_lines(2, &["{{title}}", "{{completionChecklist}}"]))
        .build();
    fs::write(dir.join("deck.pptx"), pptx).unwrap();

    let toml = r#"
[store]
root = "lessons"

[templates]
activity_document = "activity.docx"
slide_deck = "deck.pptx"
lesson_plan = "plan.docx"
output_dir = "generated"

[pacing]
render_ms = 0
"#;
    let mut settings = Settings::from_toml_str(toml).unwrap().relative_to(dir);
    settings.slides = SlideMedia::none();
    fs::create_dir_all(dir.join("generated")).unwrap();
    settings
}

fn created_report<'a>(report: &'a RunReport, path: &Path) -> &'a RenderReport {
    &report
        .created
        .iter()
        .find(|doc| doc.path == path)
        .expect("document was created")
        .report
}

#[test]
fn test_all_creates_every_missing_document() {
    let dir = TempDir::new().unwrap();
    let settings = course(dir.path());

    let report = documents_command(&settings, &OutputKind::ALL, false).unwrap();

    assert!(!report.has_failures(), "{:?}", report.failures);
    assert_eq!(report.created.len(), 3);
    assert_eq!(report.up_to_date, 1);

    let generated = dir.path().join("generated");
    let activity = generated.join("U3P2 Activity Document Loops Iteration.docx");
    let deck = generated.join("U3P2 Presentation Loops Iteration.pptx");
    let plan = generated.join("U3P2 Lesson Plan Loops Iteration.docx");
    assert!(activity.is_file());
    assert!(deck.is_file());
    assert!(plan.is_file());

    let xml = extract_document_xml(&fs::read(&activity).unwrap());
    assert!(xml.contains("read ch1."));
    assert!(xml.contains("do hw2."));
    assert!(!xml.contains("{{completionChecklist}}"));
    assert!(xml.contains("Answer: False"));
    assert!(created_report(&report, &activity).unresolved().is_empty());

    let slides = SlideDeck::open(&deck).unwrap();
    assert_eq!(
        slides.slide(1).unwrap().paragraphs(),
        vec!["Loops", "\u{2022} read ch1.", "\u{2022} do hw2."]
    );

    let store = CsvStore::new(&settings.store.root).unwrap();
    let row = store.find("activity_content", "1").unwrap().unwrap();
    assert!(row.flag("activityDocCreated"));
    assert!(row.flag("slideCreated"));
    assert!(row.flag("lessonPlanCreated"));
    assert_eq!(row.text("activityLink"), Some(activity.display().to_string().as_str()));
    assert_eq!(row.text("slideLink"), Some(deck.display().to_string().as_str()));
}

#[test]
fn test_second_run_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let settings = course(dir.path());

    documents_command(&settings, &[OutputKind::ActivityDocument], false).unwrap();
    let csv = fs::read_to_string(settings.store.root.join("activity_content.csv")).unwrap();

    let report = documents_command(&settings, &[OutputKind::ActivityDocument], false).unwrap();

    assert!(report.created.is_empty());
    assert_eq!(report.up_to_date, 2);
    assert_eq!(
        fs::read_to_string(settings.store.root.join("activity_content.csv")).unwrap(),
        csv
    );
}

#[test]
fn test_dry_run_keeps_store() {
    let dir = TempDir::new().unwrap();
    let settings = course(dir.path());

    let report = documents_command(&settings, &[OutputKind::SlideDeck], true).unwrap();

    assert_eq!(report.created.len(), 1);
    assert!(!report.created[0].path.starts_with(dir.path().join("generated")));
    assert_eq!(
        fs::read_to_string(settings.store.root.join("activity_content.csv")).unwrap(),
        CONTENT
    );
}

#[test]
fn test_missing_template_file_stops_the_run() {
    let dir = TempDir::new().unwrap();
    let settings = course(dir.path());
    fs::remove_file(dir.path().join("deck.pptx")).unwrap();

    let err = documents_command(&settings, &[OutputKind::SlideDeck], false).unwrap_err();

    assert!(err.to_string().contains("Template file not found"));
}

#[test]
fn test_missing_flag_column_stops_the_run() {
    let dir = TempDir::new().unwrap();
    let settings = course(dir.path());
    fs::write(
        settings.store.root.join("activity_content.csv"),
        "id,title\n1,Loops\n",
    )
    .unwrap();

    let err = documents_command(&settings, &[OutputKind::LessonPlan], false).unwrap_err();

    assert!(format!("{:#}", err).contains("lessonPlanCreated"));
    assert_eq!(fs::read_dir(dir.path().join("generated")).unwrap().count(), 0);
}
