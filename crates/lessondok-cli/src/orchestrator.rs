//! Batch generation over the record store
//!
//! Records are processed one at a time in store order. A failure for one
//! record and kind is logged and recorded in the [`RunReport`]; the batch
//! moves on. Only store-shape problems (missing columns, missing template
//! configuration) stop a run before anything is rendered.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use lessondok_core::{
    document_name, fields, file_name, FieldRecord, FieldValue, OutputKind, RenderReport,
    TemplateFormat,
};
use lessondok_data::RecordStore;
use lessondok_generator::{generate_lesson_content, ContentGenerator, GeneratorError, PromptTemplate};
use lessondok_ooxml::DocxRenderer;
use lessondok_pptx::SlideRenderer;
use tracing::{debug, error, info, warn};

use crate::settings::Settings;

/// Column of `lesson_sequence` marking rows with generated content
pub const PROCESSED_COLUMN: &str = fields::PROCESSED;

/// Spacing between successive external calls
pub trait Pacer {
    /// Called between two calls, never before the first
    fn pause(&mut self, interval: Duration);
}

/// Pacer that sleeps the calling thread
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepPacer;

impl Pacer for SleepPacer {
    fn pause(&mut self, interval: Duration) {
        if !interval.is_zero() {
            thread::sleep(interval);
        }
    }
}

/// A document written during a run
#[derive(Debug, Clone)]
pub struct CreatedDocument {
    pub id: String,
    pub kind: OutputKind,
    pub path: PathBuf,
    pub report: RenderReport,
}

/// A record (and kind, for documents) that could not be processed
#[derive(Debug, Clone)]
pub struct Failure {
    pub id: String,
    pub kind: Option<OutputKind>,
    pub message: String,
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            Some(kind) => write!(f, "record {} ({}): {}", self.id, kind, self.message),
            None => write!(f, "record {}: {}", self.id, self.message),
        }
    }
}

/// What a run did
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Documents written, in creation order
    pub created: Vec<CreatedDocument>,
    /// Lesson-sequence ids whose content was generated
    pub generated: Vec<String>,
    /// Records with nothing left to do
    pub up_to_date: usize,
    /// Renders dropped because the flag was set meanwhile
    pub superseded: usize,
    pub failures: Vec<Failure>,
}

impl RunReport {
    /// Whether any record failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// One-line summary
    pub fn summary(&self) -> String {
        let mut parts = vec![if self.generated.is_empty() {
            format!("{} documents created", self.created.len())
        } else {
            format!("{} lessons generated", self.generated.len())
        }];
        parts.push(format!("{} up to date", self.up_to_date));
        if self.superseded > 0 {
            parts.push(format!("{} superseded", self.superseded));
        }
        parts.push(format!("{} failed", self.failures.len()));
        parts.join(", ")
    }
}

enum Outcome {
    Created(CreatedDocument),
    Superseded,
}

/// Drives document and content generation against a record store
pub struct Orchestrator<'a, S: RecordStore, P: Pacer = SleepPacer> {
    store: &'a mut S,
    settings: &'a Settings,
    pacer: P,
    output_dir: Option<PathBuf>,
    dry_run: bool,
}

impl<'a, S: RecordStore> Orchestrator<'a, S, SleepPacer> {
    /// Create an orchestrator that sleeps between calls
    pub fn new(store: &'a mut S, settings: &'a Settings) -> Self {
        Self::with_pacer(store, settings, SleepPacer)
    }
}

impl<'a, S: RecordStore, P: Pacer> Orchestrator<'a, S, P> {
    /// Create an orchestrator with a custom pacer
    pub fn with_pacer(store: &'a mut S, settings: &'a Settings, pacer: P) -> Self {
        Self {
            store,
            settings,
            pacer,
            output_dir: settings.templates.output_dir.clone(),
            dry_run: false,
        }
    }

    /// Write documents to `dir` and leave the store untouched
    pub fn dry_run(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self.dry_run = true;
        self
    }

    /// The pacer, for inspection
    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    /// Render every document whose completion flag is not yet set
    pub fn generate_missing(&mut self, kinds: &[OutputKind]) -> Result<RunReport> {
        let table = self.settings.store.activity_content.clone();

        let mut required = vec![fields::ID];
        required.extend(kinds.iter().map(|k| k.flag_column()));
        self.store.require_columns(&table, &required)?;

        let mut templates = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let template = self
                .settings
                .template_for(kind)
                .ok_or_else(|| anyhow!("No template configured for {} ([templates] {})", kind, kind.key()))?;
            let link = self.store.has_column(&table, kind.link_column())?;
            templates.push((kind, template.to_path_buf(), link));
        }

        let interval = Duration::from_millis(self.settings.pacing.render_ms);
        let mut report = RunReport::default();
        let mut first = true;

        for record in self.store.read_all(&table)? {
            let Some(id) = record.id().map(str::trim).filter(|id| !id.is_empty()) else {
                debug!("skipping row without id");
                continue;
            };
            let id = id.to_string();

            let pending: Vec<_> = templates
                .iter()
                .filter(|(kind, _, _)| !record.flag(kind.flag_column()))
                .collect();
            if pending.is_empty() {
                report.up_to_date += 1;
                continue;
            }

            for (kind, template, link) in pending {
                if !first {
                    self.pacer.pause(interval);
                }
                first = false;

                match self.generate_one(&table, &id, *kind, template, *link, &record) {
                    Ok(Outcome::Created(doc)) => report.created.push(doc),
                    Ok(Outcome::Superseded) => report.superseded += 1,
                    Err(e) => {
                        let message = format!("{:#}", e);
                        error!(id = %id, kind = %kind, error = %message, "generation failed");
                        report.failures.push(Failure {
                            id: id.clone(),
                            kind: Some(*kind),
                            message,
                        });
                    }
                }
            }
        }

        info!(summary = %report.summary(), "document run finished");
        Ok(report)
    }

    /// Where a record's document goes. A name already taken on disk gets
    /// the record id appended; when that is taken too the record fails.
    fn output_path(&self, kind: OutputKind, template: &Path, id: &str, name: &str) -> Result<PathBuf> {
        let dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => template.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        let path = dir.join(file_name(name, kind));
        if !path.exists() {
            return Ok(path);
        }

        let alternative = dir.join(file_name(&format!("{} ({})", name, id), kind));
        if alternative.exists() {
            bail!(
                "Output file already exists: {} (and {})",
                path.display(),
                alternative.display()
            );
        }
        warn!(id, taken = %path.display(), "document name already used, adding record id");
        Ok(alternative)
    }

    fn generate_one(
        &mut self,
        table: &str,
        id: &str,
        kind: OutputKind,
        template: &Path,
        link: bool,
        record: &FieldRecord,
    ) -> Result<Outcome> {
        let name = document_name(kind, record);
        let path = self.output_path(kind, template, id, &name)?;
        let plan = self.settings.plan_for(kind);

        let render = match kind.format() {
            TemplateFormat::Docx => DocxRenderer::new(&plan)
                .with_title(name.clone())
                .render_file(template, &path, record)
                .map_err(anyhow::Error::from),
            TemplateFormat::Pptx => SlideRenderer::new(&plan, &self.settings.slides)
                .render_file(template, &path, record)
                .map_err(anyhow::Error::from),
        };
        let render_report = render.with_context(|| format!("Failed to render {}", template.display()))?;
        debug!(id, kind = %kind, summary = %render_report.summary(), "rendered");

        if !self.dry_run {
            // the flag may have been set by another run since the batch was read
            let current = self
                .store
                .find(table, id)?
                .ok_or_else(|| anyhow!("row {} disappeared from {}", id, table))?;
            if current.flag(kind.flag_column()) {
                warn!(id, kind = %kind, "already generated elsewhere, discarding copy");
                if let Err(e) = fs::remove_file(&path) {
                    warn!(path = %path.display(), error = %e, "could not remove copy");
                }
                return Ok(Outcome::Superseded);
            }

            if link {
                self.store.write_field(
                    table,
                    id,
                    kind.link_column(),
                    FieldValue::Text(path.display().to_string()),
                )?;
            }
            self.store
                .write_field(table, id, kind.flag_column(), FieldValue::Bool(true))?;
        }

        info!(id, kind = %kind, path = %path.display(), "created document");
        Ok(Outcome::Created(CreatedDocument {
            id: id.to_string(),
            kind,
            path,
            report: render_report,
        }))
    }

    /// Generate activity content for every unprocessed lesson-sequence row
    pub fn generate_content<G: ContentGenerator + ?Sized>(
        &mut self,
        generator: &G,
        prompt: &PromptTemplate,
    ) -> Result<RunReport> {
        let sequence = self.settings.store.lesson_sequence.clone();
        let content = self.settings.store.activity_content.clone();

        self.store
            .require_columns(&sequence, &[fields::ID, PROCESSED_COLUMN])?;
        self.store.require_columns(&content, &[fields::ID])?;
        let columns = self.store.columns(&content)?;

        let settings = self.settings;
        let interval = Duration::from_millis(settings.pacing.generate_ms);
        let mapping = &settings.generator.response_keys;
        let mut report = RunReport::default();
        let mut first = true;

        for row in self.store.read_all(&sequence)? {
            let Some(id) = row.id().map(str::trim).filter(|id| !id.is_empty()) else {
                continue;
            };
            let id = id.to_string();
            if row.flag(PROCESSED_COLUMN) {
                report.up_to_date += 1;
                continue;
            }

            if !first {
                self.pacer.pause(interval);
            }
            first = false;

            let result = generate_lesson_content(generator, &row, prompt, mapping)
                .map_err(anyhow::Error::from)
                .and_then(|record| self.append_content(&content, &columns, record));

            let success = match result {
                Ok(new_id) => {
                    info!(lesson = %id, content_id = new_id, "generated lesson content");
                    report.generated.push(id.clone());
                    true
                }
                Err(e) => {
                    let message = format!("{:#}", e);
                    match e.downcast_ref::<GeneratorError>() {
                        Some(failure) if failure.is_parse_failure() => warn!(
                            lesson = %id,
                            error = %failure,
                            raw = failure.raw_payload().unwrap_or_default(),
                            "model output was not valid JSON"
                        ),
                        _ => error!(lesson = %id, error = %message, "content generation failed"),
                    }
                    report.failures.push(Failure {
                        id: id.clone(),
                        kind: None,
                        message,
                    });
                    false
                }
            };
            self.store
                .write_field(&sequence, &id, PROCESSED_COLUMN, FieldValue::Bool(success))?;
        }

        info!(summary = %report.summary(), "content run finished");
        Ok(report)
    }

    fn append_content(&mut self, table: &str, columns: &[String], mut record: FieldRecord) -> Result<u64> {
        let next = self.store.last_id(table)?.unwrap_or(0) + 1;
        record.insert(fields::ID, next.to_string());
        for kind in OutputKind::ALL {
            record.insert(kind.flag_column(), false);
        }

        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        for dropped in record.keys().filter(|k| !names.contains(k)) {
            debug!(table, field = dropped, "no column for generated field");
        }
        let row = record.project(&names);
        self.store
            .append_row(table, &row)
            .with_context(|| format!("Failed to append to {}", table))?;
        Ok(next)
    }
}

/// Fail unless every kind has an existing template file
pub fn check_templates(settings: &Settings, kinds: &[OutputKind]) -> Result<()> {
    for &kind in kinds {
        if let Some(path) = settings.template_for(kind) {
            if !path.is_file() {
                bail!("Template file not found for {}: {}", kind, path.display());
            }
        }
    }
    Ok(())
}
