//! Scorer doubles shared by the unit tests

use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shared_types::ClauseAssessment;

use crate::scorer::{ClauseScorer, ScoreError};

pub fn assessment(score: f64) -> ClauseAssessment {
    ClauseAssessment {
        risk_score: score,
        explanation: "test explanation".to_string(),
        clause_type: "Liability".to_string(),
        safer_version: "safer wording".to_string(),
    }
}

/// Replays a fixed sequence of results, whatever the clause
pub struct ScriptedScorer {
    script: Mutex<VecDeque<Result<ClauseAssessment, ScoreError>>>,
    calls: AtomicUsize,
}

impl ScriptedScorer {
    pub fn new(script: Vec<Result<ClauseAssessment, ScoreError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClauseScorer for ScriptedScorer {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn score_clause(&self, _clause: &str) -> Result<ClauseAssessment, ScoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ScoreError::Parse("script exhausted".to_string())))
    }
}

/// Answers per clause after an optional delay and tracks how many calls overlap
#[derive(Default)]
pub struct KeyedScorer {
    answers: HashMap<String, (Duration, Result<ClauseAssessment, ScoreError>)>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub completed: Arc<AtomicUsize>,
}

impl KeyedScorer {
    pub fn answer(
        mut self,
        clause: &str,
        delay: Duration,
        result: Result<ClauseAssessment, ScoreError>,
    ) -> Self {
        self.answers.insert(clause.to_string(), (delay, result));
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClauseScorer for KeyedScorer {
    fn name(&self) -> &str {
        "keyed"
    }

    async fn score_clause(&self, clause: &str) -> Result<ClauseAssessment, ScoreError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let (delay, result) = self
            .answers
            .get(clause)
            .cloned()
            .unwrap_or((Duration::ZERO, Ok(assessment(1.0))));
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);
        result
    }
}

/// Minimal DOCX container with one paragraph per entry
pub fn docx_with_paragraphs(paragraphs: &[&str]) -> Vec<u8> {
    use std::io::Cursor;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{}</w:t></w:r></w:p>", p))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        body
    );

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(xml.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

/// In-memory log sink for asserting on emitted events
#[derive(Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || sink.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
