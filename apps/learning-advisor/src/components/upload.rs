//! Course-description upload.
//!
//! A file is chosen by typing its path. Selection checks the type up front so
//! that a non-PDF never reaches the service.

use std::path::PathBuf;

use advisor_api::{mime_for, Course, Document, ExtractedText, UploadResult, PDF_MIME};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use super::Component;
use crate::remote::Remote;
use crate::task::{Delivery, MountId, Outgoing, Reply, Request, Requester, Slot};

pub struct UploadForm {
    requester: Requester,
    /// Path being typed.
    pub path: String,
    pub selected: Option<Document>,
    /// Local problems with the selection. Cleared on the next selection.
    pub selection_error: Option<String>,
    pub upload: Remote<UploadResult>,
    pub extracted: Remote<ExtractedText>,
    pub parsed: Remote<Course>,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadForm {
    pub fn new() -> Self {
        Self {
            requester: Requester::new(),
            path: String::new(),
            selected: None,
            selection_error: None,
            upload: Remote::Idle,
            extracted: Remote::Idle,
            parsed: Remote::Idle,
        }
    }

    /// Select the file at the typed path.
    pub fn select(&mut self) {
        self.selection_error = None;
        self.selected = None;

        let path = PathBuf::from(self.path.trim());
        if path.as_os_str().is_empty() {
            self.selection_error = Some("Please enter a file path".to_string());
            return;
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if mime_for(&file_name) != PDF_MIME {
            self.selection_error = Some("Please select a PDF file".to_string());
            return;
        }

        match Document::from_path(&path) {
            Ok(document) => {
                info!(file = %document.file_name, size = document.bytes.len(), "document selected");
                self.selected = Some(document);
                self.upload = Remote::Idle;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read document");
                self.selection_error = Some(format!("Could not read {}: {}", path.display(), e));
            }
        }
    }

    pub fn upload(&mut self) -> Vec<Outgoing> {
        if self.upload.is_pending() {
            return Vec::new();
        }
        let Some(document) = self.selected.clone() else {
            self.upload = Remote::Failed("Please select a file first".to_string());
            return Vec::new();
        };
        self.upload = Remote::Pending;
        vec![self
            .requester
            .issue(Slot::Submit, Request::UploadDocument(document))]
    }

    pub fn extract(&mut self) -> Vec<Outgoing> {
        let Some(document) = self.selected.clone() else {
            self.extracted = Remote::Failed("Please select a file first".to_string());
            return Vec::new();
        };
        self.extracted = Remote::Pending;
        self.parsed = Remote::Idle;
        vec![self
            .requester
            .issue(Slot::Detail, Request::ExtractText(document))]
    }

    /// Parse the most recently extracted text.
    pub fn parse(&mut self) -> Vec<Outgoing> {
        let Some(text) = self.extracted.ready().map(|e| e.text.clone()) else {
            self.parsed = Remote::Failed("Extract the document text first".to_string());
            return Vec::new();
        };
        self.parsed = Remote::Pending;
        vec![self
            .requester
            .issue(Slot::Report, Request::ParseCourseText(text))]
    }
}

impl Component for UploadForm {
    fn mount_id(&self) -> MountId {
        self.requester.mount()
    }

    fn handle_key(&mut self, key: KeyEvent) -> Vec<Outgoing> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('u') => self.upload(),
                KeyCode::Char('e') => self.extract(),
                KeyCode::Char('p') => self.parse(),
                _ => Vec::new(),
            };
        }

        match key.code {
            KeyCode::Enter => self.select(),
            KeyCode::Backspace => {
                self.path.pop();
            }
            KeyCode::Esc => {
                self.path.clear();
                self.selected = None;
                self.selection_error = None;
            }
            KeyCode::Char(c) => self.path.push(c),
            _ => {}
        }
        Vec::new()
    }

    fn on_delivery(&mut self, delivery: Delivery) -> Vec<Outgoing> {
        if !self.requester.accept(&delivery.ticket) {
            return Vec::new();
        }

        match delivery.ticket.slot {
            Slot::Submit => {
                self.upload = Remote::settle(
                    delivery.outcome.and_then(|reply| match reply {
                        Reply::Uploaded(result) => Ok(result),
                        other => Err(other.unexpected()),
                    }),
                    "Upload failed, please try again",
                );
                if self.upload.ready().is_some() {
                    self.selected = None;
                    self.path.clear();
                }
            }
            Slot::Detail => {
                self.extracted = Remote::settle(
                    delivery.outcome.and_then(|reply| match reply {
                        Reply::Extracted(text) => Ok(text),
                        other => Err(other.unexpected()),
                    }),
                    "Text extraction failed",
                );
            }
            Slot::Report => {
                self.parsed = Remote::settle(
                    delivery.outcome.and_then(|reply| match reply {
                        Reply::Parsed(course) => Ok(course),
                        other => Err(other.unexpected()),
                    }),
                    "Course parsing failed",
                );
            }
            slot => tracing::debug!(?slot, "unexpected slot for upload"),
        }
        Vec::new()
    }

    fn hints(&self) -> &'static str {
        "type path Enter:select ^U:upload ^E:extract text ^P:parse text Esc:clear"
    }
}
