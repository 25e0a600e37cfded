//! Document transform pipeline
//!
//! Every tool implements the same capability set: validate an input set,
//! then run once over it producing output blobs. Tools share no state and
//! never cache results; invoking `run` twice does the work twice.

pub mod compress;
pub mod images;
pub mod merge;
pub mod office;
pub mod outline;
pub mod split;
pub mod stamp;

use crate::delivery::HandleRegistry;
use crate::error::PrintHubError;

pub const PDF_MIME: &str = "application/pdf";
pub const TEXT_MIME: &str = "text/plain";

/// One in-memory input handed to a tool.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl InputFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// File name without its final extension.
    pub fn base_name(&self) -> &str {
        self.name
            .rsplit_once('.')
            .map(|(base, _)| base)
            .unwrap_or(&self.name)
    }

    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
    }
}

/// One output blob produced by a tool run.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl ToolOutput {
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// The capability set every concrete tool provides.
///
/// `accepts` runs all validation up front; when it fails, no transform job
/// is constructed. `run` may assume a set that passed `accepts`, but must
/// still fail cleanly on corrupt content discovered mid-parse.
pub trait DocumentTool {
    fn name(&self) -> &'static str;

    fn accepts(&self, inputs: &[InputFile]) -> Result<(), PrintHubError>;

    fn run(&self, inputs: &[InputFile]) -> Result<Vec<ToolOutput>, PrintHubError>;
}

/// One per-file failure inside a batch run.
#[derive(Debug)]
pub struct BatchFailure {
    pub input_name: String,
    pub error: PrintHubError,
}

/// Result of running a per-file tool over a whole selection.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub outputs: Vec<ToolOutput>,
    pub failures: Vec<BatchFailure>,
}

/// Run a per-file tool over each input in order.
///
/// Failure is per file: outputs produced for earlier inputs are preserved
/// and later inputs still run. Output order matches input order.
pub fn run_batch(tool: &dyn DocumentTool, inputs: &[InputFile]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for input in inputs {
        let single = std::slice::from_ref(input);
        let result = tool.accepts(single).and_then(|_| tool.run(single));
        match result {
            Ok(outputs) => outcome.outputs.extend(outputs),
            Err(error) => {
                tracing::error!(tool = tool.name(), file = %input.name, %error, "batch item failed");
                outcome.failures.push(BatchFailure {
                    input_name: input.name.clone(),
                    error,
                });
            }
        }
    }

    outcome
}

struct QueueEntry {
    file: InputFile,
    preview: Option<u64>,
}

/// Ordered selection feeding a tool run.
///
/// Reordering here is the only ordering control: outputs follow queue
/// order exactly. Each entry may own one preview handle, which is revoked
/// on every removal path.
#[derive(Default)]
pub struct InputQueue {
    entries: Vec<QueueEntry>,
    registry: HandleRegistry,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, file: InputFile) {
        self.entries.push(QueueEntry {
            file,
            preview: None,
        });
    }

    /// Add a file together with a preview handle over its bytes.
    pub fn push_with_preview(&mut self, file: InputFile) {
        let preview = self.registry.create(file.bytes.clone());
        self.entries.push(QueueEntry {
            file,
            preview: Some(preview),
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.file.name.as_str()).collect()
    }

    pub fn move_up(&mut self, index: usize) {
        if index > 0 && index < self.entries.len() {
            self.entries.swap(index, index - 1);
        }
    }

    pub fn move_down(&mut self, index: usize) {
        if index + 1 < self.entries.len() {
            self.entries.swap(index, index + 1);
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<InputFile> {
        if index >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(index);
        if let Some(handle) = entry.preview {
            self.registry.revoke(handle);
        }
        Some(entry.file)
    }

    /// Reset the queue, releasing every preview handle.
    pub fn clear(&mut self) {
        for entry in self.entries.drain(..) {
            if let Some(handle) = entry.preview {
                self.registry.revoke(handle);
            }
        }
    }

    pub fn files(&self) -> Vec<InputFile> {
        self.entries.iter().map(|e| e.file.clone()).collect()
    }

    pub fn registry(&self) -> &HandleRegistry {
        &self.registry
    }
}

impl Drop for InputQueue {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailOn {
        needle: &'static str,
    }

    impl DocumentTool for FailOn {
        fn name(&self) -> &'static str {
            "fail-on"
        }

        fn accepts(&self, _inputs: &[InputFile]) -> Result<(), PrintHubError> {
            Ok(())
        }

        fn run(&self, inputs: &[InputFile]) -> Result<Vec<ToolOutput>, PrintHubError> {
            let input = &inputs[0];
            if input.name.contains(self.needle) {
                return Err(PrintHubError::Transform("boom".into()));
            }
            Ok(vec![ToolOutput {
                name: input.name.clone(),
                bytes: input.bytes.clone(),
                mime: PDF_MIME,
            }])
        }
    }

    fn file(name: &str) -> InputFile {
        InputFile::new(name, vec![1, 2, 3])
    }

    #[test]
    fn test_batch_preserves_earlier_results_on_failure() {
        let tool = FailOn { needle: "bad" };
        let outcome = run_batch(&tool, &[file("a.pdf"), file("bad.pdf"), file("c.pdf")]);
        assert_eq!(outcome.outputs.len(), 2);
        assert_eq!(outcome.outputs[0].name, "a.pdf");
        assert_eq!(outcome.outputs[1].name, "c.pdf");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].input_name, "bad.pdf");
    }

    #[test]
    fn test_batch_output_order_matches_input_order() {
        let tool = FailOn { needle: "zzz" };
        let outcome = run_batch(&tool, &[file("c.pdf"), file("a.pdf"), file("b.pdf")]);
        let names: Vec<_> = outcome.outputs.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["c.pdf", "a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_queue_reordering() {
        let mut queue = InputQueue::new();
        queue.push(file("a.pdf"));
        queue.push(file("b.pdf"));
        queue.push(file("c.pdf"));

        queue.move_up(2);
        assert_eq!(queue.names(), vec!["a.pdf", "c.pdf", "b.pdf"]);

        queue.move_down(0);
        assert_eq!(queue.names(), vec!["c.pdf", "a.pdf", "b.pdf"]);

        // No-ops at the edges
        queue.move_up(0);
        queue.move_down(2);
        assert_eq!(queue.names(), vec!["c.pdf", "a.pdf", "b.pdf"]);
    }

    #[test]
    fn test_remove_revokes_preview_handle() {
        let mut queue = InputQueue::new();
        queue.push_with_preview(file("a.png"));
        queue.push_with_preview(file("b.png"));
        assert_eq!(queue.registry().active_count(), 2);

        queue.remove(0);
        assert_eq!(queue.registry().active_count(), 1);

        queue.clear();
        assert_eq!(queue.registry().active_count(), 0);
        assert!(queue.registry().is_balanced());
    }

    #[test]
    fn test_base_name_and_extension() {
        let f = file("report.final.PDF");
        assert_eq!(f.base_name(), "report.final");
        assert_eq!(f.extension().as_deref(), Some("pdf"));

        let bare = file("README");
        assert_eq!(bare.base_name(), "README");
        assert_eq!(bare.extension(), None);
    }
}
