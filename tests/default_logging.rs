// ============================================================================
// Process Default Logging Tests
// Own binary: swaps the process-wide context and the thread's subscriber
// ============================================================================

#![cfg(feature = "logging")]

use bigreal::prelude::*;
use parking_lot::Mutex;
use std::io;
use std::sync::Arc;

#[derive(Clone, Default)]
struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_every_default_change_is_logged() {
    let output = CapturedOutput::default();
    let writer = output.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        Real::set_precision(256);
        Real::set_output_precision(17);
        Context::set_default(Context::default());
    });

    let text = output.text();
    let changes: Vec<&str> = text
        .lines()
        .filter(|line| line.contains("process default precision changed"))
        .collect();
    assert_eq!(changes.len(), 3, "{text}");
    assert!(changes[0].contains("precision=256"), "{text}");
    assert!(changes[1].contains("output_precision=17"), "{text}");
    assert!(changes[2].contains("precision=150"), "{text}");
}
