use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use log::{debug, warn};

use crate::font_metrics::FontMetrics;
use crate::layout::{Layout, LayoutError};
use crate::paginator::{self, Page};
use crate::styled_text::StyledText;

/// One relayout job, stamped with the session generation that issued it.
pub struct PaginationRequest {
    pub generation: u64,
    pub text: Arc<StyledText>,
    pub metrics: Arc<dyn FontMetrics + Send + Sync>,
    pub width: f32,
    pub height: f32,
}

/// Completed relayout, carrying its generation back for the staleness check
/// in `ReaderSession::apply_pagination`.
pub struct PaginationResult {
    pub generation: u64,
    pub layout: Layout,
    pub pages: Vec<Page>,
    pub viewport_height: f32,
}

/// Background pagination thread.
///
/// Requests queue up while a job runs; before starting the next one the
/// worker drains the queue and keeps only the newest request, so rapid font
/// or viewport changes cost one relayout instead of one per keystroke.
pub struct PaginationWorker {
    tx: Option<Sender<PaginationRequest>>,
    rx: Receiver<Result<PaginationResult, LayoutError>>,
    handle: Option<JoinHandle<()>>,
}

impl PaginationWorker {
    pub fn spawn() -> std::io::Result<Self> {
        let (req_tx, req_rx) = mpsc::channel::<PaginationRequest>();
        let (res_tx, res_rx) = mpsc::channel();
        let handle = std::thread::Builder::new()
            .name("pagination".to_string())
            .spawn(move || {
                while let Ok(mut request) = req_rx.recv() {
                    // Collapse the backlog down to the newest request.
                    while let Ok(newer) = req_rx.try_recv() {
                        debug!("superseding pagination generation {}", request.generation);
                        request = newer;
                    }
                    let result = run(&request);
                    if res_tx.send(result).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            tx: Some(req_tx),
            rx: res_rx,
            handle: Some(handle),
        })
    }

    pub fn request(&self, request: PaginationRequest) {
        if let Some(tx) = &self.tx {
            if tx.send(request).is_err() {
                warn!("pagination worker is gone; request dropped");
            }
        }
    }

    /// Non-blocking check for a finished job.
    pub fn poll(&self) -> Option<Result<PaginationResult, LayoutError>> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a finished job.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Result<PaginationResult, LayoutError>> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}

impl Drop for PaginationWorker {
    fn drop(&mut self) {
        // Closing the request channel ends the worker loop.
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(request: &PaginationRequest) -> Result<PaginationResult, LayoutError> {
    let layout = Layout::compute(&request.text, request.width, request.metrics.as_ref())?;
    let pages = paginator::paginate(&layout, request.height)?;
    debug!(
        "pagination generation {} done: {} pages",
        request.generation,
        pages.len()
    );
    Ok(PaginationResult {
        generation: request.generation,
        layout,
        pages,
        viewport_height: request.height,
    })
}
