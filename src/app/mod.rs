mod state;
mod ui;

use crate::config::Config;
use crate::picker::{FilePicker, SelectedFile};
use crate::upload::{UploadClient, UploadEvent, UploadStatus};
use eframe::{egui, App};
pub use state::WidgetState;
use std::sync::mpsc::{self as std_mpsc, Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

const ACTIVE_REPAINT: Duration = Duration::from_millis(100);

struct InFlight {
    events: Receiver<UploadEvent>,
    cancel: CancellationToken,
}

pub struct NikoUploader {
    state: WidgetState,
    picker: FilePicker,
    client: UploadClient,
    runtime: Handle,
    in_flight: Option<InFlight>,
}

impl NikoUploader {
    pub fn new(config: &Config, client: UploadClient, runtime: Handle) -> Self {
        info!("Initializing PDF uploader for {}", client.endpoint());
        Self {
            state: WidgetState::default(),
            picker: FilePicker::new(config.picker_config()),
            client,
            runtime,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn on_files_accepted(&mut self, files: Vec<SelectedFile>) {
        self.state.accept_files(files);
    }

    pub fn remove_file(&mut self, index: usize) {
        // Dropping the removed entry releases its preview
        drop(self.state.remove_file(index));
    }

    pub fn upload_selected_files(&mut self) {
        let Some(batch) = self.state.begin_upload() else {
            return;
        };

        let (sender, receiver) = std_mpsc::channel();
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            events: receiver,
            cancel: cancel.clone(),
        });

        let client = self.client.clone();
        self.runtime.spawn(async move {
            let result = client.upload(&batch, &sender, &cancel).await;
            let _ = sender.send(UploadEvent::Finished(result));
        });
    }

    pub fn cancel_in_flight(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            self.state.cancel_upload();
        }
    }

    /// Applies everything the upload task reported since the last frame.
    /// Returns true when any event was handled.
    pub fn poll_upload_events(&mut self) -> bool {
        let Some(in_flight) = &self.in_flight else {
            return false;
        };

        let mut had_updates = false;
        let mut finished = None;
        let mut disconnected = false;
        loop {
            match in_flight.events.try_recv() {
                Ok(UploadEvent::Progress(progress)) => {
                    had_updates = true;
                    self.state.record_progress(&progress);
                }
                Ok(UploadEvent::Finished(result)) => {
                    had_updates = true;
                    finished = Some(result);
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if disconnected {
            error!("Upload task ended without reporting a result");
            self.in_flight = None;
            self.state.upload_failed("The upload stopped unexpectedly.");
            return true;
        }

        if let Some(result) = finished {
            self.in_flight = None;
            match result {
                Ok(body) => {
                    debug!("Server response: {}", body);
                    self.state.upload_succeeded(Instant::now());
                }
                Err(e) => {
                    error!(
                        client_error = e.is_client_error(),
                        server_error = e.is_server_error(),
                        "Upload failed: {}",
                        e
                    );
                    self.state.upload_failed(e.user_message());
                }
            }
        }
        had_updates
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if let Some(files) = self.picker.update(ctx) {
            self.on_files_accepted(files);
        }

        if self.poll_upload_events() {
            ctx.request_repaint();
        }

        let now = Instant::now();
        self.state.tick(now);
        match self.state.status() {
            UploadStatus::Uploading => ctx.request_repaint_after(ACTIVE_REPAINT),
            UploadStatus::Success => {
                if let Some(remaining) = self.state.reset_remaining(now) {
                    ctx.request_repaint_after(remaining);
                }
            }
            UploadStatus::Idle | UploadStatus::Error => {}
        }
    }
}

impl App for NikoUploader {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}

impl Drop for NikoUploader {
    fn drop(&mut self) {
        self.cancel_in_flight();
        debug!(
            "Releasing {} preview reference(s)",
            self.picker.previews().live_count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_pdf, FakeServer};
    use clap::Parser;
    use tempfile::TempDir;

    struct Harness {
        runtime: tokio::runtime::Runtime,
        dir: TempDir,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                runtime: tokio::runtime::Builder::new_multi_thread()
                    .worker_threads(1)
                    .enable_all()
                    .build()
                    .unwrap(),
                dir: tempfile::tempdir().unwrap(),
            }
        }

        fn uploader(&self, server_origin: &str) -> NikoUploader {
            let config = Config::parse_from(["niko_uploader", "--origin", server_origin]);
            let client = UploadClient::new(&config.origin, config.timeout()).unwrap();
            NikoUploader::new(&config, client, self.runtime.handle().clone())
        }

        fn select(&self, uploader: &mut NikoUploader, names: &[&str]) {
            let paths = names
                .iter()
                .map(|name| write_pdf(self.dir.path(), name, 1024).path)
                .collect();
            let files = uploader.picker.accept_paths(paths);
            uploader.on_files_accepted(files);
        }
    }

    fn wait_until_settled(uploader: &mut NikoUploader) {
        let deadline = Instant::now() + Duration::from_secs(10);
        while uploader.state().is_uploading() {
            assert!(Instant::now() < deadline, "upload did not finish");
            uploader.poll_upload_events();
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    fn names(uploader: &NikoUploader) -> Vec<String> {
        uploader
            .state()
            .files()
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    #[test]
    fn empty_selection_makes_no_request() {
        let harness = Harness::new();
        let server = FakeServer::start(200, "{}");
        let mut uploader = harness.uploader(server.origin().as_str());

        uploader.upload_selected_files();

        assert_eq!(uploader.state().status(), UploadStatus::Idle);
        assert!(uploader.in_flight.is_none());
        assert!(server.requests().is_empty());
    }

    #[test]
    fn successful_upload_clears_selection() {
        let harness = Harness::new();
        let server = FakeServer::start(200, r#"{"ok":true}"#);
        let mut uploader = harness.uploader(server.origin().as_str());
        harness.select(&mut uploader, &["one.pdf", "two.pdf"]);

        uploader.upload_selected_files();
        assert_eq!(uploader.state().status(), UploadStatus::Uploading);
        wait_until_settled(&mut uploader);

        assert_eq!(uploader.state().status(), UploadStatus::Success);
        assert!(uploader.state().files().is_empty());
        assert_eq!(uploader.picker.previews().live_count(), 0);
        assert_eq!(server.requests().len(), 1);
    }

    #[test]
    fn failed_upload_keeps_selection() {
        let harness = Harness::new();
        let server = FakeServer::start(503, "busy");
        let mut uploader = harness.uploader(server.origin().as_str());
        harness.select(&mut uploader, &["one.pdf", "two.pdf"]);

        uploader.upload_selected_files();
        wait_until_settled(&mut uploader);

        assert_eq!(uploader.state().status(), UploadStatus::Error);
        assert_eq!(names(&uploader), ["one.pdf", "two.pdf"]);
        assert!(uploader
            .state()
            .last_error()
            .unwrap_or_default()
            .contains("503"));
    }

    #[test]
    fn cancel_returns_to_idle_and_keeps_files() {
        let harness = Harness::new();
        let server = FakeServer::start_with_delay(200, "{}", Duration::from_secs(5));
        let mut uploader = harness.uploader(server.origin().as_str());
        harness.select(&mut uploader, &["one.pdf"]);

        uploader.upload_selected_files();
        uploader.cancel_in_flight();

        assert_eq!(uploader.state().status(), UploadStatus::Idle);
        assert_eq!(names(&uploader), ["one.pdf"]);
        assert!(!uploader.poll_upload_events());
    }

    #[test]
    fn remove_file_is_bounded() {
        let harness = Harness::new();
        let mut uploader = harness.uploader("http://127.0.0.1:9");
        harness.select(&mut uploader, &["one.pdf", "two.pdf"]);

        uploader.remove_file(5);
        assert_eq!(names(&uploader), ["one.pdf", "two.pdf"]);

        uploader.remove_file(0);
        assert_eq!(names(&uploader), ["two.pdf"]);
        assert_eq!(uploader.picker.previews().live_count(), 1);
    }
}
