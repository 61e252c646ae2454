//! Application window: input fields, task list and notifications.

use std::{collections::VecDeque, path::Path, sync::Arc, time::Duration};

use eframe::{App, Frame, egui};
use egui::{Align2, Color32, RichText};
use rfd::FileDialog;
use tokio::{
    runtime::Handle,
    sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel},
};
use tracing::{info, warn};

use crate::{
    config::AppConfig,
    downloader::MediaDownloader,
    model::{
        DownloadOutcome, DownloadRequest, DownloadStatus, DownloadTask, MediaKind, TaskId,
        ValidationError, VideoQuality,
    },
    options::DownloadOptions,
    task::{self, TaskEvent},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A blocking message box; the rest of the window is disabled while one is shown
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub body: String,
}

impl Notice {
    fn new(level: NoticeLevel, title: &str, body: impl Into<String>) -> Self {
        Self { level, title: title.to_owned(), body: body.into() }
    }
}

/// Application state for the GUI
pub struct MeowApp {
    /// Input field for the video URL
    url_input: String,
    /// Destination folder for downloads
    download_folder: String,
    /// Selected media kind (MP3 or MP4)
    kind: MediaKind,
    /// Selected video quality, used only for MP4
    quality: VideoQuality,
    /// Downloads started this session, running or finished
    downloads: Vec<DownloadTask>,
    /// Id handed to the next download
    next_id: u64,
    /// Non-blocking acknowledgement line under the download button
    status_line: Option<String>,
    /// Blocking notices waiting to be shown, oldest first
    notices: VecDeque<Notice>,
    /// Runtime whose blocking pool runs the workers
    runtime: Handle,
    /// External downloader shared by all workers
    downloader: Arc<dyn MediaDownloader>,
    /// Cloned into every worker
    events_tx: UnboundedSender<TaskEvent>,
    /// Drained once per frame on the UI thread
    events_rx: UnboundedReceiver<TaskEvent>,
}

impl MeowApp {
    pub fn new(config: &AppConfig, runtime: Handle, downloader: Arc<dyn MediaDownloader>) -> Self {
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            url_input: String::new(),
            download_folder: config.download_dir.display().to_string(),
            kind: config.default_kind,
            quality: config.default_quality,
            downloads: Vec::new(),
            next_id: 1,
            status_line: None,
            notices: VecDeque::new(),
            runtime,
            downloader,
            events_tx,
            events_rx,
        }
    }

    /// Validates the current fields and launches a download without waiting for it.
    ///
    /// On a validation failure a warning notice is queued and nothing is spawned.
    pub fn start_download(&mut self, ctx: &egui::Context) -> Option<TaskId> {
        let request = match self.validate() {
            Ok(request) => request,
            Err(e) => {
                info!(error = %e, "download request rejected");
                self.notices
                    .push_back(Notice::new(NoticeLevel::Warning, "Error", e.to_string()));
                return None;
            }
        };

        let options = DownloadOptions::from_request(&request);
        let id = TaskId(self.next_id);
        self.next_id += 1;

        self.downloads.push(DownloadTask {
            id,
            url: request.url.clone(),
            destination: request.destination.clone(),
            status: DownloadStatus::Downloading(0.0),
        });
        task::spawn(
            &self.runtime,
            id,
            request.url,
            options,
            Arc::clone(&self.downloader),
            self.events_tx.clone(),
            ctx.clone(),
        );
        self.status_line = Some(format!("Download {id} started, please wait."));
        Some(id)
    }

    fn validate(&self) -> Result<DownloadRequest, ValidationError> {
        let request =
            DownloadRequest::new(&self.url_input, &self.download_folder, self.kind, self.quality)?;
        if !Path::new(&request.destination).is_dir() {
            return Err(ValidationError::DestinationMissing(request.destination));
        }
        Ok(request)
    }

    /// Applies every event the workers have sent since the last frame
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            match event {
                TaskEvent::Progress { id, fraction } => {
                    if let Some(task) = self.task_mut(id) {
                        // Only update if progress increased
                        if let DownloadStatus::Downloading(current) = &mut task.status {
                            if fraction > *current {
                                *current = fraction;
                            }
                        }
                    }
                }
                TaskEvent::Finished { id, outcome } => self.finish(id, outcome),
            }
        }
    }

    fn finish(&mut self, id: TaskId, outcome: DownloadOutcome) {
        let url = self
            .task_mut(id)
            .map(|t| t.url.clone())
            .unwrap_or_default();
        let notice = match &outcome {
            DownloadOutcome::Success => Notice::new(
                NoticeLevel::Info,
                "Done",
                format!("Download {id} succeeded!\n{url}"),
            ),
            DownloadOutcome::Failure(message) => Notice::new(
                NoticeLevel::Error,
                "Error",
                format!("Download {id} failed: {message}\n{url}"),
            ),
        };
        match self.task_mut(id) {
            Some(task) => {
                task.status = match outcome {
                    DownloadOutcome::Success => DownloadStatus::Done,
                    DownloadOutcome::Failure(message) => DownloadStatus::Failed(message),
                };
            }
            None => warn!(task = %id, "outcome for unknown task"),
        }
        self.notices.push_back(notice);
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut DownloadTask> {
        self.downloads.iter_mut().find(|t| t.id == id)
    }

    fn pick_folder(&mut self) {
        // Cancelling the dialog keeps the previous folder.
        if let Some(folder) = FileDialog::new()
            .set_directory(&self.download_folder)
            .pick_folder()
        {
            self.download_folder = folder.display().to_string();
        }
    }

    fn notice_window(&mut self, ctx: &egui::Context) {
        let Some(notice) = self.notices.front() else {
            return;
        };
        let color = match notice.level {
            NoticeLevel::Info => Color32::LIGHT_GREEN,
            NoticeLevel::Warning => Color32::YELLOW,
            NoticeLevel::Error => Color32::LIGHT_RED,
        };
        let mut dismissed = false;
        egui::Window::new(notice.title.as_str())
            .id(egui::Id::new("notice"))
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.colored_label(color, notice.body.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.notices.pop_front();
        }
    }

    fn downloads_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("Downloads");
        ui.separator();

        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                let mut to_remove = vec![];

                for task in &self.downloads {
                    ui.group(|ui| {
                        ui.label(format!("{} {}", task.id, task.url));
                        match &task.status {
                            DownloadStatus::Downloading(progress) => {
                                ui.label("⬇️ Downloading");
                                ui.add(egui::ProgressBar::new(*progress).show_percentage());
                            }
                            DownloadStatus::Done => {
                                ui.label("✅ Done");
                            }
                            DownloadStatus::Failed(message) => {
                                ui.colored_label(Color32::LIGHT_RED, format!("❌ {message}"));
                            }
                        }
                        // When finished, provide folder and remove options
                        if task.is_finished() {
                            ui.horizontal(|ui| {
                                if ui.button("Open Folder").clicked() {
                                    open_folder(task.destination.clone());
                                }
                                if ui.add(egui::Button::new("Remove").fill(Color32::DARK_RED)).clicked() {
                                    to_remove.push(task.id);
                                }
                            });
                        }
                    });
                }

                if !to_remove.is_empty() {
                    self.downloads.retain(|t| !to_remove.contains(&t.id));
                }
            });
    }

    fn form(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.heading(RichText::new("MeowMeow video downloader").strong());
        });
        ui.add_space(8.0);

        ui.label("Video URL:");
        ui.text_edit_singleline(&mut self.url_input);

        ui.label("Format:");
        for kind in [MediaKind::AudioOnly, MediaKind::Video] {
            ui.radio_value(&mut self.kind, kind, kind.label());
        }

        ui.label("MP4 video quality:");
        ui.add_enabled_ui(self.kind == MediaKind::Video, |ui| {
            egui::ComboBox::from_id_source("quality")
                .selected_text(self.quality.label())
                .show_ui(ui, |ui| {
                    for q in VideoQuality::ALL {
                        ui.selectable_value(&mut self.quality, q, q.label());
                    }
                });
        });

        ui.label("Destination folder:");
        ui.horizontal(|ui| {
            if ui.button("Browse…").clicked() {
                self.pick_folder();
            }
            ui.label(RichText::new(&self.download_folder).monospace());
        });

        ui.add_space(8.0);
        if ui.button("Start download").clicked() {
            self.start_download(ctx);
        }
        if let Some(status) = &self.status_line {
            ui.label(status);
        }
    }
}

/// GUI update loop: called each frame to redraw and handle interactions
impl App for MeowApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_events();

        let interactive = self.notices.is_empty();

        egui::SidePanel::right("downloads_panel").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| self.downloads_panel(ui));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| self.form(ctx, ui));
        });

        self.notice_window(ctx);

        // Workers request repaints themselves; this only keeps progress bars smooth.
        if self.downloads.iter().any(|t| !t.is_finished()) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

/// Opens `folder` in the platform file manager
fn open_folder(folder: String) {
    std::thread::spawn(move || {
        #[cfg(target_os = "windows")]
        let result = std::process::Command::new("explorer").arg(&folder).spawn();
        #[cfg(target_os = "macos")]
        let result = std::process::Command::new("open").arg(&folder).spawn();
        #[cfg(all(unix, not(target_os = "macos")))]
        let result = std::process::Command::new("xdg-open").arg(&folder).spawn();
        if let Err(e) = result {
            warn!(%folder, error = %e, "could not open folder");
        }
    });
}
