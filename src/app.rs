use crate::compose::{render_preview, Templates};
use crate::config::AppConfig;
use crate::directory::Directory;
use crate::form::FormState;
use crate::i18n::Language;
use crate::identity::ProfileIdentity;
use crate::mailbox::auth::ConfiguredTokenSource;
use crate::mailbox::GraphMailboxClient;
use crate::session::{SessionState, StatusKind, SubmitPhase};
use crate::submission::{Composer, SubmissionOutcome};
use eframe::egui;
use egui::{Color32, Margin, Vec2, Visuals};
use log::{debug, info};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;

const COPIED_FEEDBACK_FOR: Duration = Duration::from_secs(2);
const SPINNER_FRAME: Duration = Duration::from_millis(100);
const STATUS_POLL: Duration = Duration::from_millis(500);

// Submission wakes the UI through `FinishGuard`, so the spinner only needs a slow tick
fn repaint_delay(phase: SubmitPhase, has_status: bool) -> Option<Duration> {
    match phase {
        SubmitPhase::Submitting => Some(SPINNER_FRAME),
        _ if has_status => Some(STATUS_POLL),
        _ => None,
    }
}

// Results coming back from the background submission task
enum Message {
    Outcome(SubmissionOutcome),
    SubmitFinished,
}

// Sends `SubmitFinished` when dropped, so the submit control is restored
// even if the task panics before reporting an outcome.
struct FinishGuard {
    sender: mpsc::Sender<Message>,
    ctx: egui::Context,
}

impl Drop for FinishGuard {
    fn drop(&mut self) {
        self.sender.send(Message::SubmitFinished).ok();
        self.ctx.request_repaint();
    }
}

pub struct AutoReplyApp {
    session: SessionState,
    composer: Arc<Composer>,
    identity: Arc<ProfileIdentity>,
    tokens: Arc<ConfiguredTokenSource>,
    mailbox: Arc<GraphMailboxClient>,

    preview: String,
    copied_at: Option<Instant>,

    // Background Communication
    tokio_rt: Runtime,
    receiver: mpsc::Receiver<Message>,
    sender: mpsc::Sender<Message>,
}

impl AutoReplyApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Result<Self, std::io::Error> {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.visuals = Visuals::light();
        style.visuals.panel_fill = Color32::from_rgb(0xFC, 0xFC, 0xFC);
        style.visuals.window_fill = Color32::from_rgb(0xFC, 0xFC, 0xFC);
        style.visuals.window_corner_radius = 10.into();
        cc.egui_ctx.set_style(style);
        cc.egui_ctx.set_theme(egui::Theme::Light);

        let directory = Directory::load(config.directory.clone());
        let composer = Composer {
            directory,
            templates: Templates::from_config(&config),
            company: config.company.clone(),
            time_zone: config.time_zone.clone(),
        };
        let (sender, receiver) = mpsc::channel();
        let today = chrono::Local::now().date_naive();

        let mut app = Self {
            session: SessionState::new(config.language, FormState::with_defaults(today)),
            composer: Arc::new(composer),
            identity: Arc::new(ProfileIdentity::new(config.profile.clone())),
            tokens: Arc::new(ConfiguredTokenSource::from_config(&config.auth)),
            mailbox: Arc::new(GraphMailboxClient::new(
                &config.graph.endpoint,
                config.graph.timeout_secs,
            )),
            preview: String::new(),
            copied_at: None,
            tokio_rt: Runtime::new()?,
            receiver,
            sender,
        };
        app.refresh_preview();
        info!(
            "Composer ready with {} colleagues",
            app.composer.directory.delegates().len()
        );
        Ok(app)
    }

    fn refresh_preview(&mut self) {
        self.preview = render_preview(
            &self.session.form,
            &self.composer.directory,
            &self.composer.templates,
            self.session.language(),
            &self.composer.company,
        );
    }

    fn ui_form(&mut self, ui: &mut egui::Ui) {
        let labels = self.session.labels();
        let mut changed = false;

        egui::Grid::new("leave_form_grid")
            .num_columns(2)
            .spacing([10.0, 8.0])
            .show(ui, |ui| {
                ui.label(labels.colleague);
                let options = self.composer.directory.options(labels.select_placeholder);
                let selected = options
                    .iter()
                    .find(|o| o.value == self.session.form.delegate_id)
                    .map(|o| o.label.clone())
                    .unwrap_or_else(|| labels.select_placeholder.to_string());
                egui::ComboBox::from_id_salt("colleague")
                    .selected_text(selected)
                    .width(260.0)
                    .show_ui(ui, |ui| {
                        for option in &options {
                            changed |= ui
                                .selectable_value(
                                    &mut self.session.form.delegate_id,
                                    option.value,
                                    &option.label,
                                )
                                .changed();
                        }
                    });
                ui.end_row();

                ui.label(labels.start_date);
                let mut start_date = self.session.form.start_date.clone();
                if ui
                    .add(egui::TextEdit::singleline(&mut start_date).hint_text("YYYY-MM-DD"))
                    .changed()
                {
                    self.session.form.set_start_date(start_date);
                    changed = true;
                }
                ui.end_row();

                ui.label(labels.start_time);
                changed |= ui
                    .add(egui::TextEdit::singleline(&mut self.session.form.start_time).hint_text("HH:MM"))
                    .changed();
                ui.end_row();

                ui.label(labels.end_date);
                changed |= ui
                    .add(egui::TextEdit::singleline(&mut self.session.form.end_date).hint_text("YYYY-MM-DD"))
                    .changed();
                ui.end_row();

                ui.label(labels.end_time);
                changed |= ui
                    .add(egui::TextEdit::singleline(&mut self.session.form.end_time).hint_text("HH:MM"))
                    .changed();
                ui.end_row();

                ui.label(labels.language);
                ui.horizontal(|ui| {
                    let mut language = self.session.language();
                    ui.selectable_value(&mut language, Language::Tr, "Türkçe");
                    ui.selectable_value(&mut language, Language::En, "English");
                    if language != self.session.language() {
                        self.session.set_language(language);
                        ui.ctx().send_viewport_cmd(egui::ViewportCommand::Title(
                            language.labels().window_title.to_string(),
                        ));
                        changed = true;
                    }
                });
                ui.end_row();
            });

        if changed {
            self.refresh_preview();
        }
    }

    fn ui_preview(&mut self, ui: &mut egui::Ui) {
        ui.heading(self.session.labels().preview);
        ui.add_space(5.0);
        egui::ScrollArea::vertical()
            .auto_shrink([false, true])
            .max_height((ui.available_height() - 50.0).max(120.0))
            .show(ui, |ui| {
                ui.add(
                    egui::TextEdit::multiline(&mut self.preview.as_str())
                        .desired_width(f32::INFINITY)
                        .desired_rows(14),
                );
            });
    }

    fn ui_instructions(&mut self, ctx: &egui::Context) {
        let Some(instructions) = self.session.instructions().cloned() else {
            return;
        };
        let labels = instructions.language.labels();
        let mut open = true;
        let mut close_clicked = false;

        egui::Window::new(labels.instructions_title)
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .default_width(480.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for (index, step) in labels.instruction_steps.iter().enumerate() {
                        ui.strong(step.title);
                        ui.label(step.text);
                        match index {
                            2 => {
                                ui.label(format!("{} {}", labels.start_label, instructions.start));
                                ui.label(format!("{} {}", labels.end_label, instructions.end));
                            }
                            3 => {
                                let recently_copied = self
                                    .copied_at
                                    .is_some_and(|at| at.elapsed() < COPIED_FEEDBACK_FOR);
                                let text = if recently_copied { labels.copied } else { labels.copy };
                                if ui.button(text).clicked() {
                                    ui.ctx().copy_text(instructions.message.clone());
                                    self.copied_at = Some(Instant::now());
                                    ui.ctx().request_repaint_after(COPIED_FEEDBACK_FOR);
                                    debug!("Auto-reply text copied to clipboard");
                                }
                                egui::Frame::group(ui.style()).show(ui, |ui| {
                                    ui.label(&instructions.message);
                                });
                            }
                            _ => {}
                        }
                        ui.add_space(8.0);
                    }
                    if ui.button(labels.close).clicked() {
                        close_clicked = true;
                    }
                });
            });

        if !open || close_clicked {
            self.session.close_instructions();
            self.copied_at = None;
        }
    }

    fn handle_submit(&mut self, ctx: &egui::Context) {
        let composer = Arc::clone(&self.composer);
        let valid = match self.session.begin_submit(|form| composer.validate(form)) {
            Ok(Some(valid)) => valid,
            Ok(None) => return,
            Err(_) => {
                debug!("Submission already in flight");
                return;
            }
        };

        let language = self.session.language();
        let identity = Arc::clone(&self.identity);
        let tokens = Arc::clone(&self.tokens);
        let mailbox = Arc::clone(&self.mailbox);
        let sender = self.sender.clone();
        let guard = FinishGuard {
            sender: self.sender.clone(),
            ctx: ctx.clone(),
        };

        self.tokio_rt.spawn(async move {
            let _guard = guard;
            let outcome = composer
                .apply(valid, language, identity.as_ref(), tokens.as_ref(), mailbox.as_ref())
                .await;
            sender.send(Message::Outcome(outcome)).ok();
        });
    }
}

impl eframe::App for AutoReplyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Process Background Messages
        while let Ok(message) = self.receiver.try_recv() {
            match message {
                Message::Outcome(outcome) => self.session.record_outcome(outcome),
                Message::SubmitFinished => self.session.finish_submit(),
            }
        }
        self.session.expire_status(Instant::now());

        let labels = self.session.labels();
        let submitting = self.session.phase() == SubmitPhase::Submitting;

        // Status bar at the bottom
        egui::TopBottomPanel::bottom("status_panel")
            .frame(egui::Frame::new().inner_margin(Margin::symmetric(10, 5)))
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    if submitting {
                        ui.add(egui::Spinner::new().size(14.0));
                        ui.add_space(5.0);
                    }
                    if let Some(status) = self.session.status() {
                        let color = match status.kind {
                            StatusKind::Success => Color32::DARK_GREEN,
                            StatusKind::Info => Color32::from_rgb(0x1F, 0x5F, 0xAF),
                            StatusKind::Error => Color32::DARK_RED,
                        };
                        ui.colored_label(color, &status.text);
                    }
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::new().inner_margin(Margin::same(15)))
            .show(ctx, |ui| {
                ui.heading(labels.heading);
                ui.separator();
                ui.add_space(10.0);

                ui.with_layout(egui::Layout::top_down(egui::Align::LEFT), |ui| {
                    self.ui_form(ui);
                    ui.add_space(15.0);
                    self.ui_preview(ui);
                    ui.add_space(15.0);

                    ui.with_layout(egui::Layout::top_down(egui::Align::Center), |ui| {
                        let submit_button = egui::Button::new(self.session.submit_label())
                            .min_size(Vec2::new(ui.available_width() * 0.5, 30.0));
                        if ui
                            .add_enabled(self.session.submit_enabled(), submit_button)
                            .clicked()
                        {
                            self.handle_submit(ctx);
                        }
                    });
                });
            });

        self.ui_instructions(ctx);

        if let Some(delay) = repaint_delay(self.session.phase(), self.session.status().is_some()) {
            ctx.request_repaint_after(delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finish_guard_reports_when_task_panics() {
        let rt = Runtime::new().unwrap();
        let (sender, receiver) = mpsc::channel();
        let guard = FinishGuard {
            sender,
            ctx: egui::Context::default(),
        };

        let handle = rt.spawn(async move {
            let _guard = guard;
            panic!("mailbox client blew up");
        });
        assert!(rt.block_on(handle).is_err());

        let message = receiver.recv_timeout(Duration::from_secs(1));
        assert!(matches!(message, Ok(Message::SubmitFinished)));
    }

    #[test]
    fn finish_guard_follows_the_outcome() {
        let rt = Runtime::new().unwrap();
        let (sender, receiver) = mpsc::channel();
        let guard = FinishGuard {
            sender: sender.clone(),
            ctx: egui::Context::default(),
        };

        rt.block_on(async move {
            let _guard = guard;
            sender.send(Message::Outcome(SubmissionOutcome::Applied)).ok();
        });

        assert!(matches!(
            receiver.try_recv(),
            Ok(Message::Outcome(SubmissionOutcome::Applied))
        ));
        assert!(matches!(receiver.try_recv(), Ok(Message::SubmitFinished)));
    }

    #[test]
    fn submitting_ticks_slowly_instead_of_spinning() {
        assert_eq!(repaint_delay(SubmitPhase::Submitting, false), Some(SPINNER_FRAME));
        assert_eq!(repaint_delay(SubmitPhase::Submitting, true), Some(SPINNER_FRAME));
        assert_eq!(repaint_delay(SubmitPhase::Idle, true), Some(STATUS_POLL));
        assert_eq!(repaint_delay(SubmitPhase::Idle, false), None);
    }
}
