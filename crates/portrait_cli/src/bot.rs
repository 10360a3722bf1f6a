//! Update dispatch: photos go through the analysis pipeline, text goes to commands.

use anyhow::{Context, Result};
use portrait_analysis::{render_report, Analyzer};
use portrait_core::config::TelegramConfig;
use portrait_core::{FaceBackend, ReportStore};
use portrait_memory::{render_summary, Comparison};
use portrait_telegram::{Command, Message, PhotoSize, TelegramClient, Update};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::backend::decode_luma;

const START_TEXT: &str = "👋 Надішли фото обличчя, і я сформую розширений психологічний портрет.\n\n\
📌 Доступні функції:\n\
• збереження історії аналізів\n\
• порівняння стану за фото: /compare\n\
• адмін-звіт HR: /summary <user_id>";

const PLEASE_SEND_PHOTO: &str = "Надішли фото обличчя або скористайся /start.";
const PROCESSING: &str = "⏳ Аналізую фото…";
const SAVED: &str = "💾 Звіт додано в історію.\nПерегляд та порівняння: /compare";
const NEED_TWO: &str = "Потрібно мінімум 2 фото для порівняння.";
const FORBIDDEN: &str = "⛔ Доступ заборонений.";
const SUMMARY_USAGE: &str = "Формат: /summary user_id";
const NO_HISTORY: &str = "У користувача немає збережених аналізів.";
const INTERNAL_ERROR: &str = "⚠️ Під час обробки сталася помилка. Спробуй ще раз пізніше.";

pub struct Bot {
    telegram: TelegramClient,
    backend: Arc<dyn FaceBackend>,
    analyzer: Analyzer,
    store: Arc<dyn ReportStore>,
    config: TelegramConfig,
}

impl Bot {
    pub fn new(
        telegram: TelegramClient,
        backend: Arc<dyn FaceBackend>,
        analyzer: Analyzer,
        store: Arc<dyn ReportStore>,
        config: TelegramConfig,
    ) -> Self {
        Self {
            telegram,
            backend,
            analyzer,
            store,
            config,
        }
    }

    /// Long-poll forever, handling each update in its own task.
    pub async fn run(self: Arc<Self>) -> Result<()> {
        let mut offset: Option<i64> = None;
        info!("Polling for updates (classifier: {})", self.analyzer.classifier_name());
        loop {
            match self.telegram.get_updates(offset, self.config.poll_timeout_secs).await {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        let bot = self.clone();
                        tokio::spawn(async move { bot.handle(update).await });
                    }
                }
                Err(e) => {
                    error!("getUpdates failed: {:#}", e);
                    tokio::time::sleep(Duration::from_secs(5)).await;
                }
            }
        }
    }

    /// Handle one update. Failures are logged and reported to the chat, never propagated.
    pub async fn handle(&self, update: Update) {
        let Some(message) = update.message else {
            return;
        };
        if let Err(e) = self.dispatch(&message).await {
            error!("Update {} failed: {:#}", update.update_id, e);
            if let Err(e) = self.telegram.send_message(message.chat.id, INTERNAL_ERROR).await {
                warn!("Could not report failure to chat {}: {:#}", message.chat.id, e);
            }
        }
    }

    async fn dispatch(&self, message: &Message) -> Result<()> {
        let chat_id = message.chat.id;
        let user_id = message.sender_id().unwrap_or(chat_id);

        if let Some(photo) = message.largest_photo() {
            return self.handle_photo(chat_id, user_id, photo).await;
        }

        let text = message.text.as_deref().unwrap_or_default();
        let reply = match Command::parse(text) {
            Some(Command::Start) => START_TEXT.to_string(),
            Some(Command::Compare) => self.compare(user_id).await?,
            Some(Command::Summary(target)) => self.summary(user_id, target).await?,
            Some(Command::Unknown(name)) => {
                info!("Unknown command /{} from {}", name, user_id);
                PLEASE_SEND_PHOTO.to_string()
            }
            None => PLEASE_SEND_PHOTO.to_string(),
        };
        self.telegram.send_message(chat_id, &reply).await?;
        Ok(())
    }

    async fn handle_photo(&self, chat_id: i64, user_id: i64, photo: &PhotoSize) -> Result<()> {
        self.telegram.send_message(chat_id, PROCESSING).await?;

        let file = self.telegram.get_file(&photo.file_id).await?;
        let remote_path = file.file_path.context("Telegram returned a file without a path")?;
        let bytes = self.telegram.download_file(&remote_path).await?;
        let image_path = self.save_photo(user_id, &photo.file_id, &bytes).await?;

        let face = self.backend.detect(&bytes).await?;
        let image = match decode_luma(&bytes) {
            Ok(image) => Some(image),
            Err(e) => {
                warn!("Could not decode photo {}: {:#}", image_path.display(), e);
                None
            }
        };

        let analysis = match self.analyzer.analyze(face.as_ref(), image.as_ref()) {
            Ok(analysis) => analysis,
            Err(e) => {
                info!("No analysis for user {}: {}", user_id, e);
                self.telegram.send_message(chat_id, e.user_message()).await?;
                return Ok(());
            }
        };

        let report = render_report(&analysis);
        let image_path = image_path.to_string_lossy();
        let saved = match self.store.save_report(user_id, &image_path, &analysis, &report).await {
            Ok(id) => {
                info!("Saved report {} for user {}", id, user_id);
                true
            }
            Err(e) => {
                error!("Failed to save report for user {}: {:#}", user_id, e);
                false
            }
        };

        self.telegram
            .send_long_message(chat_id, &report, self.config.chunk_size)
            .await?;
        if saved {
            self.telegram.send_message(chat_id, SAVED).await?;
        }
        Ok(())
    }

    async fn save_photo(&self, user_id: i64, file_id: &str, bytes: &[u8]) -> Result<PathBuf> {
        let dir = PathBuf::from(&self.config.photo_dir);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create photo directory {}", dir.display()))?;
        let path = dir.join(format!("{}_{}.jpg", user_id, file_id));
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write photo {}", path.display()))?;
        Ok(path)
    }

    async fn compare(&self, user_id: i64) -> Result<String> {
        let reports = self.store.user_reports(user_id).await?;
        Ok(match reports.as_slice() {
            [latest, previous, ..] => Comparison::between(latest, previous).render(),
            _ => NEED_TWO.to_string(),
        })
    }

    async fn summary(&self, requester: i64, target: Option<i64>) -> Result<String> {
        if !self.config.is_admin(requester) {
            warn!("User {} attempted /summary without admin rights", requester);
            return Ok(FORBIDDEN.to_string());
        }
        let Some(target) = target else {
            return Ok(SUMMARY_USAGE.to_string());
        };
        let reports = self.store.user_reports(target).await?;
        Ok(match reports.first() {
            Some(latest) => render_summary(target, latest),
            None => NO_HISTORY.to_string(),
        })
    }
}
