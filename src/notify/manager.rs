use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::Mutex;
use tokio::time::{interval_at, MissedTickBehavior};

use super::discord::{is_missing_message, DiscordWebhook, Embed, Field, Footer, Payload};
use super::state::{StateStore, StoredState};
use crate::app::ports::{MinerMonitor, SpecsReader};
use crate::core::shutdown::ShutdownToken;
use crate::core::system_info::{current_username, Specs};
use crate::error::{GridError, Result};
use crate::ui::formatters::{
    format_duration_seconds, format_hashrate, format_power_cost, format_uptime, strip_core_info,
};

const STATUS_COLOR: u32 = 5763719;
const DOWN_COLOR: u32 = 16711680;

/// Timing of webhook updates.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub interval: Duration,
    pub retry_delay: Duration,
    /// Attempts made for the final "down" message once shutdown has started.
    pub down_attempts: u32,
    /// Time allowed for one send or edit before it counts as failed.
    pub request_timeout: Duration,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(10),
            retry_delay: Duration::from_secs(5),
            down_attempts: 3,
            request_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Copy)]
enum Retry<'a> {
    UntilCancelled(&'a ShutdownToken),
    Attempts(u32),
}

/// Posts the miner status to a webhook and keeps the persisted counters current.
pub struct Manager {
    webhook: DiscordWebhook,
    store: StateStore,
    config: NotifierConfig,
    base_total_seconds: i64,
    started_at: Instant,
    title: String,
    username: String,
    specs: Mutex<Specs>,
    state: Mutex<StoredState>,
}

impl Manager {
    /// Build a manager, restoring counters from `store`.
    pub fn new(webhook_url: &str, specs: Specs, store: StateStore) -> Result<Self> {
        let webhook = DiscordWebhook::new(webhook_url)?;
        let state = store.load()?;

        let title = strip_core_info(&specs.model);
        let username = resolve_username(std::env::var("USER").ok(), current_username, &title);

        Ok(Self {
            webhook,
            store,
            config: NotifierConfig::default(),
            base_total_seconds: state.total_runtime_seconds,
            started_at: Instant::now(),
            title,
            username,
            specs: Mutex::new(specs),
            state: Mutex::new(state),
        })
    }

    pub fn with_config(self, config: NotifierConfig) -> Self {
        Self { config, ..self }
    }

    pub fn stats(&self) -> StoredState {
        self.state.lock().clone()
    }

    /// Post an update every interval until shutdown, then post a final "down" message.
    pub async fn run(
        &self,
        monitor: Arc<dyn MinerMonitor>,
        specs_reader: Arc<dyn SpecsReader>,
        shutdown: ShutdownToken,
    ) {
        let start = tokio::time::Instant::now() + self.config.interval;
        let mut ticker = interval_at(start, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let hashrate = monitor.status().hashrate_hs;
            self.update_stats(hashrate);
            self.refresh_dynamic_specs(&specs_reader).await;

            let payload = self.status_payload(hashrate);
            self.send_or_edit(&payload, Retry::UntilCancelled(&shutdown))
                .await;
        }

        self.stop(&specs_reader).await;
    }

    /// Post the "down" message once and persist the runtime total.
    pub async fn stop(&self, specs_reader: &Arc<dyn SpecsReader>) {
        self.refresh_dynamic_specs(specs_reader).await;
        let payload = self.down_payload();
        self.send_or_edit(&payload, Retry::Attempts(self.config.down_attempts.max(1)))
            .await;
        self.update_total_runtime();
    }

    fn session_seconds(&self) -> i64 {
        self.started_at.elapsed().as_secs() as i64
    }

    pub(crate) fn update_stats(&self, hashrate: f64) {
        let total = self.base_total_seconds + self.session_seconds();
        self.update_state(|state| {
            state.last_hashrate = hashrate;
            if state.best_hashrate == 0.0 || hashrate > state.best_hashrate {
                state.best_hashrate = hashrate;
            }
            state.total_runtime_seconds = total;
        });
    }

    fn update_total_runtime(&self) {
        let total = self.base_total_seconds + self.session_seconds();
        self.update_state(|state| state.total_runtime_seconds = total);
    }

    fn update_state(&self, update: impl FnOnce(&mut StoredState)) {
        let mut state = self.state.lock();
        update(&mut state);
        if let Err(e) = self.store.save(&state) {
            log::warn!("notify update_state: {}", e);
        }
    }

    async fn refresh_dynamic_specs(&self, specs_reader: &Arc<dyn SpecsReader>) {
        let reader = Arc::clone(specs_reader);
        match tokio::task::spawn_blocking(move || reader.read_metrics()).await {
            Ok(Ok(metrics)) => {
                let mut specs = self.specs.lock();
                specs.cpu_temp = metrics.cpu_temp;
                specs.cpu_wattage = metrics.cpu_wattage;
            }
            Ok(Err(e)) => log::debug!("notify refresh_specs: {}", e),
            Err(e) => log::debug!("notify refresh_specs: {}", e),
        }
    }

    async fn send_or_edit(&self, payload: &Payload, retry: Retry<'_>) -> bool {
        let mut attempts = 0u32;
        loop {
            if let Retry::UntilCancelled(shutdown) = retry {
                if shutdown.is_cancelled() {
                    return false;
                }
            }
            attempts += 1;

            let message_id = self.state.lock().message_id.clone();
            let request = self.deliver(&message_id, payload);
            let result = match retry {
                Retry::UntilCancelled(shutdown) => tokio::select! {
                    _ = shutdown.cancelled() => return false,
                    result = request => result,
                },
                Retry::Attempts(_) => request.await,
            };

            match result {
                Ok(()) => return true,
                Err(e) if is_missing_message(&e) => {
                    log::warn!("notify edit_message: message {} is gone, posting a new one", message_id);
                    self.update_state(|state| state.message_id.clear());
                }
                Err(e) => log::warn!("notify send_or_edit: {}", e),
            }

            match retry {
                Retry::UntilCancelled(shutdown) => {
                    if !shutdown.sleep(self.config.retry_delay).await {
                        return false;
                    }
                }
                Retry::Attempts(max) => {
                    if attempts >= max {
                        return false;
                    }
                    tokio::time::sleep(self.config.retry_delay).await;
                }
            }
        }
    }

    /// Send a new message or edit the stored one, bounded by the request timeout.
    async fn deliver(&self, message_id: &str, payload: &Payload) -> Result<()> {
        let request = async {
            if message_id.is_empty() {
                let id = self.webhook.send_message(payload).await?;
                self.update_state(|state| state.message_id = id);
                Ok(())
            } else {
                self.webhook.edit_message(message_id, payload).await
            }
        };
        match tokio::time::timeout(self.config.request_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(GridError::other(format!(
                "webhook request timed out after {:?}",
                self.config.request_timeout
            ))),
        }
    }

    pub(crate) fn status_payload(&self, hashrate: f64) -> Payload {
        self.payload(self.title.clone(), format_hashrate(hashrate), STATUS_COLOR)
    }

    pub(crate) fn down_payload(&self) -> Payload {
        self.payload("Miner Down".to_string(), "miner is down".to_string(), DOWN_COLOR)
    }

    fn payload(&self, title: String, description: String, color: u32) -> Payload {
        let stats = self.stats();
        let mut fields = spec_fields(&self.specs.lock());
        fields.push(best_hashrate_field(stats.best_hashrate));
        fields.push(Field::inline(
            "Total Runtime",
            format_duration_seconds(stats.total_runtime_seconds),
        ));
        fields.push(Field::inline(
            "Electricity Cost",
            format_power_cost(stats.total_runtime_seconds),
        ));
        fields.push(Field::inline(
            "Updated",
            format!("<t:{}:R>", Utc::now().timestamp()),
        ));

        Payload {
            username: Some(self.username.clone()),
            embeds: vec![Embed {
                kind: "rich".to_string(),
                title,
                description,
                fields,
                footer: Some(Footer {
                    text: format!("Uptime: {}", format_uptime(self.started_at.elapsed())),
                }),
                color,
            }],
        }
    }
}

/// `$USER`, then the OS account name, then `fallback`.
pub(crate) fn resolve_username(
    env_user: Option<String>,
    os_user: impl FnOnce() -> Option<String>,
    fallback: &str,
) -> String {
    let usable = |name: Option<String>| {
        name.map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    };
    usable(env_user)
        .or_else(|| usable(os_user()))
        .unwrap_or_else(|| fallback.to_string())
}

/// Inline fields for every known hardware attribute.
pub fn spec_fields(specs: &Specs) -> Vec<Field> {
    let mut fields = Vec::new();
    if specs.cores > 0 && specs.threads > 0 {
        fields.push(Field::inline(
            "Cores/Threads",
            format!("{}C / {}T", specs.cores, specs.threads),
        ));
    }
    let optional = [
        ("CPU Temp", &specs.cpu_temp),
        ("CPU Power", &specs.cpu_wattage),
        ("RAM", &specs.ram),
        ("RAM Speed", &specs.ram_speed),
        ("Motherboard", &specs.motherboard),
    ];
    for (name, value) in optional {
        if !value.is_empty() {
            fields.push(Field::inline(name, value.clone()));
        }
    }
    fields
}

fn best_hashrate_field(best: f64) -> Field {
    if best <= 0.0 {
        Field::inline("Best Hashrate", "unknown")
    } else {
        Field::inline("Best Hashrate", format_hashrate(best))
    }
}
