// src/services/notification_service.rs

use std::sync::Arc;

use anyhow::bail;
use async_trait::async_trait;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::referral::ReferralStatus;

/// Mensagem push já localizada (pt/en) para um usuário.
#[derive(Debug, Clone, PartialEq)]
pub struct PushNotification {
    pub user_id: Uuid,
    pub title_pt: String,
    pub title_en: String,
    pub body_pt: String,
    pub body_en: String,
    /// Rota do frontend aberta ao tocar na notificação
    pub path: String,
}

impl PushNotification {
    pub fn status_changed(
        referrer_id: Uuid,
        referral_id: Uuid,
        referred_name: &str,
        status: ReferralStatus,
    ) -> Self {
        Self {
            user_id: referrer_id,
            title_pt: "Sua indicação foi atualizada".to_string(),
            title_en: "Your referral was updated".to_string(),
            body_pt: format!("{referred_name} agora está em \"{}\".", status.label()),
            body_en: format!("{referred_name} moved to \"{}\".", status.label()),
            path: format!("/indicacoes/{referral_id}"),
        }
    }
}

/// Corpo JSON enviado ao provedor de push.
pub fn build_payload(app_id: &str, notification: &PushNotification) -> Value {
    json!({
        "app_id": app_id,
        "include_aliases": { "external_id": [notification.user_id.to_string()] },
        "target_channel": "push",
        "headings": { "pt": notification.title_pt, "en": notification.title_en },
        "contents": { "pt": notification.body_pt, "en": notification.body_en },
        "data": { "url": notification.path },
    })
}

#[async_trait]
pub trait PushNotifier: Send + Sync {
    async fn send(&self, notification: &PushNotification) -> Result<(), anyhow::Error>;
}

pub struct HttpPushNotifier {
    url: String,
    app_id: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpPushNotifier {
    pub fn new(url: String, app_id: String, api_key: Option<String>) -> Self {
        Self {
            url,
            app_id,
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl PushNotifier for HttpPushNotifier {
    async fn send(&self, notification: &PushNotification) -> Result<(), anyhow::Error> {
        let payload = build_payload(&self.app_id, notification);

        let mut request = self.client.post(&self.url).json(&payload);
        if let Some(key) = &self.api_key {
            request = request.header(reqwest::header::AUTHORIZATION, format!("Key {key}"));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Push: resposta {} do provedor: {}", status, body);
        }
        Ok(())
    }
}

// Usado quando o push não está configurado
pub struct LogOnlyNotifier;

#[async_trait]
impl PushNotifier for LogOnlyNotifier {
    async fn send(&self, notification: &PushNotification) -> Result<(), anyhow::Error> {
        tracing::debug!(
            "Push desativado; notificação para {} descartada: {}",
            notification.user_id,
            notification.body_pt
        );
        Ok(())
    }
}

#[derive(Clone)]
pub struct NotificationService {
    notifier: Arc<dyn PushNotifier>,
}

impl NotificationService {
    pub fn new(notifier: Arc<dyn PushNotifier>) -> Self {
        Self { notifier }
    }

    /// Falha de entrega só é logada; a transição já foi gravada.
    pub async fn notify(&self, notification: PushNotification) -> bool {
        match self.notifier.send(&notification).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("⚠️ Falha ao enviar push para {}: {}", notification.user_id, e);
                false
            }
        }
    }
}
