//! Subscriber that posts raid alerts to the configured Discord channel.

use std::sync::Arc;

use anyhow::Result;
use log::debug;
use log::info;
use log::warn;
use poise::serenity_prelude::ChannelId;
use poise::serenity_prelude::CreateMessage;

use crate::bot::Bot;
use crate::config::Config;
use crate::event::Event;
use crate::event::LockdownLiftedEvent;
use crate::event::RaidDetectedEvent;
use crate::subscriber::Subscriber;

/// Posts a message when lockdown activates or is lifted.
///
/// The destination channel comes from `ALERT_CHANNEL_ID`. When unset, the
/// alert is only logged; detection itself is unaffected.
pub struct RaidAlertSubscriber {
    bot: Arc<Bot>,
    config: Arc<Config>,
}

impl RaidAlertSubscriber {
    pub fn new(bot: Arc<Bot>, config: Arc<Config>) -> Self {
        debug!("Initializing RaidAlertSubscriber.");
        Self { bot, config }
    }

    async fn send_alert(&self, content: String) -> Result<()> {
        let Some(channel_id) = self.config.alert_channel_id else {
            warn!("No alert channel configured, skipping alert: {content}");
            return Ok(());
        };

        let channel = ChannelId::new(channel_id)
            .to_guild_channel(&self.bot.http, None)
            .await?;
        channel
            .send_message(&self.bot.http, CreateMessage::new().content(content))
            .await?;

        info!("Alert posted to channel {channel_id}.");
        Ok(())
    }
}

#[async_trait::async_trait]
impl Subscriber<RaidDetectedEvent> for RaidAlertSubscriber {
    async fn callback(&self, event: RaidDetectedEvent) -> Result<()> {
        debug!("Received event `{}`", event.event_name());
        self.send_alert(format!(
            "🚨 **Raid detected** in guild `{}` at <t:{}:T>. Lockdown is now active — \
             use `/lockdown lift` once the raid subsides.",
            event.guild_id,
            event.activated_at.timestamp()
        ))
        .await
    }
}

#[async_trait::async_trait]
impl Subscriber<LockdownLiftedEvent> for RaidAlertSubscriber {
    async fn callback(&self, event: LockdownLiftedEvent) -> Result<()> {
        debug!("Received event `{}`", event.event_name());
        self.send_alert(format!(
            "🔓 Lockdown lifted for guild `{}`.",
            event.guild_id
        ))
        .await
    }
}
