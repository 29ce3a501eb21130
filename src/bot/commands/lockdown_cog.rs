/// Cog for inspecting and lifting raid lockdowns.
use chrono::Utc;

use crate::bot::checks::is_author_guild_admin;
use crate::bot::commands::Cog;
use crate::bot::commands::Context;
use crate::bot::commands::Error;
use crate::bot::error::BotError;

/// How many recent joiners the status command lists at most.
const STATUS_JOINER_LIMIT: usize = 5;

pub struct LockdownCog;

impl LockdownCog {
    /// Inspect or lift the raid lockdown for this server
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("Self::status", "Self::lift")
    )]
    pub async fn lockdown(_ctx: Context<'_>) -> Result<(), Error> {
        Ok(())
    }

    /// Show the current join rate and lockdown state
    #[poise::command(slash_command)]
    pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
        let guild_id = ctx
            .guild_id()
            .ok_or(BotError::GuildOnlyCommand)?
            .to_string();
        let service = &ctx.data().services.raid_protection;
        let now = Utc::now();

        let count = service.window_len(&guild_id, now);
        let threshold = service.config().join_count_threshold;
        let timeframe_secs = service.config().timeframe.as_secs();

        let mut message = if service.is_lockdown_active(&guild_id) {
            let since = service
                .lockdown_activated_at(&guild_id)
                .map(|at| format!("<t:{}:R>", at.timestamp()))
                .unwrap_or_else(|| "unknown".to_string());
            format!(
                "🔒 **Lockdown active** (since {since}).\n\
                 {count} joins in the last {timeframe_secs}s (threshold: {threshold})."
            )
        } else {
            format!(
                "🔓 No lockdown active.\n\
                 {count} joins in the last {timeframe_secs}s (threshold: {threshold})."
            )
        };

        let joiners = service.recent_joiners(&guild_id, now);
        if !joiners.is_empty() {
            let listed: Vec<String> = joiners
                .iter()
                .rev()
                .take(STATUS_JOINER_LIMIT)
                .map(|id| format!("<@{id}>"))
                .collect();
            message.push_str(&format!("\nMost recent joiners: {}", listed.join(", ")));
        }

        ctx.say(message).await?;
        Ok(())
    }

    /// Lift an active lockdown
    #[poise::command(
        slash_command,
        default_member_permissions = "ADMINISTRATOR | MANAGE_GUILD"
    )]
    pub async fn lift(ctx: Context<'_>) -> Result<(), Error> {
        is_author_guild_admin(ctx).await?;
        let guild_id = ctx
            .guild_id()
            .ok_or(BotError::GuildOnlyCommand)?
            .to_string();

        if ctx.data().services.raid_protection.disable_lockdown(&guild_id) {
            ctx.say("✅ Lockdown **lifted**. New members are no longer flagged.")
                .await?;
        } else {
            ctx.say("❌ No lockdown is active in this server.").await?;
        }
        Ok(())
    }
}

impl Cog for LockdownCog {
    fn commands(&self) -> Vec<poise::Command<crate::bot::Data, Error>> {
        vec![Self::lockdown()]
    }
}
