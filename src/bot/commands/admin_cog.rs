/// Cog of guild-admin maintenance commands.
use poise::samples::create_application_commands;

use crate::bot::checks::is_author_guild_admin;
use crate::bot::commands::Cog;
use crate::bot::commands::Context;
use crate::bot::commands::Error;
use crate::bot::error::BotError;

pub struct AdminCog;

impl AdminCog {
    /// Syncs the slash commands to the current guild.
    #[poise::command(prefix_command, hide_in_help)]
    pub async fn register(ctx: Context<'_>) -> Result<(), Error> {
        is_author_guild_admin(ctx).await?;
        let guild_id = ctx.guild_id().ok_or(BotError::GuildOnlyCommand)?;

        let create_commands = create_application_commands(&ctx.framework().options().commands);
        guild_id.set_commands(ctx.http(), &create_commands).await?;

        ctx.reply(format!(
            ":white_check_mark: Registered {} guild commands.",
            create_commands.len()
        ))
        .await?;
        Ok(())
    }

    /// Removes all slash commands from the current guild.
    #[poise::command(prefix_command, hide_in_help)]
    pub async fn unregister(ctx: Context<'_>) -> Result<(), Error> {
        is_author_guild_admin(ctx).await?;
        let guild_id = ctx.guild_id().ok_or(BotError::GuildOnlyCommand)?;

        guild_id.set_commands(ctx.http(), &[]).await?;

        ctx.reply(":white_check_mark: Unregistered all guild commands.")
            .await?;
        Ok(())
    }
}

impl Cog for AdminCog {
    fn commands(&self) -> Vec<poise::Command<crate::bot::Data, Error>> {
        vec![Self::register(), Self::unregister()]
    }
}
