use poise::serenity_prelude::Permissions;

use crate::bot::commands::Context;
use crate::bot::commands::Error;
use crate::bot::error::BotError;

/// Fails unless the command author has `Administrator` or `Manage Server` in
/// the current guild.
pub async fn is_author_guild_admin(ctx: Context<'_>) -> Result<(), Error> {
    let member = ctx
        .author_member()
        .await
        .ok_or(BotError::GuildOnlyCommand)?;
    let permissions = ctx
        .guild()
        .ok_or(BotError::GuildOnlyCommand)?
        .member_permissions(member.as_ref());

    Ok(check_admin_inner(
        permissions.contains(Permissions::ADMINISTRATOR)
            || permissions.contains(Permissions::MANAGE_GUILD),
    )?)
}

fn check_admin_inner(is_admin: bool) -> Result<(), BotError> {
    if is_admin {
        return Ok(());
    }

    Err(BotError::PermissionDenied(
        "You need the `Manage Server` or `Administrator` permission to perform this action."
            .to_string(),
    ))
}
