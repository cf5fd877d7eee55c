use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::managers::ConfigStore;
use crate::messages;
use crate::{Context, Error};

/// Set the channel used for verification announcements
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn set_verification_channel(
    ctx: Context<'_>,
    #[description = "The channel to announce new members in"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let channel_id = channel.id;
    update_server(
        ctx,
        |server| server.set_verification_channel(channel_id),
        |_| messages::verification_channel_set(channel_id),
    )
    .await
}

/// Set the member audit channel
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn set_member_audit_channel(
    ctx: Context<'_>,
    #[description = "The channel to use for member audits"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let channel_id = channel.id;
    update_server(
        ctx,
        |server| server.set_member_audit_channel(channel_id),
        |_| messages::audit_channel_set(channel_id),
    )
    .await
}

/// Set the unverified role
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn set_unverified_role(
    ctx: Context<'_>,
    #[description = "The role to set as the unverified role"] role: serenity::Role,
) -> Result<(), Error> {
    let role_id = role.id;
    update_server(
        ctx,
        |server| server.set_unverified_role(role_id),
        |_| messages::unverified_role_set(role_id),
    )
    .await
}

/// Enable rate limiting for email verification
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn enable_rate_limit(ctx: Context<'_>) -> Result<(), Error> {
    update_server(ctx, ServerConfig::enable_rate_limit, |server| {
        messages::rate_limit_enabled(server.rate_limit_minutes())
    })
    .await
}

/// Disable rate limiting for email verification
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn disable_rate_limit(ctx: Context<'_>) -> Result<(), Error> {
    update_server(ctx, ServerConfig::disable_rate_limit, |_| {
        messages::rate_limit_disabled()
    })
    .await
}

/// Set the rate limit for email verification
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn set_rate_limit(
    ctx: Context<'_>,
    #[description = "The number of minutes to set the rate limit to"]
    #[min = 1]
    #[max = 525600]
    minutes: u32,
) -> Result<(), Error> {
    update_server(
        ctx,
        |server| server.set_rate_limit_minutes(minutes),
        |server| messages::rate_limit_set(server.rate_limit_minutes()),
    )
    .await
}

/// Check the current rate limit status
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn check_rate_limit(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server")?;

    let content = match ctx.data().config.get(guild_id).await {
        Some(server) => {
            messages::rate_limit_status(server.rate_limit_enabled, server.rate_limit_minutes())
        }
        None => messages::NO_RATE_LIMIT_CONFIGURED.to_string(),
    };

    ctx.say(content).await?;
    Ok(())
}

/// Apply `mutate` to this guild's settings and reply with the outcome
async fn update_server<M, R>(ctx: Context<'_>, mutate: M, confirmation: R) -> Result<(), Error>
where
    M: FnOnce(&mut ServerConfig),
    R: FnOnce(&ServerConfig) -> String,
{
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server")?;

    let content = apply_update(&ctx.data().config, guild_id, mutate, confirmation).await;
    info!(
        "Config command '{}' for guild {} run by {}",
        ctx.command().qualified_name,
        guild_id,
        ctx.author().name
    );

    ctx.say(content).await?;
    Ok(())
}

/// Upsert the guild entry and build the reply. Save failures become the
/// reply text instead of failing the command.
async fn apply_update<M, R>(
    store: &ConfigStore,
    guild_id: serenity::GuildId,
    mutate: M,
    confirmation: R,
) -> String
where
    M: FnOnce(&mut ServerConfig),
    R: FnOnce(&ServerConfig) -> String,
{
    match store.upsert(guild_id, mutate).await {
        Ok(server) => confirmation(&server),
        Err(e) => {
            error!("Failed to save config for guild {}: {}", guild_id, e);
            messages::save_error(&e)
        }
    }
}
