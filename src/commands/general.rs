use poise::serenity_prelude as serenity;
use tracing::info;

use crate::{Context, Error};

/// Check if the bot is running
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    info!("Ping command called by {}", ctx.author().name);
    ctx.send(poise::CreateReply::default()
        .content("Pong! Bot is working!")
        .ephemeral(true))
        .await?;
    Ok(())
}

/// Show help information
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let embed = serenity::CreateEmbed::new()
        .title("Bot Commands")
        .description("New members verify by sending their university email to the bot in a DM. Admin commands:")
        .field("/set_member_audit_channel", "Channel where moderators approve or deny requests", false)
        .field("/set_unverified_role", "Role given to members until they are approved", false)
        .field("/set_verification_channel", "Channel where new members are greeted", false)
        .field("/enable_rate_limit, /disable_rate_limit", "Toggle the limit on verification attempts", false)
        .field("/set_rate_limit", "Minutes a member must wait between attempts", false)
        .field("/check_rate_limit", "Show the current rate limit", false)
        .field("/pending_verifications", "List requests awaiting review", false)
        .color(0x3498db);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true)).await?;
    Ok(())
}
