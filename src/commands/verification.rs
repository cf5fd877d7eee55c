use poise::serenity_prelude as serenity;
use tracing::info;

use crate::verification::PendingReview;
use crate::{Context, Error};

/// Requests listed before the rest are summarized
const MAX_LISTED: usize = 20;

/// List verification requests waiting for a moderator
#[poise::command(
    slash_command,
    guild_only,
    default_member_permissions = "ADMINISTRATOR"
)]
pub async fn pending_verifications(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = ctx.guild_id().ok_or("This command can only be used in a server")?;
    let pending = ctx.data().verification.pending().for_guild(guild_id);

    info!(
        "{} listed {} pending verification(s) in guild {}",
        ctx.author().name,
        pending.len(),
        guild_id
    );

    if pending.is_empty() {
        ctx.send(
            poise::CreateReply::default()
                .content("There are no pending verification requests.")
                .ephemeral(true),
        )
        .await?;
        return Ok(());
    }

    let embed = serenity::CreateEmbed::new()
        .title("Pending Verifications")
        .description(format_pending(&pending))
        .footer(serenity::CreateEmbedFooter::new(format!(
            "{} request(s) awaiting review",
            pending.len()
        )))
        .color(0xf1c40f);

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

fn format_pending(pending: &[PendingReview]) -> String {
    let mut lines: Vec<String> = pending
        .iter()
        .take(MAX_LISTED)
        .map(|review| {
            format!(
                "<@{}> `{}` submitted <t:{}:R> ([request]({}))",
                review.user_id,
                review.email,
                review.submitted_at.timestamp(),
                review
                    .audit_message_id
                    .link(review.audit_channel_id, Some(review.guild_id))
            )
        })
        .collect();

    if pending.len() > MAX_LISTED {
        lines.push(format!("…and {} more", pending.len() - MAX_LISTED));
    }

    lines.join("\n")
}
