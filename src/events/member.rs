use poise::serenity_prelude as serenity;
use tracing::info;

use crate::verification::SerenityGateway;
use crate::{Data, Error};

/// Handle when a new member joins the guild
pub async fn handle_member_add(
    ctx: &serenity::Context,
    new_member: &serenity::Member,
    data: &Data,
) -> Result<(), Error> {
    if new_member.user.bot {
        return Ok(());
    }

    info!(
        "New member joined: {} in guild {}",
        new_member.user.name, new_member.guild_id
    );

    let gateway = SerenityGateway::new(ctx);
    data.verification
        .member_joined(&gateway, new_member.guild_id, new_member.user.id)
        .await;

    Ok(())
}
