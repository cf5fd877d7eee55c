use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::verification::SerenityGateway;
use crate::{Data, Error};

/// Handle a click on an audit message button
pub async fn handle_component(
    ctx: &serenity::Context,
    interaction: &serenity::ComponentInteraction,
    data: &Data,
) -> Result<(), Error> {
    if let Err(e) = interaction.defer_ephemeral(&ctx.http).await {
        error!("Error acknowledging interaction: {}", e);
        return Ok(());
    }

    info!(
        "Received button interaction: {} from {}",
        interaction.data.custom_id, interaction.user.name
    );

    let gateway = SerenityGateway::new(ctx);
    let outcome = data
        .verification
        .review_decision(
            &gateway,
            interaction.guild_id,
            &interaction.data.custom_id,
            interaction.channel_id,
            interaction.message.id,
        )
        .await;

    interaction
        .edit_response(
            &ctx.http,
            serenity::EditInteractionResponse::new().content(outcome.acknowledgement()),
        )
        .await?;

    Ok(())
}
