use poise::serenity_prelude as serenity;
use tracing::debug;

use crate::verification::{SerenityGateway, SubmissionOutcome, Submitter};
use crate::{Data, Error};

/// Handle incoming messages
pub async fn handle_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    // Ignore bot messages
    if msg.author.bot {
        return Ok(());
    }

    // Only DMs are verification attempts
    if msg.guild_id.is_some() {
        return Ok(());
    }

    handle_dm_message(ctx, msg, data).await
}

/// Treat a DM as an email submission
async fn handle_dm_message(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> Result<(), Error> {
    debug!("Processing DM from: {}", msg.author.name);

    let gateway = SerenityGateway::new(ctx);
    let submitter = Submitter {
        user_id: msg.author.id,
        display_name: msg.author.display_name(),
    };

    let outcome = data
        .verification
        .email_submitted(&gateway, submitter, &msg.content)
        .await;

    if let SubmissionOutcome::Forwarded { guild_id, .. } = outcome {
        debug!("{} is now pending review in guild {}", msg.author.name, guild_id);
    }

    Ok(())
}
