//! Outbound Discord calls made by the verification flow.
//!
//! The flow only talks to Discord through [`DiscordGateway`], so it can be
//! driven by a recording double in tests.

use async_trait::async_trait;
use poise::serenity_prelude::{
    self as serenity, ButtonStyle, ChannelId, CreateActionRow, CreateAllowedMentions,
    CreateButton, CreateMessage, EditMessage, GuildId, MessageId, RoleId, UserId,
};
use tracing::debug;

use super::action::{ReviewAction, ReviewRequest};
use crate::error::Result;

#[async_trait]
pub trait DiscordGateway: Send + Sync {
    async fn add_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<()>;

    async fn remove_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId)
        -> Result<()>;

    /// Open a DM channel with the user and send `content`
    async fn send_dm(&self, user_id: UserId, content: &str) -> Result<()>;

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()>;

    /// Post a review request with Approve / Deny buttons for `user_id`
    async fn post_review(
        &self,
        channel_id: ChannelId,
        content: &str,
        user_id: UserId,
    ) -> Result<MessageId>;

    /// Replace the review message content and drop its buttons
    async fn close_review(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> Result<()>;

    async fn kick(&self, guild_id: GuildId, user_id: UserId) -> Result<()>;

    /// First guild the bot is in where `user_id` is a member
    async fn find_member_guild(&self, user_id: UserId) -> Option<GuildId>;
}

/// Buttons attached to an audit channel review message
pub fn review_buttons(user_id: UserId) -> Vec<CreateActionRow> {
    let approve = ReviewRequest::new(ReviewAction::Approve, user_id);
    let deny = ReviewRequest::new(ReviewAction::Deny, user_id);

    vec![CreateActionRow::Buttons(vec![
        CreateButton::new(approve.custom_id())
            .label("Approve")
            .style(ButtonStyle::Success),
        CreateButton::new(deny.custom_id())
            .label("Deny")
            .style(ButtonStyle::Danger),
    ])]
}

/// Audit channel review post. Only the requesting user may be pinged, so a
/// display name like `@everyone` stays inert.
pub fn review_message(content: &str, user_id: UserId) -> CreateMessage {
    CreateMessage::new()
        .content(content)
        .allowed_mentions(CreateAllowedMentions::new().users(vec![user_id]))
        .components(review_buttons(user_id))
}

/// [`DiscordGateway`] backed by a live serenity context
pub struct SerenityGateway {
    ctx: serenity::Context,
}

impl SerenityGateway {
    pub fn new(ctx: &serenity::Context) -> Self {
        Self { ctx: ctx.clone() }
    }
}

#[async_trait]
impl DiscordGateway for SerenityGateway {
    async fn add_role(&self, guild_id: GuildId, user_id: UserId, role_id: RoleId) -> Result<()> {
        self.ctx
            .http
            .add_member_role(guild_id, user_id, role_id, Some("Awaiting email verification"))
            .await?;
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: GuildId,
        user_id: UserId,
        role_id: RoleId,
    ) -> Result<()> {
        self.ctx
            .http
            .remove_member_role(guild_id, user_id, role_id, Some("Email verification approved"))
            .await?;
        Ok(())
    }

    async fn send_dm(&self, user_id: UserId, content: &str) -> Result<()> {
        let dm_channel = user_id.create_dm_channel(&self.ctx.http).await?;
        dm_channel
            .send_message(&self.ctx.http, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn send_message(&self, channel_id: ChannelId, content: &str) -> Result<()> {
        channel_id
            .send_message(&self.ctx.http, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }

    async fn post_review(
        &self,
        channel_id: ChannelId,
        content: &str,
        user_id: UserId,
    ) -> Result<MessageId> {
        let message = channel_id
            .send_message(&self.ctx.http, review_message(content, user_id))
            .await?;
        Ok(message.id)
    }

    async fn close_review(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        content: &str,
    ) -> Result<()> {
        channel_id
            .edit_message(
                &self.ctx.http,
                message_id,
                EditMessage::new().content(content).components(vec![]),
            )
            .await?;
        Ok(())
    }

    async fn kick(&self, guild_id: GuildId, user_id: UserId) -> Result<()> {
        guild_id.kick(&self.ctx.http, user_id).await?;
        Ok(())
    }

    async fn find_member_guild(&self, user_id: UserId) -> Option<GuildId> {
        for guild_id in self.ctx.cache.guilds() {
            match guild_id.member(&self.ctx, user_id).await {
                Ok(_) => return Some(guild_id),
                Err(e) => debug!("{} is not a member of guild {}: {}", user_id, guild_id, e),
            }
        }
        None
    }
}
