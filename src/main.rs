use anyhow::{Context as _, Result};
use clap::Parser;
use dotenv::dotenv;
use poise::serenity_prelude as serenity;
use tokio::signal;
use tracing::{error, info, warn};

mod commands;
mod config;
mod error;
mod events;
mod logging;
mod managers;
mod messages;
mod verification;

use config::Settings;
use events::{handle_component, handle_member_add, handle_message};
use managers::{
    create_shared_config_store, create_shared_rate_limiter, ConfigStore, SharedConfigStore,
};
use verification::{
    create_shared_pending_store, create_shared_verification_service, PendingStore,
    SharedVerificationService, VerificationService,
};

type Error = Box<dyn std::error::Error + Send + Sync>;
type Context<'a> = poise::Context<'a, Data, Error>;

/// Shared application state
pub struct Data {
    pub config: SharedConfigStore,
    pub verification: SharedVerificationService,
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if let Err(e) = handle_message(ctx, new_message, data).await {
                error!("Failed to handle message: {}", e);
            }
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = handle_member_add(ctx, new_member, data).await {
                error!("Failed to handle new member: {}", e);
            }
        }
        serenity::FullEvent::InteractionCreate {
            interaction: serenity::Interaction::Component(component),
        } => {
            if let Err(e) = handle_component(ctx, component, data).await {
                error!("Failed to handle button interaction: {}", e);
            }
        }
        _ => {}
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    logging::init();
    logging::install_panic_hook();

    let settings = Settings::parse();

    match settings.application_id() {
        Some(id) => info!(
            "Bot ID: {} (configure intents at https://discord.com/developers/applications/{}/bot)",
            id, id
        ),
        None => warn!("Could not read the application ID from DISCORD_TOKEN"),
    }

    info!("Loading configuration from {}...", settings.config_path.display());
    let config_store = create_shared_config_store(
        ConfigStore::load(&settings.config_path)
            .await
            .context("Error loading config")?,
    );

    info!("Loading pending verifications from {}...", settings.pending_path.display());
    let pending_store = create_shared_pending_store(
        PendingStore::load(&settings.pending_path)
            .await
            .context("Error loading pending verifications")?,
    );

    let verification = create_shared_verification_service(VerificationService::new(
        config_store.clone(),
        create_shared_rate_limiter(),
        pending_store,
        settings.invite_url.clone(),
    ));

    let target_guild_id = settings.guild_id;
    match target_guild_id {
        Some(gid) => info!("Deploying commands to guild ID: {}", gid),
        None => info!("Deploying commands globally as no guild ID is provided (takes up to 1 hour to propagate)"),
    }

    // Build framework
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            pre_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' invoked by {} (ID: {}) in {}",
                        ctx.command().qualified_name,
                        ctx.author().name,
                        ctx.author().id,
                        ctx.guild_id().map(|g| g.to_string()).unwrap_or_else(|| "DM".to_string())
                    );
                })
            },
            post_command: |ctx| {
                Box::pin(async move {
                    info!(
                        "Command '{}' completed for {}",
                        ctx.command().qualified_name,
                        ctx.author().name
                    );
                })
            },
            on_error: |error| {
                Box::pin(async move {
                    match error {
                        poise::FrameworkError::Setup { error, .. } => {
                            error!("Failed to start the bot: {}", error);
                            std::process::exit(1);
                        }
                        poise::FrameworkError::Command { error, ctx, .. } => {
                            error!("Error in command '{}': {}", ctx.command().qualified_name, error);
                            let _ = ctx.say(format!("An error occurred: {}", error)).await;
                        }
                        poise::FrameworkError::ArgumentParse { error, input, ctx, .. } => {
                            error!("Argument parse error in '{}': {} (input: {:?})", ctx.command().qualified_name, error, input);
                            let _ = ctx.say(format!("Invalid argument: {}", error)).await;
                        }
                        poise::FrameworkError::MissingBotPermissions { missing_permissions, ctx, .. } => {
                            error!("Bot missing permissions for '{}': {:?}", ctx.command().qualified_name, missing_permissions);
                            let _ = ctx.say(format!("Bot is missing permissions: {:?}", missing_permissions)).await;
                        }
                        poise::FrameworkError::MissingUserPermissions { missing_permissions, ctx, .. } => {
                            error!("User {} missing permissions for '{}': {:?}", ctx.author().name, ctx.command().qualified_name, missing_permissions);
                        }
                        poise::FrameworkError::GuildOnly { ctx, .. } => {
                            error!("Command '{}' is guild-only, used in DM by {}", ctx.command().qualified_name, ctx.author().name);
                        }
                        other => {
                            error!("Other framework error: {}", other);
                        }
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            let config_store = config_store.clone();
            let verification = verification.clone();

            Box::pin(async move {
                info!("Bot logged in as: {}", ready.user.name);

                let commands = &framework.options().commands;
                match target_guild_id {
                    Some(gid) => {
                        poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(gid))
                            .await?;
                    }
                    None => {
                        poise::builtins::register_globally(ctx, commands).await?;
                    }
                }
                info!("Registered {} commands", commands.len());

                if ready.guilds.is_empty() {
                    warn!("Bot is not in any guilds yet");
                }

                Ok(Data {
                    config: config_store,
                    verification,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&settings.token, intents)
        .framework(framework)
        .await
        .context("Error creating Discord client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Shutting down...");
        shard_manager.shutdown_all().await;
    });

    info!("Bot is now running. Press CTRL-C to exit.");
    if let Err(e) = client.start().await {
        let err_str = e.to_string();
        if err_str.contains("Disallowed") || err_str.contains("intents") {
            error!("Failed to start bot: {}", e);
            error!("Enable the MESSAGE_CONTENT and GUILD_MEMBERS privileged intents in the Discord Developer Portal");
            return Err(anyhow::anyhow!(
                "Disallowed gateway intents: MESSAGE_CONTENT, GUILD_MEMBERS"
            ));
        }
        return Err(e.into());
    }
    warn!("Bot ended.");

    Ok(())
}
