pub mod checks;
pub mod commands;
pub mod error;
pub mod error_handler;

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use futures::lock::Mutex;
use log::info;
use poise::Framework;
use poise::FrameworkOptions;
use poise::serenity_prelude::Client;
use poise::serenity_prelude::ClientBuilder;
use poise::serenity_prelude::FullEvent;
use poise::serenity_prelude::GatewayIntents;
use poise::serenity_prelude::Http;
use poise::serenity_prelude::Token;
use poise::serenity_prelude::UserId;

use crate::bot::commands::Cog;
use crate::bot::commands::Cogs;
use crate::bot::error_handler::ErrorHandler;
use crate::config::Config;
use crate::service::Services;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub struct Data {
    pub config: Arc<Config>,
    pub services: Arc<Services>,
}

pub struct Bot {
    pub http: Arc<Http>,
    client_builder: Option<ClientBuilder>,
    client: Arc<Mutex<Option<Client>>>,
}

impl Bot {
    pub async fn new(config: Arc<Config>, services: Arc<Services>) -> Result<Self> {
        info!("Initializing bot...");

        let framework = Self::create_framework(&config)?;
        let data = Arc::new(Data {
            config: config.clone(),
            services: services.clone(),
        });
        let (token, intents) = Self::create_client_config(&config)?;
        let event_handler = Arc::new(BotEventHandler::new(config, services));

        let client_builder = ClientBuilder::new(token.clone(), intents)
            .event_handler(event_handler)
            .framework(framework)
            .data(data);

        Ok(Self {
            http: Arc::new(Http::new(token)),
            client_builder: Some(client_builder),
            client: Arc::new(Mutex::new(None)),
        })
    }

    pub fn start(&mut self) {
        info!("Starting bot client...");
        let client_builder = self.client_builder.take().expect("start() called twice");
        let client = self.client.clone();

        tokio::spawn(async move {
            info!("Connecting bot to Discord...");
            let built_client = client_builder
                .await
                .expect("Failed to build Discord client");

            *client.lock().await = Some(built_client);
            info!("Bot connected to Discord.");

            client
                .lock()
                .await
                .as_mut()
                .unwrap()
                .start()
                .await
                .expect("Bot client crashed");
        });

        info!("Bot client start initiated.");
    }

    fn create_framework(config: &Config) -> Result<Box<Framework<Data, Error>>> {
        let cogs = Cogs;
        let options = FrameworkOptions::<Data, Error> {
            commands: cogs.commands(),
            on_error: |error| Box::pin(Self::on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                edit_tracker: Some(Arc::new(poise::EditTracker::for_timespan(
                    Duration::from_secs(3600),
                ))),
                ..Default::default()
            },
            owners: HashSet::from([UserId::from_str(&config.admin_id)
                .map_err(|_| anyhow::anyhow!("Invalid admin ID"))?]),
            ..Default::default()
        };

        Ok(Box::new(
            poise::Framework::builder().options(options).build(),
        ))
    }

    fn create_client_config(config: &Config) -> Result<(Token, GatewayIntents)> {
        let token = Token::from_str(&config.discord_token)?;
        // GUILD_MEMBERS is privileged but required to observe member joins.
        let intents = GatewayIntents::non_privileged()
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::MESSAGE_CONTENT;
        Ok((token, intents))
    }

    async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
        ErrorHandler::handle(error).await;
    }
}

pub struct BotEventHandler {
    config: Arc<Config>,
    services: Arc<Services>,
}

impl BotEventHandler {
    pub fn new(config: Arc<Config>, services: Arc<Services>) -> Self {
        Self { config, services }
    }
}

#[async_trait]
impl poise::serenity_prelude::EventHandler for BotEventHandler {
    async fn dispatch(&self, _context: &poise::serenity_prelude::Context, event: &FullEvent) {
        #[allow(clippy::single_match)]
        match event {
            FullEvent::GuildMemberAddition { new_member, .. } => {
                if !self.config.features.raid_protection {
                    return;
                }
                // The tracker is chat-platform agnostic: translate the
                // serenity IDs to opaque strings at this boundary.
                self.services.raid_protection.handle_join(
                    &new_member.guild_id.to_string(),
                    &new_member.user.id.to_string(),
                    Utc::now(),
                );
            }
            _ => {}
        };
    }
}
