use crate::bot::Data;

pub mod admin_cog;
pub mod lockdown_cog;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub use admin_cog::AdminCog;
pub use lockdown_cog::LockdownCog;
use poise::Command;

pub trait Cog {
    fn commands(&self) -> Vec<Command<Data, Error>>;
}

pub struct Cogs;

impl Cog for Cogs {
    fn commands(&self) -> Vec<Command<Data, Error>> {
        let admin_cog = AdminCog;
        let lockdown_cog = LockdownCog;

        admin_cog
            .commands()
            .into_iter()
            .chain(lockdown_cog.commands())
            .collect()
    }
}
