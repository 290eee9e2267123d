mod commands;
mod common;
mod config;
mod entries;
mod messages;
mod notify;
mod orders;
mod parser;
mod storage;
mod verify;

use std::fmt::Display;
use std::fs;
use std::sync::Arc;
use std::{error::Error as StdError, process::exit};

use config::Config;
use futures::future::BoxFuture;
use log::debug;
use teloxide::error_handlers::ErrorHandler;

use teloxide::{
    dispatching::{DpHandlerDescription, UpdateHandler},
    prelude::*,
};

mod prelude {
    pub use super::{BotError, HandlerResult, Result};
    pub use crate::common::*;
    pub use crate::entries::prelude::*;
    pub use crate::storage::prelude::*;
}

pub type BoxedError = Box<dyn StdError + Send + Sync>;
pub type Result<T> = std::result::Result<T, BoxedError>;
pub type HandlerResult = Handler<'static, DependencyMap, Result<()>, DpHandlerDescription>;

#[derive(Debug)]
pub enum BotError {
    Unknown(String),
    Config(String),
}

impl BotError {
    pub fn unknown(s: &str) -> Self {
        Self::Unknown(s.to_owned())
    }

    pub fn config(s: &str) -> Self {
        Self::Config(s.to_owned())
    }
}

impl Display for BotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BotError::Unknown(s) => write!(f, "invalid request: {}", s),
            BotError::Config(s) => write!(f, "config error: {}", s),
        }
    }
}

impl StdError for BotError {}

struct DisplayErrorHandler;

impl<E> ErrorHandler<E> for DisplayErrorHandler
where
    E: Display,
{
    fn handle_error(self: Arc<Self>, error: E) -> BoxFuture<'static, ()> {
        log::error!("An error occurred: {}", error);
        Box::pin(async {})
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let config = match read_config() {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}", err);
            exit(1);
        }
    };

    let storage = storage::build();
    let bot = Bot::new(config.telegram.bot_token.clone());

    let mut deps = DependencyMap::default();
    deps.insert(storage);
    deps.insert(Arc::new(config));

    Dispatcher::builder(bot, schema())
        .dependencies(deps)
        .enable_ctrlc_handler()
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd);
        })
        .error_handler(Arc::new(DisplayErrorHandler))
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<Box<dyn StdError + Send + Sync + 'static>> {
    dptree::entry()
        .branch(commands::handler())
        .endpoint(common::default_handler)
}

fn read_config() -> Result<Config> {
    let raw = fs::read_to_string("config.toml")
        .map_err(|err| BotError::config(&format!("can't read config.toml: {}", err)))?;

    toml::from_str(&raw)
        .map_err(|err| BotError::config(&format!("can't parse config.toml: {}", err)))
        .map_err(Into::into)
}
