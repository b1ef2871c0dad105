use std::env;
use std::fs::File;
use std::str::FromStr;
use std::time::Duration;

use dotenv::dotenv;
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode, WriteLogger};

pub mod backend;
pub mod pubsub;
pub mod storage;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    Reqwest(#[from] reqwest::Error),
    NatsSubscribe(#[from] async_nats::SubscribeError),
    NatsPublish(#[from] async_nats::PublishError),
    ParseJson(#[from] serde_json::Error),
    ParseUrl(#[from] url::ParseError),
    ParseInt(#[from] std::num::ParseIntError),
    Var(#[from] env::VarError),
    Io(#[from] std::io::Error),

    #[error("unexpected integration error: {0}")]
    Unexpected(String),
}

#[derive(Clone)]
pub struct Config {
    pub backend: backend::Config,
    pub pubsub: Option<pubsub::Config>,
    pub storage: storage::Config,
}

impl Default for Config {
    fn default() -> Self {
        dotenv().ok();

        init_logger();

        Self {
            backend: backend::Config::env().unwrap_or_default(),
            pubsub: pubsub::Config::env(),
            storage: storage::Config::env().unwrap_or_default(),
        }
    }
}

fn init_logger() {
    let rust_log = env::var("RUST_LOG").unwrap_or("info".into());
    let level = LevelFilter::from_str(&rust_log).unwrap_or(LevelFilter::Info);
    let log_file = env::var("SERVICE_NAME")
        .map(|pkg| format!("{pkg}.log"))
        .unwrap_or("service.log".into());

    CombinedLogger::init(vec![
        TermLogger::new(
            level,
            simplelog::Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(
            level,
            simplelog::Config::default(),
            File::create(log_file).expect("Failed to create log file"),
        ),
    ])
    .expect("Failed to initialize logger");
}

pub fn init_http_client() -> reqwest::Client {
    match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(2))
        .timeout(Duration::from_secs(5))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            panic!("Failed to initialize HTTP client: {e}")
        }
    }
}
