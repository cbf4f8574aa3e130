use std::{
    env::{self, VarError},
    fs,
    io::ErrorKind,
    num::NonZeroUsize,
    ops::Deref,
    str::FromStr,
    sync::Arc,
};

use anyhow::Context;
use tracing::Level;

use crate::{
    dao::SubscriptionStore,
    error::Error,
    helpers::parse_list,
    provider::PushDelivery,
    types::{PushHeader, Urgency, DEFAULT_TTL},
};

#[derive(Debug)]
pub struct AppState<T>(Arc<T>);

impl<T> AppState<T> {
    pub fn new(state: T) -> AppState<T> {
        AppState(Arc::new(state))
    }
}

impl<T> Clone for AppState<T> {
    fn clone(&self) -> AppState<T> {
        AppState(Arc::clone(&self.0))
    }
}

impl<T> Deref for AppState<T> {
    type Target = Arc<T>;

    fn deref(&self) -> &Arc<T> {
        &self.0
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub store: Arc<dyn SubscriptionStore>,
    pub delivery: Arc<dyn PushDelivery>,
}

impl State {
    pub fn new(
        config: Config,
        store: Arc<dyn SubscriptionStore>,
        delivery: Arc<dyn PushDelivery>,
    ) -> State {
        State {
            config,
            store,
            delivery,
        }
    }

    pub fn push_header(&self) -> PushHeader {
        PushHeader {
            ttl: self.config.push_ttl,
            urgency: self.config.push_urgency,
        }
    }

    /// `None` leaves the fan-out unbounded.
    pub fn fan_out_capacity(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.config.max_tasks)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub database_url: String,
    pub max_connections: u32,
    pub timeout: u64,
    pub max_tasks: usize,
    pub push_ttl: i64,
    pub push_urgency: Urgency,
    pub status_code_to_delete: Vec<u16>,
    pub mail_to: String,
    pub vapid_private_key: Vec<u8>,
    pub vapid_public_key: String,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_host: String::from("127.0.0.1"),
            port: 3000,
            allowed_origins: vec![String::from("*")],
            database_url: String::from("db"),
            max_connections: 5,
            timeout: 30,
            max_tasks: 0,
            push_ttl: DEFAULT_TTL,
            push_urgency: Urgency::Normal,
            status_code_to_delete: vec![404, 410],
            mail_to: String::from("example@yourdomain.org"),
            vapid_private_key: vec![],
            vapid_public_key: String::new(),
            log_level: Level::INFO,
        }
    }
}

fn var(key: &str) -> Result<Option<String>, Error> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(Error::VAR(e)),
    }
}

fn parse_var<T>(key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key)? {
        Some(value) => value.trim().parse::<T>().map_err(|e| {
            Error::ConfigurationError(format!("{}: {}", key, e))
        }),
        None => Ok(default),
    }
}

fn parse_config_vapid_keys(
    private_key_file: &str,
    public_key_file: &str,
) -> Result<(Vec<u8>, String), Error> {
    let private_key = fs::read(private_key_file)
        .with_context(|| format!("VAPID private key {}", private_key_file))?;
    let public_key = fs::read_to_string(public_key_file)
        .with_context(|| format!("VAPID public key {}", public_key_file))?;

    Ok((private_key, public_key.trim().to_owned()))
}

pub fn get_configuration() -> Result<Config, Error> {
    let defaults = Config::default();

    let server_host = var("SERVER_HOST")?.unwrap_or(defaults.server_host);
    let port = parse_var("PORT", defaults.port)?;
    let allowed_origins = match var("ALLOWED_ORIGINS")? {
        Some(value) => parse_list(&value),
        None => defaults.allowed_origins,
    };
    let database_url = var("DATABASE_URL")?.unwrap_or(defaults.database_url);
    let max_connections =
        parse_var("MAX_CONNECTIONS", defaults.max_connections)?;
    let timeout = parse_var("TIMEOUT", defaults.timeout)?;
    let max_tasks = parse_var("MAX_TASKS", defaults.max_tasks)?;
    let push_ttl = parse_var("PUSH_TTL", defaults.push_ttl)?;
    let push_urgency = match var("PUSH_URGENCY")? {
        Some(value) => Urgency::from_str(value.trim())?,
        None => defaults.push_urgency,
    };

    let status_code_to_delete = match var("STATUS_CODE_TO_DELETE")? {
        Some(value) => {
            let mut codes = vec![];
            for code in parse_list(&value) {
                codes.push(code.parse::<u16>()?);
            }
            codes
        },
        None => defaults.status_code_to_delete,
    };

    let mail_to = var("MAIL_TO")?.unwrap_or(defaults.mail_to);
    let log_level = parse_var("LOG_LEVEL", defaults.log_level)?;

    let private_key_file = var("VAPID_PRIVATE_KEY_FILE")?
        .unwrap_or_else(|| String::from("cert/vapid_private.pem"));
    let public_key_file = var("VAPID_PUBLIC_KEY_FILE")?
        .unwrap_or_else(|| String::from("cert/vapid_public.b64"));
    let (vapid_private_key, vapid_public_key) =
        parse_config_vapid_keys(&private_key_file, &public_key_file)?;

    if push_ttl < 0 {
        return Err(Error::ConfigurationError(String::from(
            "PUSH_TTL must not be negative",
        )));
    }

    let config = Config {
        server_host,
        port,
        allowed_origins,
        database_url,
        max_connections,
        timeout,
        max_tasks,
        push_ttl,
        push_urgency,
        status_code_to_delete,
        mail_to,
        vapid_private_key,
        vapid_public_key,
        log_level,
    };

    Ok(config)
}

/// Loads `.env` from the working directory into the process environment,
/// without overriding variables that are already set. A missing file is
/// not an error.
pub fn set_configuration() -> Result<(), Error> {
    let config_file: &str = ".env";

    let config_string = match fs::read_to_string(config_file) {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(Error::Io(e)),
    };

    for (key, value) in parse_config_string(&config_string) {
        if env::var_os(key).is_none() {
            env::set_var(key, value);
        }
    }

    Ok(())
}

fn parse_config_string(config: &str) -> Vec<(&str, &str)> {
    config
        .lines()
        .map(|line| line.trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .collect()
}
