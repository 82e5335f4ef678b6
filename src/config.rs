//! Ambient configuration: a hand-rolled toml-merge rather than pulling in a
//! dedicated config crate.

use std::{env, fs::File, io::{self, Read}};

#[derive(Clone, Debug)]
pub struct MailboxConfig {
    pub capacity: usize,
    pub push_retry_attempts: u32,
    pub push_retry_backoff_micros: u64,
}

impl Default for MailboxConfig {
    fn default() -> Self {
        MailboxConfig {
            capacity: 4096,
            push_retry_attempts: 8,
            push_retry_backoff_micros: 50,
        }
    }
}

impl MailboxConfig {
    fn merge(&mut self, v: &toml::Value) -> Option<()> {
        let v = v.as_table()?;
        if let Some(c) = v.get("capacity").and_then(|x| x.as_integer()) {
            self.capacity = c as usize;
        }
        if let Some(a) = v.get("push_retry_attempts").and_then(|x| x.as_integer()) {
            self.push_retry_attempts = a as u32;
        }
        if let Some(b) = v.get("push_retry_backoff_micros").and_then(|x| x.as_integer()) {
            self.push_retry_backoff_micros = b as u64;
        }
        None
    }
}

#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    pub pool_size: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        DispatcherConfig { pool_size: num_cpus::get() * 2 }
    }
}

impl DispatcherConfig {
    fn merge(&mut self, v: &toml::Value) -> Option<()> {
        let v = v.as_table()?;
        if let Some(n) = v.get("pool_size").and_then(|x| x.as_integer()) {
            self.pool_size = n as usize;
        }
        None
    }
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: slog::Level,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig { level: slog::Level::Info }
    }
}

impl LogConfig {
    fn merge(&mut self, v: &toml::Value) -> Option<()> {
        let v = v.as_table()?;
        let level = v.get("level")?.as_str()?;
        if let Ok(l) = level.parse() {
            self.level = l;
        }
        None
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub mailbox: MailboxConfig,
    pub dispatcher: DispatcherConfig,
    pub log: LogConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mailbox: MailboxConfig::default(),
            dispatcher: DispatcherConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    // Option<()> lets us use `?` to bail out of parsing a partial/malformed
    // table without treating it as fatal.
    fn merge(&mut self, v: &toml::Value) -> Option<()> {
        let v = v.as_table()?;
        if let Some(m) = v.get("mailbox") {
            self.mailbox.merge(m);
        }
        if let Some(d) = v.get("dispatcher") {
            self.dispatcher.merge(d);
        }
        if let Some(l) = v.get("log") {
            self.log.merge(l);
        }
        None
    }
}

/// Loads `Config`, amending the defaults with a toml file named by the
/// `DIALOGUE_CONF` environment variable (`config/dialogue.toml` by default).
/// Absence of the file is not an error; a malformed file is logged and
/// ignored rather than treated as fatal.
pub fn load_config() -> Config {
    let mut cfg = Config::default();

    let path = env::var("DIALOGUE_CONF").unwrap_or_else(|_| "config/dialogue.toml".into());
    let amendment = File::open(path)
        .and_then(|mut f| {
            let mut s = String::new();
            f.read_to_string(&mut s)?;
            Ok(s)
        })
        .and_then(|s| toml::from_str::<toml::Value>(&s).map_err(|e| io::Error::new(io::ErrorKind::Other, e)));

    if let Ok(amendment) = amendment {
        cfg.merge(&amendment);
    }

    cfg
}
