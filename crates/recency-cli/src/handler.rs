//! Command handler for the shell

use recency::LruCache;
use tracing::debug;

use crate::command::Command;
use crate::reply::Reply;

pub struct CommandHandler {
    cache: LruCache<String, String>,
}

impl CommandHandler {
    pub fn new(cache: LruCache<String, String>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &LruCache<String, String> {
        &self.cache
    }

    pub fn handle(&mut self, cmd: Command) -> Reply {
        match cmd {
            Command::Ping(None) => Reply::Status("PONG".to_string()),
            Command::Ping(Some(msg)) => Reply::Bulk(Some(msg)),
            Command::Get(key) => self.handle_get(&key),
            Command::Peek(key) => Reply::Bulk(self.cache.peek(key.as_str()).cloned()),
            Command::Set(key, value) => self.handle_set(key, value),
            Command::Del(keys) => self.handle_del(&keys),
            Command::Exists(keys) => self.handle_exists(&keys),
            Command::Keys => self.handle_keys(),
            Command::Len => Reply::Integer(self.cache.len() as i64),
            Command::Capacity => Reply::Integer(self.cache.capacity() as i64),
            Command::Clear => {
                self.cache.clear();
                Reply::ok()
            }
            Command::Quit => Reply::Status("BYE".to_string()),
        }
    }

    fn handle_get(&mut self, key: &str) -> Reply {
        match self.cache.get(key) {
            Ok(value) => Reply::Bulk(Some(value.clone())),
            Err(_) => Reply::Bulk(None),
        }
    }

    fn handle_set(&mut self, key: String, value: String) -> Reply {
        if !self.cache.contains(key.as_str()) && self.cache.len() == self.cache.capacity() {
            if let Some((victim, _)) = self.cache.peek_lru() {
                debug!(victim = %victim, incoming = %key, "Evicting least recently used key");
            }
        }

        self.cache.set(key, value);
        Reply::ok()
    }

    fn handle_del(&mut self, keys: &[String]) -> Reply {
        let deleted = keys
            .iter()
            .filter(|key| self.cache.delete(key.as_str()).is_ok())
            .count();

        Reply::Integer(deleted as i64)
    }

    fn handle_exists(&self, keys: &[String]) -> Reply {
        let count = keys
            .iter()
            .filter(|key| self.cache.contains(key.as_str()))
            .count();

        Reply::Integer(count as i64)
    }

    fn handle_keys(&self) -> Reply {
        Reply::Array(
            self.cache
                .keys()
                .map(|key| Reply::Bulk(Some(key.clone())))
                .collect(),
        )
    }
}
