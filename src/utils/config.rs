use std::env;

/// Which storage backend the comment service talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Mongo,
    Memory,
}

impl StoreKind {
    fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => StoreKind::Memory,
            "mongo" | "mongodb" => StoreKind::Mongo,
            other => {
                log::warn!("COMMENT_STORE {:?} is not recognised, falling back to mongo", other);
                StoreKind::Mongo
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub database_name: String,
    pub comment_collection: String,
    pub store: StoreKind,
    pub sensitive_words_path: String,
    pub jwt_secret: String,
}

impl AppConfig {
    /// Read settings from the process environment (after `.env` is loaded)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = get("PORT", "8000").parse().unwrap_or_else(|_| {
            log::warn!("PORT is not a valid port number, falling back to 8000");
            8000
        });

        AppConfig {
            host: get("HOST", "localhost"),
            port,
            mongodb_uri: get("MONGODB_URI", "mongodb://localhost:27017"),
            database_name: get("DATABASE_NAME", "rust_blogdb"),
            comment_collection: get("COMMENT_COLLECTION", "commentCollection"),
            store: StoreKind::parse(&get("COMMENT_STORE", "mongo")),
            sensitive_words_path: get("SENSITIVE_WORDS_PATH", "resources/sensitive_words.txt"),
            jwt_secret: get("JWT_SECRET", "secret"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(|_| None);
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 8000);
        assert_eq!(config.database_name, "rust_blogdb");
        assert_eq!(config.comment_collection, "commentCollection");
        assert_eq!(config.store, StoreKind::Mongo);
    }

    #[test]
    fn overrides_are_read() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("PORT", "9090"),
            ("COMMENT_STORE", "Memory"),
            ("JWT_SECRET", "s3"),
        ]);
        let config = AppConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()));
        assert_eq!(config.port, 9090);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.jwt_secret, "s3");
    }

    #[test]
    fn unknown_store_falls_back_to_mongo() {
        assert_eq!(StoreKind::parse("MongoDB"), StoreKind::Mongo);
        assert_eq!(StoreKind::parse(" mem "), StoreKind::Memory);
        assert_eq!(StoreKind::parse("memroy"), StoreKind::Mongo);
    }

    #[test]
    fn bad_port_falls_back() {
        let config = AppConfig::from_lookup(|k| (k == "PORT").then(|| "nope".to_string()));
        assert_eq!(config.port, 8000);
    }
}
