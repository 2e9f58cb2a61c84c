pub mod config {
    use serde::{Deserialize, Serialize, de::DeserializeOwned};

    /// Connection settings for the managed backend.
    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    #[serde(default)]
    pub struct Server {
        pub base_url: String,
        /// The project's public key, sent with every request.
        pub api_key: String,
        /// Admin credentials; only needed for writes.
        pub email: String,
        pub password: String,
    }
    impl Default for Server {
        fn default() -> Self {
            Self {
                base_url: "http://localhost:54321".to_string(),
                api_key: "YOUR_ANON_KEY".to_string(),
                email: String::new(),
                password: String::new(),
            }
        }
    }
    impl Server {
        /// Whether admin credentials have been filled in.
        pub fn has_credentials(&self) -> bool {
            !self.email.is_empty() && !self.password.is_empty()
        }
    }

    #[derive(Debug)]
    pub enum ConfigError {
        Read {
            filename: String,
            error: std::io::Error,
        },
        Parse {
            filename: String,
            error: toml::de::Error,
        },
    }
    impl std::fmt::Display for ConfigError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                ConfigError::Read { filename, error } => {
                    write!(f, "Failed to read {filename}: {error}")
                }
                ConfigError::Parse { filename, error } => {
                    write!(f, "Failed to parse {filename}: {error}")
                }
            }
        }
    }
    impl std::error::Error for ConfigError {}

    /// Load a TOML config file, returning `T::default()` if the file doesn't exist.
    pub fn load_config<T: Default + DeserializeOwned>(filename: &str) -> Result<T, ConfigError> {
        match std::fs::read_to_string(filename) {
            Ok(contents) => toml::from_str(&contents).map_err(|error| ConfigError::Parse {
                filename: filename.to_string(),
                error,
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found at {filename}, using defaults");
                Ok(T::default())
            }
            Err(error) => Err(ConfigError::Read {
                filename: filename.to_string(),
                error,
            }),
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[derive(Debug, Default, Deserialize, PartialEq)]
        struct Config {
            #[serde(default)]
            server: Server,
        }

        #[test]
        fn missing_fields_take_defaults() {
            let config: Config = toml::from_str(
                r#"
                [server]
                base_url = "https://project.example.test"
                "#,
            )
            .unwrap();
            assert_eq!(config.server.base_url, "https://project.example.test");
            assert_eq!(config.server.api_key, Server::default().api_key);
            assert!(!config.server.has_credentials());
        }

        #[test]
        fn missing_file_yields_defaults() {
            let config: Config = load_config("does-not-exist.toml").unwrap();
            assert_eq!(config, Config::default());
        }

        #[test]
        fn parse_errors_name_the_file() {
            let path = std::env::temp_dir().join("duet-shared-bad-config.toml");
            std::fs::write(&path, "[server\n").unwrap();
            let err = load_config::<Config>(path.to_str().unwrap()).unwrap_err();
            assert!(err.to_string().starts_with("Failed to parse"));
            std::fs::remove_file(path).unwrap();
        }
    }
}
