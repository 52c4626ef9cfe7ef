use serde::Deserialize;

/// Top-level configuration settings for the server.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

/// Defines the host and port the server will bind to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

/// Per-session limits and the writer's idle wait.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionSettings {
    pub max_sessions: usize,
    /// How long a session writer sleeps after finding its queue empty.
    pub poll_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Missing values are filled from `Settings::default()`.
#[derive(Debug, Default, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub session: Option<PartialSessionSettings>,
    pub logging: Option<PartialLoggingSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialSessionSettings {
    pub max_sessions: Option<usize>,
    pub poll_interval_ms: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLoggingSettings {
    pub level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            session: SessionSettings {
                max_sessions: 1000,
                poll_interval_ms: 10,
            },
            logging: LoggingSettings {
                level: "info".to_string(),
            },
        }
    }
}

impl PartialSettings {
    /// Overlays whatever was provided onto `base`.
    pub fn merge_into(self, base: Settings) -> Settings {
        let server = self.server;
        let session = self.session;
        let logging = self.logging;

        Settings {
            server: ServerSettings {
                host: server
                    .as_ref()
                    .and_then(|s| s.host.clone())
                    .unwrap_or(base.server.host),
                port: server
                    .as_ref()
                    .and_then(|s| s.port)
                    .unwrap_or(base.server.port),
            },
            session: SessionSettings {
                max_sessions: session
                    .as_ref()
                    .and_then(|s| s.max_sessions)
                    .unwrap_or(base.session.max_sessions),
                poll_interval_ms: session
                    .as_ref()
                    .and_then(|s| s.poll_interval_ms)
                    .unwrap_or(base.session.poll_interval_ms),
            },
            logging: LoggingSettings {
                level: logging
                    .and_then(|l| l.level)
                    .unwrap_or(base.logging.level),
            },
        }
    }
}
