use std::env;

pub struct Config {
    pub database_url: String,
    pub session_secret: String,
    pub server_port: u16,
    pub server_host: String,
}

impl Config {
    /// Reads configuration from the environment.
    ///
    /// `DATABASE_URL` and `SESSION_SECRET` are mandatory; startup fails fast
    /// when either is missing. There is deliberately no default session
    /// secret.
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            session_secret: env::var("SESSION_SECRET").expect("SESSION_SECRET must be set"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
