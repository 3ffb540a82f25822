#[derive(serde::Deserialize, Debug, Clone)]
pub struct ServerConfig {
    pub host: Box<str>,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
