use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl CorsConfig {
    /// `ALLOWED_ORIGINS` is a comma-separated list. When unset, only the
    /// frontend (`FRONTEND_URL`) is allowed.
    pub fn from_env() -> Self {
        let raw = env::var("ALLOWED_ORIGINS")
            .or_else(|_| env::var("FRONTEND_URL"))
            .unwrap_or_else(|_| "http://localhost:5173".to_string());

        Self {
            allowed_origins: parse_origins(&raw),
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        let origins = parse_origins(" http://localhost:5173/ ,https://quiz.example.com,, ");
        assert_eq!(
            origins,
            vec!["http://localhost:5173", "https://quiz.example.com"]
        );
    }
}
