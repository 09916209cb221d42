use std::env;
use tracing::warn;

pub const DEFAULT_API_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub supabase_jwt_secret: String,
    pub api_port: u16,
    pub meeting_room_cache_enabled: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_anon_key: env::var("SUPABASE_ANON_PUBLIC_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_ANON_PUBLIC_KEY not set, using empty value");
                    String::new()
                }),
            supabase_jwt_secret: env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            api_port: parse_port(env::var("API_PORT").ok()),
            meeting_room_cache_enabled: parse_flag(
                env::var("MEETING_ROOM_CACHE_ENABLED").ok(),
                true,
            ),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_anon_key.is_empty()
            && !self.supabase_jwt_secret.is_empty()
    }
}

fn parse_port(raw: Option<String>) -> u16 {
    match raw {
        None => DEFAULT_API_PORT,
        Some(value) => value.trim().parse().unwrap_or_else(|_| {
            warn!("API_PORT '{}' is not a valid port, using {}", value, DEFAULT_API_PORT);
            DEFAULT_API_PORT
        }),
    }
}

fn parse_flag(raw: Option<String>, default: bool) -> bool {
    match raw.as_deref().map(str::trim) {
        None | Some("") => default,
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" || v.eq_ignore_ascii_case("yes") => true,
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" || v.eq_ignore_ascii_case("no") => false,
        Some(v) => {
            warn!("Unrecognised boolean value '{}', using {}", v, default);
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_defaults_when_missing_or_invalid() {
        assert_eq!(parse_port(None), DEFAULT_API_PORT);
        assert_eq!(parse_port(Some("not-a-port".to_string())), DEFAULT_API_PORT);
        assert_eq!(parse_port(Some(" 8080 ".to_string())), 8080);
    }

    #[test]
    fn test_flag_parsing() {
        assert!(parse_flag(None, true));
        assert!(!parse_flag(Some("false".to_string()), true));
        assert!(!parse_flag(Some("0".to_string()), true));
        assert!(parse_flag(Some("YES".to_string()), false));
        assert!(parse_flag(Some("maybe".to_string()), true));
    }

    #[test]
    fn test_is_configured_requires_supabase_settings() {
        let config = AppConfig {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: String::new(),
            supabase_jwt_secret: "secret".to_string(),
            api_port: DEFAULT_API_PORT,
            meeting_room_cache_enabled: true,
        };
        assert!(!config.is_configured());
    }
}
