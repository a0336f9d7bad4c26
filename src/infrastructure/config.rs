use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    pub profile: String,
    pub store: StoreSettings,
}

/// Pricing and loyalty knobs handed to the services
#[derive(Clone, Debug, PartialEq)]
pub struct StoreSettings {
    /// Fraction of the subtotal added as tax (0.2 = 20%)
    pub tax_rate: f64,
    /// Loyalty points earned per currency unit spent
    pub points_per_currency_unit: f64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            tax_rate: 0.0,
            points_per_currency_unit: 1.0,
        }
    }
}

fn parse_non_negative(key: &str, default: f64) -> f64 {
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<f64>() {
            Ok(v) if v >= 0.0 && v.is_finite() => v,
            _ => {
                tracing::warn!("Ignoring invalid {}='{}', using {}", key, raw, default);
                default
            }
        },
        Err(_) => default,
    }
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            if profile == "default" {
                "sqlite://retail_pos.db?mode=rwc".to_string()
            } else {
                format!("sqlite://retail_pos_{}.db?mode=rwc", profile)
            }
        });

        let defaults = StoreSettings::default();

        Self {
            database_url,
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(Vec::new),
            profile,
            store: StoreSettings {
                tax_rate: parse_non_negative("TAX_RATE", defaults.tax_rate),
                points_per_currency_unit: parse_non_negative(
                    "POINTS_PER_CURRENCY_UNIT",
                    defaults.points_per_currency_unit,
                ),
            },
        }
    }
}
