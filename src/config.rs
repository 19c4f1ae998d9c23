use std::env;
use std::path::PathBuf;

/// Sales tax applied to the pre-discount subtotal.
pub const DEFAULT_TAX_RATE: f64 = 0.08;

/// What to do with an add/update that asks for more than a line's stock limit.
///
/// The source behavior is to clamp silently; `Reject` leaves the line untouched
/// and reports the refusal instead. Neither is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QuantityPolicy {
    #[default]
    Clamp,
    Reject,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Directory backing the per-session key-value store.
    pub data_dir: PathBuf,
    /// Base URL of the REST backend. Absent means the local mock backend.
    pub api_base_url: Option<String>,
    pub tax_rate: f64,
    pub quantity_policy: QuantityPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = env::var("PICKLE_DATA_DIR")
            .unwrap_or_else(|_| ".pickle-data".to_string())
            .into();
        let api_base_url = env::var("PICKLE_API_URL").ok().filter(|url| !url.is_empty());
        let tax_rate = env::var("PICKLE_TAX_RATE")
            .ok()
            .and_then(|raw| raw.parse::<f64>().ok())
            .unwrap_or(DEFAULT_TAX_RATE);
        let quantity_policy = match env::var("PICKLE_QUANTITY_POLICY").ok().as_deref() {
            Some("reject") => QuantityPolicy::Reject,
            _ => QuantityPolicy::Clamp,
        };
        Ok(Self {
            data_dir,
            api_base_url,
            tax_rate,
            quantity_policy,
        })
    }
}
