//! Monitor and server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::Coordinate;

/// Kilometres per statute mile.
pub const KM_PER_MILE: f64 = 1.609344;

/// Radius choices offered to the user, in miles.
pub const RADIUS_OPTIONS_MILES: [u32; 5] = [4, 6, 8, 10, 12];

/// Radius used when the user does not pick one.
pub const DEFAULT_RADIUS_MILES: u32 = 4;

/// Convert an offered radius to kilometres. Other values are rejected.
pub fn radius_km(miles: u32) -> Option<f64> {
    RADIUS_OPTIONS_MILES
        .contains(&miles)
        .then(|| f64::from(miles) * KM_PER_MILE)
}

/// Configuration parameters for a monitoring session.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    /// Location used when neither search text nor device position resolve.
    pub default_location: Option<Coordinate>,

    /// Delay between the end of one poll cycle and the start of the next.
    pub poll_interval: Duration,

    /// Upper bound on a single station fetch. A fetch that takes longer is
    /// treated as unavailable for that cycle.
    pub fetch_timeout: Duration,

    /// Upper bound on delivering a single notification. A delivery that takes
    /// longer is abandoned and logged.
    pub notify_timeout: Duration,

    /// Radius used when a session does not specify one.
    pub radius_miles: u32,

    /// Whether notifications are delivered when a session starts.
    pub notifications_enabled: bool,
}

impl MonitorConfig {
    /// Set the fallback location.
    pub fn with_default_location(mut self, location: Option<Coordinate>) -> Self {
        self.default_location = location;
        self
    }

    /// Set the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the per-station fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the per-notification delivery timeout.
    pub fn with_notify_timeout(mut self, timeout: Duration) -> Self {
        self.notify_timeout = timeout;
        self
    }

    /// Set whether notifications start enabled.
    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.notifications_enabled = enabled;
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            default_location: Some(Coordinate::new(37.3527, -122.0513)),
            poll_interval: Duration::from_secs(2),
            fetch_timeout: Duration::from_secs(5),
            notify_timeout: Duration::from_secs(10),
            radius_miles: DEFAULT_RADIUS_MILES,
            notifications_enabled: true,
        }
    }
}

/// Errors from reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Process-level configuration, read from `CHARGER_WATCH_*` variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP API listens on
    pub bind: SocketAddr,
    /// Station catalog JSON file
    pub catalog_path: PathBuf,
    /// Live provider base URL; the built-in default is used when unset
    pub provider_url: Option<String>,
    /// Directory of canned `{station_id}.json` responses; overrides the live provider
    pub mock_dir: Option<PathBuf>,
    /// Webhook receiving notifications; notifications are only logged when unset
    pub webhook_url: Option<String>,
    /// Geocoder base URL
    pub geocoder_url: Option<String>,
    pub monitor: MonitorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            catalog_path: PathBuf::from("stations.json"),
            provider_url: None,
            mock_dir: None,
            webhook_url: None,
            geocoder_url: None,
            monitor: MonitorConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Unset or blank variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = ServerConfig::default();

        if let Some(bind) = parse_var(&get, "CHARGER_WATCH_BIND")? {
            config.bind = bind;
        }
        if let Some(path) = get("CHARGER_WATCH_CATALOG") {
            config.catalog_path = PathBuf::from(path);
        }
        config.provider_url = get("CHARGER_WATCH_PROVIDER_URL");
        config.mock_dir = get("CHARGER_WATCH_MOCK_DIR").map(PathBuf::from);
        config.webhook_url = get("CHARGER_WATCH_WEBHOOK_URL");
        config.geocoder_url = get("CHARGER_WATCH_GEOCODER_URL");

        let lat: Option<f64> = parse_var(&get, "CHARGER_WATCH_DEFAULT_LAT")?;
        let lon: Option<f64> = parse_var(&get, "CHARGER_WATCH_DEFAULT_LON")?;
        match (lat, lon) {
            (Some(lat), Some(lon)) => {
                let location = Coordinate::new(lat, lon);
                if !location.is_finite() {
                    return Err(ConfigError::Invalid {
                        var: "CHARGER_WATCH_DEFAULT_LAT",
                        value: format!("{lat},{lon}"),
                        reason: "coordinates must be finite".to_string(),
                    });
                }
                config.monitor.default_location = Some(location);
            }
            (None, None) => {}
            (lat, _) => {
                let var = if lat.is_some() {
                    "CHARGER_WATCH_DEFAULT_LON"
                } else {
                    "CHARGER_WATCH_DEFAULT_LAT"
                };
                return Err(ConfigError::Invalid {
                    var,
                    value: String::new(),
                    reason: "latitude and longitude must be set together".to_string(),
                });
            }
        }

        if let Some(secs) = parse_secs(&get, "CHARGER_WATCH_POLL_SECS")? {
            config.monitor.poll_interval = secs;
        }
        if let Some(secs) = parse_secs(&get, "CHARGER_WATCH_FETCH_TIMEOUT_SECS")? {
            config.monitor.fetch_timeout = secs;
        }
        if let Some(secs) = parse_secs(&get, "CHARGER_WATCH_NOTIFY_TIMEOUT_SECS")? {
            config.monitor.notify_timeout = secs;
        }

        Ok(config)
    }
}

fn parse_var<T, F>(get: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|value| {
            value.parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_secs<F>(get: &F, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var::<u64, F>(get, var)? {
        Some(0) => Err(ConfigError::Invalid {
            var,
            value: "0".to_string(),
            reason: "must be at least 1 second".to_string(),
        }),
        other => Ok(other.map(Duration::from_secs)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn radius_conversion() {
        assert!((radius_km(4).unwrap() - 6.437376).abs() < 1e-9);
        assert!((radius_km(12).unwrap() - 19.312128).abs() < 1e-9);
        assert_eq!(radius_km(5), None);
        assert_eq!(radius_km(0), None);
    }

    #[test]
    fn monitor_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.fetch_timeout, Duration::from_secs(5));
        assert_eq!(config.radius_miles, 4);
        assert!(config.notifications_enabled);
        assert_eq!(config.notify_timeout, Duration::from_secs(10));
    }

    #[test]
    fn builders() {
        let config = MonitorConfig::default()
            .with_default_location(None)
            .with_poll_interval(Duration::from_secs(30))
            .with_fetch_timeout(Duration::from_secs(1))
            .with_notify_timeout(Duration::from_secs(3))
            .with_notifications(false);
        assert_eq!(config.default_location, None);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.fetch_timeout, Duration::from_secs(1));
        assert_eq!(config.notify_timeout, Duration::from_secs(3));
        assert!(!config.notifications_enabled);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind, SocketAddr::from(([127, 0, 0, 1], 3000)));
        assert_eq!(config.catalog_path, PathBuf::from("stations.json"));
        assert!(config.provider_url.is_none());
        assert!(config.mock_dir.is_none());
        assert_eq!(config.monitor, MonitorConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("CHARGER_WATCH_BIND", "0.0.0.0:8080"),
            ("CHARGER_WATCH_CATALOG", "/data/stations.json"),
            ("CHARGER_WATCH_PROVIDER_URL", "http://provider/api"),
            ("CHARGER_WATCH_MOCK_DIR", "/data/mock"),
            ("CHARGER_WATCH_WEBHOOK_URL", "http://hooks/notify"),
            ("CHARGER_WATCH_GEOCODER_URL", "http://geo"),
            ("CHARGER_WATCH_DEFAULT_LAT", "51.5"),
            ("CHARGER_WATCH_DEFAULT_LON", "-0.12"),
            ("CHARGER_WATCH_POLL_SECS", "10"),
            ("CHARGER_WATCH_FETCH_TIMEOUT_SECS", "3"),
            ("CHARGER_WATCH_NOTIFY_TIMEOUT_SECS", "7"),
        ]))
        .unwrap();

        assert_eq!(config.bind, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.catalog_path, PathBuf::from("/data/stations.json"));
        assert_eq!(config.provider_url.as_deref(), Some("http://provider/api"));
        assert_eq!(config.mock_dir, Some(PathBuf::from("/data/mock")));
        assert_eq!(config.webhook_url.as_deref(), Some("http://hooks/notify"));
        assert_eq!(config.geocoder_url.as_deref(), Some("http://geo"));
        assert_eq!(config.monitor.default_location, Some(Coordinate::new(51.5, -0.12)));
        assert_eq!(config.monitor.poll_interval, Duration::from_secs(10));
        assert_eq!(config.monitor.fetch_timeout, Duration::from_secs(3));
        assert_eq!(config.monitor.notify_timeout, Duration::from_secs(7));
    }

    #[test]
    fn blank_values_are_unset() {
        let config = ServerConfig::from_lookup(lookup(&[("CHARGER_WATCH_WEBHOOK_URL", "  ")])).unwrap();
        assert!(config.webhook_url.is_none());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("CHARGER_WATCH_BIND", "nope")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "CHARGER_WATCH_BIND", .. }));

        let err = ServerConfig::from_lookup(lookup(&[("CHARGER_WATCH_POLL_SECS", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "CHARGER_WATCH_POLL_SECS", .. }));

        let err = ServerConfig::from_lookup(lookup(&[("CHARGER_WATCH_DEFAULT_LAT", "51.5")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "CHARGER_WATCH_DEFAULT_LON", .. }));
    }
}
