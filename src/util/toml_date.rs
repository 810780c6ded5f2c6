use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{NaiveDate, ParseError};
use serde::Deserialize;

/// A plain `YYYY-MM-DD` date read from a TOML date literal.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct TomlDate(pub NaiveDate);

impl<'de> Deserialize<'de> for TomlDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: serde::Deserializer<'de>,
    {
        use serde::de::Error;
        let value = toml::value::Datetime::deserialize(deserializer)?;
        let date = TomlDate::from_str(&value.to_string()).map_err(Error::custom)?;
        Ok(date)
    }
}

impl FromStr for TomlDate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let naive = NaiveDate::from_str(s)?;
        Ok(Self(naive))
    }
}

impl Display for TomlDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Site {
        site_start_date: TomlDate,
    }

    #[derive(Deserialize)]
    struct Config {
        site: Site,
    }

    #[test]
    fn test_toml_date() {
        let toml_str = r##"
[site]
site_start_date = 2021-03-14
"##;
        let cfg: Config = toml::from_str::<Config>(toml_str).unwrap();
        assert_eq!(cfg.site.site_start_date, TomlDate(NaiveDate::from_ymd_opt(2021, 3, 14).unwrap()));
        assert_eq!(cfg.site.site_start_date.to_string(), "2021-03-14");
    }

    #[test]
    fn test_datetime_is_rejected() {
        let toml_str = r##"
[site]
site_start_date = 2021-03-14T10:00:00
"##;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }
}
