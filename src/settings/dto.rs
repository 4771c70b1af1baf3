use serde::{Deserialize, Serialize};

use crate::settings::repo::{NewSetting, SettingChanges};

/// Supported UI languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }
}

/// Clock display format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[serde(rename = "12h")]
    H12,
    #[serde(rename = "24h")]
    H24,
}

impl TimeFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            TimeFormat::H12 => "12h",
            TimeFormat::H24 => "24h",
        }
    }
}

/// Create body; omitted fields fall back to the service defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSettingRequest {
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub time_format: Option<TimeFormat>,
    #[serde(default)]
    pub dark_mode: Option<bool>,
}

impl CreateSettingRequest {
    pub fn into_new_setting(self) -> NewSetting {
        let defaults = NewSetting::default();
        NewSetting {
            language: self
                .language
                .map_or(defaults.language, |l| l.as_str().to_string()),
            timezone: self.timezone.unwrap_or(defaults.timezone),
            location: self.location.or(defaults.location),
            time_format: self
                .time_format
                .map_or(defaults.time_format, |f| f.as_str().to_string()),
            dark_mode: self.dark_mode.unwrap_or(defaults.dark_mode),
        }
    }
}

/// Update body; omitted fields keep their stored values.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingRequest {
    #[serde(default)]
    pub language: Option<Language>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub time_format: Option<TimeFormat>,
    #[serde(default)]
    pub dark_mode: Option<bool>,
}

impl UpdateSettingRequest {
    pub fn into_changes(self) -> SettingChanges {
        SettingChanges {
            language: self.language.map(|l| l.as_str().to_string()),
            timezone: self.timezone,
            location: self.location,
            time_format: self.time_format.map(|f| f.as_str().to_string()),
            dark_mode: self.dark_mode,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_uses_lowercase_codes() {
        assert_eq!(serde_json::to_value(Language::Es).unwrap(), "es");
        assert_eq!(
            serde_json::from_value::<Language>("en".into()).unwrap(),
            Language::En
        );
        assert!(serde_json::from_value::<Language>("fr".into()).is_err());
    }

    #[test]
    fn time_format_uses_hour_codes() {
        assert_eq!(serde_json::to_value(TimeFormat::H24).unwrap(), "24h");
        assert_eq!(
            serde_json::from_value::<TimeFormat>("12h".into()).unwrap(),
            TimeFormat::H12
        );
        assert!(serde_json::from_value::<TimeFormat>("48h".into()).is_err());
    }

    #[test]
    fn empty_create_body_yields_the_defaults() {
        let setting = CreateSettingRequest::default().into_new_setting();
        assert_eq!(setting.language, "es");
        assert_eq!(setting.timezone, "America/Argentina/Buenos_Aires");
        assert_eq!(setting.time_format, "24h");
        assert!(!setting.dark_mode);
    }

    #[test]
    fn create_body_overrides_only_what_it_names() {
        let request = CreateSettingRequest {
            language: Some(Language::En),
            dark_mode: Some(true),
            ..Default::default()
        };
        let setting = request.into_new_setting();
        assert_eq!(setting.language, "en");
        assert!(setting.dark_mode);
        assert_eq!(setting.timezone, "America/Argentina/Buenos_Aires");
    }

    #[test]
    fn update_body_maps_to_sparse_changes() {
        let request = UpdateSettingRequest {
            time_format: Some(TimeFormat::H12),
            ..Default::default()
        };
        let changes = request.into_changes();
        assert_eq!(changes.time_format.as_deref(), Some("12h"));
        assert!(changes.language.is_none());
        assert!(changes.dark_mode.is_none());
    }
}
