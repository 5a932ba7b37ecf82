//! Plain data held by the store.

use serde::{Deserialize, Serialize};

/// Storage key of the medication list.
pub const MEDICATIONS_KEY: &str = "medications";
/// Storage key of the auth info.
pub const INFO_KEY: &str = "info";

/// One scheduled medication.
///
/// `id` is assigned by the caller before the record reaches the store and is
/// the record's only identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medication: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dosage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_id: Option<String>,
}

impl MedicationRecord {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_medication(mut self, medication: impl Into<String>) -> Self {
        self.medication = Some(medication.into());
        self
    }

    pub fn with_dosage(mut self, dosage: impl Into<String>) -> Self {
        self.dosage = Some(dosage.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_color(mut self, color_id: impl Into<String>) -> Self {
        self.color_id = Some(color_id.into());
        self
    }
}

/// Authentication state. An empty token means signed out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthInfo {
    pub access_token: String,
}

impl AuthInfo {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty()
    }
}

/// Which set of screens the shell may route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenSet {
    /// Dashboard, calculator, profile, calendar.
    App,
    /// Sign in and sign up.
    Auth,
}

impl ScreenSet {
    /// Gate on the current auth info.
    pub fn for_info(info: &AuthInfo) -> Self {
        if info.is_authenticated() {
            Self::App
        } else {
            Self::Auth
        }
    }

    /// Route paths reachable within this set.
    pub fn routes(self) -> &'static [&'static str] {
        match self {
            Self::App => &["/", "/calculator", "/profile", "/calendar"],
            Self::Auth => &["/sign_in", "/sign_up"],
        }
    }
}

/// Everything a subscriber can observe.
///
/// `list` is `None` until the first load resolves (or the first mutation
/// lands), which is how renders tell "not loaded yet" from "no
/// medications". There is no separate loading flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreState {
    pub list: Option<Vec<MedicationRecord>>,
    pub info: AuthInfo,
}

impl StoreState {
    /// The medication list, empty while unloaded.
    pub fn list(&self) -> &[MedicationRecord] {
        self.list.as_deref().unwrap_or_default()
    }

    /// Whether `list` holds real data rather than the unloaded sentinel.
    pub fn is_loaded(&self) -> bool {
        self.list.is_some()
    }

    pub fn find(&self, id: &str) -> Option<&MedicationRecord> {
        self.list().iter().find(|r| r.id == id)
    }

    /// Screens reachable with the current auth info.
    pub fn screens(&self) -> ScreenSet {
        ScreenSet::for_info(&self.info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_json_skips_absent_fields() {
        let record = MedicationRecord::new("1").with_medication("Aspirin");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"id": "1", "medication": "Aspirin"}));

        let back: MedicationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn unloaded_state_reads_as_empty() {
        let state = StoreState::default();
        assert!(!state.is_loaded());
        assert!(state.list().is_empty());

        let loaded = StoreState {
            list: Some(Vec::new()),
            ..StoreState::default()
        };
        assert!(loaded.is_loaded());
        assert_ne!(state, loaded);
    }

    #[test]
    fn screens_follow_token() {
        assert_eq!(ScreenSet::for_info(&AuthInfo::default()), ScreenSet::Auth);
        assert_eq!(ScreenSet::for_info(&AuthInfo::new("tok")), ScreenSet::App);
        assert!(ScreenSet::Auth.routes().contains(&"/sign_in"));
    }
}
