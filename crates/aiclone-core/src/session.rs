use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Starting balance for a newly created account.
/// Matches the server-side default for the `credits` column.
pub const DEFAULT_CREDITS: u64 = 100;

/// Subscription tier. Closed set; serialized in lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub enum Plan {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Free, Plan::Pro, Plan::Enterprise];

    /// Get the display name for this plan.
    pub fn label(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Pro => "Pro",
            Plan::Enterprise => "Enterprise",
        }
    }

    /// Lowercase wire name, as stored on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }

    /// Get the next plan (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Plan::Free => Plan::Pro,
            Plan::Pro => Plan::Enterprise,
            Plan::Enterprise => Plan::Free,
        }
    }

    /// Get the previous plan (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Plan::Free => Plan::Enterprise,
            Plan::Pro => Plan::Free,
            Plan::Enterprise => Plan::Pro,
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown plan: {0}")]
pub struct UnknownPlan(pub String);

impl FromStr for Plan {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            "enterprise" => Ok(Plan::Enterprise),
            _ => Err(UnknownPlan(s.to_string())),
        }
    }
}

/// The currently authenticated user on this client.
///
/// `credits` is unsigned, so a negative balance cannot be represented; a
/// persisted record carrying one fails to deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Session {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub plan: Plan,
    pub credits: u64,
}

impl Session {
    /// Create a session for a fresh account on the given plan.
    pub fn new(id: impl Into<String>, email: impl Into<String>, plan: Plan) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            name: None,
            plan,
            credits: DEFAULT_CREDITS,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_credits(mut self, credits: u64) -> Self {
        self.credits = credits;
        self
    }

    /// Name to greet the user with, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_from_str() {
        assert_eq!("free".parse::<Plan>(), Ok(Plan::Free));
        assert_eq!("PRO".parse::<Plan>(), Ok(Plan::Pro));
        assert_eq!(" Enterprise ".parse::<Plan>(), Ok(Plan::Enterprise));
        assert!("gold".parse::<Plan>().is_err());
    }

    #[test]
    fn test_plan_cycle() {
        assert_eq!(Plan::Free.next(), Plan::Pro);
        assert_eq!(Plan::Enterprise.next(), Plan::Free); // Wraps around
        assert_eq!(Plan::Free.prev(), Plan::Enterprise);
        for plan in Plan::ALL {
            assert_eq!(plan.next().prev(), plan);
        }
    }

    #[test]
    fn test_plan_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Plan::Enterprise).unwrap(), "\"enterprise\"");
        let plan: Plan = serde_json::from_str("\"pro\"").unwrap();
        assert_eq!(plan, Plan::Pro);
    }

    #[test]
    fn test_session_new_defaults() {
        let session = Session::new("u1", "a@b.com", Plan::default());
        assert_eq!(session.plan, Plan::Free);
        assert_eq!(session.credits, DEFAULT_CREDITS);
        assert_eq!(session.name, None);
    }

    #[test]
    fn test_display_name_falls_back_to_email() {
        let session = Session::new("u1", "a@b.com", Plan::Free);
        assert_eq!(session.display_name(), "a@b.com");
        assert_eq!(session.clone().with_name("Ann").display_name(), "Ann");
        assert_eq!(session.with_name("  ").display_name(), "a@b.com");
    }

    #[test]
    fn test_negative_credits_rejected_on_deserialize() {
        let json = r#"{"id":"u1","email":"a@b.com","plan":"free","credits":-5}"#;
        assert!(serde_json::from_str::<Session>(json).is_err());
    }
}
