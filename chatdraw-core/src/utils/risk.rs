//! Heuristic scoring of how likely a chat account is an alt or a bot.

use std::fmt;

/// Accounts younger than this many days are considered new.
pub const NEW_ACCOUNT_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskReason {
    NewAccount,
    NoChatMessages,
    LowActivity,
}

impl fmt::Display for RiskReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskReason::NewAccount => write!(f, "new account"),
            RiskReason::NoChatMessages => write!(f, "no chat messages"),
            RiskReason::LowActivity => write!(f, "very low activity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    HighRisk,
    Suspicious,
    LooksGenuine,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::HighRisk => write!(f, "❌ high risk of alt/bot"),
            Verdict::Suspicious => write!(f, "⚠️ suspicious account"),
            Verdict::LooksGenuine => write!(f, "✅ looks like a real viewer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskReport {
    /// 0..=100.
    pub score: u8,
    pub reasons: Vec<RiskReason>,
    pub verdict: Verdict,
}

/// Score an account from its age and the chat messages seen from it.
pub fn assess(account_age_days: i64, total_messages: u64) -> RiskReport {
    let mut score = 0u8;
    let mut reasons = Vec::new();

    if account_age_days < NEW_ACCOUNT_DAYS {
        score += 40;
        reasons.push(RiskReason::NewAccount);
    }

    match total_messages {
        0 => {
            score += 40;
            reasons.push(RiskReason::NoChatMessages);
        }
        1..=2 => {
            score += 20;
            reasons.push(RiskReason::LowActivity);
        }
        _ => {}
    }

    let verdict = match score {
        s if s >= 70 => Verdict::HighRisk,
        s if s >= 40 => Verdict::Suspicious,
        _ => Verdict::LooksGenuine,
    };

    RiskReport {
        score,
        reasons,
        verdict,
    }
}

/// One-line chat summary of a check.
pub fn format_report(login: &str, account_age_days: i64, total_messages: u64, report: &RiskReport) -> String {
    format!(
        "🔎 {login} | age: {account_age_days}d | messages: {total_messages} | risk: {}% → {}",
        report.score, report.verdict
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_silent_account_is_high_risk() {
        let report = assess(2, 0);
        assert_eq!(report.score, 80);
        assert_eq!(
            report.reasons,
            vec![RiskReason::NewAccount, RiskReason::NoChatMessages]
        );
        assert_eq!(report.verdict, Verdict::HighRisk);
    }

    #[test]
    fn test_old_silent_account_is_suspicious() {
        let report = assess(400, 0);
        assert_eq!(report.score, 40);
        assert_eq!(report.verdict, Verdict::Suspicious);
    }

    #[test]
    fn test_new_low_activity_account() {
        let report = assess(0, 2);
        assert_eq!(report.score, 60);
        assert_eq!(report.verdict, Verdict::Suspicious);
    }

    #[test]
    fn test_established_active_account_is_genuine() {
        let report = assess(NEW_ACCOUNT_DAYS, 3);
        assert_eq!(report.score, 0);
        assert!(report.reasons.is_empty());
        assert_eq!(report.verdict, Verdict::LooksGenuine);

        let report = assess(30, 1);
        assert_eq!(report.score, 20);
        assert_eq!(report.verdict, Verdict::LooksGenuine);
    }

    #[test]
    fn test_format_report() {
        let report = assess(400, 0);
        assert_eq!(
            format_report("bob", 400, 0, &report),
            "🔎 bob | age: 400d | messages: 0 | risk: 40% → ⚠️ suspicious account"
        );
    }
}
