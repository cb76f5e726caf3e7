//! Anti-abuse policy.
//!
//! Pure decision functions over counts the storage layer supplies. Both
//! thresholds are optional: an absent limit disables that guard entirely,
//! it is not a zero threshold. Administrators are exempt from every guard.

/// Thresholds loaded from configuration.
#[derive(Debug, Clone)]
pub struct GuardPolicy {
    /// Max submissions per trailing 24 hours; `None` disables the check.
    pub daily_limit: Option<u32>,
    /// Rejections within the window that trigger auto-blacklisting;
    /// `None` disables the rule.
    pub reject_threshold: Option<u32>,
    /// Trailing window for counting rejections, in days.
    pub reject_window_days: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateVerdict {
    Allowed,
    Limited { limit: u32 },
}

impl GuardPolicy {
    /// Decide whether a new intake may start given how many records the
    /// submitter created in the trailing window.
    pub fn rate_verdict(&self, is_admin: bool, recent_count: i64) -> RateVerdict {
        if is_admin {
            return RateVerdict::Allowed;
        }
        match self.daily_limit {
            Some(limit) if recent_count >= i64::from(limit) => RateVerdict::Limited { limit },
            _ => RateVerdict::Allowed,
        }
    }

    /// Decide whether a submitter crossed the rejection threshold.
    ///
    /// Returns the blacklist reason to record, or `None` when the rule is
    /// off, the submitter is exempt or already listed, or the count is
    /// under the threshold. Because listing is checked first, the rule
    /// fires at most once per submitter.
    pub fn auto_blacklist_reason(
        &self,
        is_admin: bool,
        rejection_count: i64,
        already_blacklisted: bool,
    ) -> Option<String> {
        if is_admin || already_blacklisted {
            return None;
        }
        let threshold = self.reject_threshold?;
        if rejection_count >= i64::from(threshold) {
            Some(format!(
                "{rejection_count} imtina / {} gün",
                self.reject_window_days
            ))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> GuardPolicy {
        GuardPolicy {
            daily_limit: Some(3),
            reject_threshold: Some(5),
            reject_window_days: 30,
        }
    }

    #[test]
    fn rate_limit_blocks_at_threshold() {
        let p = policy();
        assert_eq!(p.rate_verdict(false, 2), RateVerdict::Allowed);
        assert_eq!(p.rate_verdict(false, 3), RateVerdict::Limited { limit: 3 });
        assert_eq!(p.rate_verdict(false, 7), RateVerdict::Limited { limit: 3 });
    }

    #[test]
    fn admins_bypass_rate_limit() {
        assert_eq!(policy().rate_verdict(true, 100), RateVerdict::Allowed);
    }

    #[test]
    fn unset_limit_disables_rate_guard() {
        let p = GuardPolicy {
            daily_limit: None,
            ..policy()
        };
        assert_eq!(p.rate_verdict(false, 1000), RateVerdict::Allowed);
    }

    #[test]
    fn auto_blacklist_fires_at_threshold_with_reason() {
        let p = policy();
        assert_eq!(p.auto_blacklist_reason(false, 4, false), None);
        assert_eq!(
            p.auto_blacklist_reason(false, 5, false).as_deref(),
            Some("5 imtina / 30 gün")
        );
    }

    #[test]
    fn auto_blacklist_fires_only_once() {
        // Already-listed submitters never trigger a second insert.
        assert_eq!(policy().auto_blacklist_reason(false, 9, true), None);
    }

    #[test]
    fn auto_blacklist_skips_admins_and_disabled_rule() {
        assert_eq!(policy().auto_blacklist_reason(true, 9, false), None);
        let off = GuardPolicy {
            reject_threshold: None,
            ..policy()
        };
        assert_eq!(off.auto_blacklist_reason(false, 9, false), None);
    }
}
