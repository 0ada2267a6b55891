use crate::format::{format_magnitude, format_ratio};
use crate::models::{Grade, Record, ResultRecord, SkillLevel, TxKind, UserProfileData};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Default number of skills shown on the dashboard.
pub const DEFAULT_SKILL_LIMIT: usize = 8;

/// Group `items` by `key_fn` and add up `value_fn`, keeping keys in the order
/// they were first seen. Items whose key is `None` are skipped.
pub fn group_totals<T, K>(
    items: impl IntoIterator<Item = T>,
    key_fn: impl Fn(&T) -> Option<K>,
    value_fn: impl Fn(&T) -> i64,
) -> Vec<(K, i64)>
where
    K: Eq + Hash + Clone,
{
    let mut index: AHashMap<K, usize> = AHashMap::new();
    let mut out: Vec<(K, i64)> = Vec::new();
    for item in items {
        let Some(key) = key_fn(&item) else { continue };
        let value = value_fn(&item);
        match index.get(&key) {
            Some(&i) => out[i].1 = out[i].1.saturating_add(value),
            None => {
                index.insert(key.clone(), out.len());
                out.push((key, value));
            }
        }
    }
    out
}

/// Sum record amounts per key, in first-seen key order.
pub fn sum_by_key<K, F>(records: &[Record], key_fn: F) -> Vec<(K, i64)>
where
    K: Eq + Hash + Clone,
    F: Fn(&Record) -> K,
{
    group_totals(records, |r| Some(key_fn(r)), |r| r.amount)
}

/// Display label of the project a transaction belongs to.
///
/// Object name first, then a synthetic `"ID {objectId}"`, then the last path
/// segment.
pub fn project_label(record: &Record) -> String {
    if let Some(name) = record.object_name.as_deref().map(str::trim)
        && !name.is_empty()
    {
        return name.to_string();
    }
    if let Some(id) = record.object_id {
        return format!("ID {id}");
    }
    record
        .path
        .as_deref()
        .and_then(|p| p.rsplit('/').find(|seg| !seg.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// XP per project, XP transactions only.
pub fn xp_by_project(records: &[Record]) -> Vec<(String, i64)> {
    let xp: Vec<Record> = records
        .iter()
        .filter(|r| r.kind == TxKind::Xp)
        .cloned()
        .collect();
    sum_by_key(&xp, project_label)
}

pub fn total_xp(records: &[Record]) -> i64 {
    records
        .iter()
        .filter(|r| r.kind == TxKind::Xp)
        .map(|r| r.amount)
        .fold(0i64, i64::saturating_add)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassFail {
    pub pass: u64,
    pub fail: u64,
}

impl PassFail {
    pub fn total(&self) -> u64 {
        self.pass + self.fail
    }
}

/// Count graded results by outcome; ungraded results are not counted.
pub fn pass_fail_counts(results: &[ResultRecord]) -> PassFail {
    let grouped = group_totals(results, |r| r.outcome(), |_| 1);
    let mut counts = PassFail::default();
    for (grade, n) in grouped {
        let n = n.max(0) as u64;
        match grade {
            Grade::Pass => counts.pass = n,
            Grade::Fail => counts.fail = n,
        }
    }
    counts
}

/// Top `limit` skills by their best recorded score.
///
/// Only the maximum amount per skill counts (never the sum). Ties keep
/// first-seen order.
pub fn top_unique_skills(records: &[Record], limit: usize) -> Vec<SkillLevel> {
    let mut index: AHashMap<&str, usize> = AHashMap::new();
    let mut best: Vec<(&str, i64)> = Vec::new();
    for r in records {
        let TxKind::Skill(name) = &r.kind else { continue };
        match index.get(name.as_str()) {
            Some(&i) => best[i].1 = best[i].1.max(r.amount),
            None => {
                index.insert(name.as_str(), best.len());
                best.push((name.as_str(), r.amount));
            }
        }
    }

    let mut skills: Vec<SkillLevel> = best
        .into_iter()
        .map(|(name, amount)| SkillLevel {
            name: name.to_string(),
            level: amount as f64 / 100.0,
        })
        .collect();
    // `sort_by` is stable, which gives the first-seen tie-break.
    skills.sort_by(|a, b| b.level.total_cmp(&a.level));
    skills.truncate(limit);
    skills
}

/// Audit ratio, never `Infinity`/`NaN`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AuditRatio {
    Ratio(f64),
    /// Nothing received yet.
    NotApplicable,
}

impl AuditRatio {
    pub fn compute(given: i64, received: i64) -> Self {
        if received > 0 {
            AuditRatio::Ratio(given as f64 / received as f64)
        } else {
            AuditRatio::NotApplicable
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            AuditRatio::Ratio(r) => Some(*r),
            AuditRatio::NotApplicable => None,
        }
    }
}

/// Where the "given" figure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuditSource {
    /// Summed from `up`/`down` transactions.
    Transactions,
    /// Back-derived as `auditRatio × totalReceived`.
    DerivedFromRatio,
}

/// Server-side figures used when the dataset has no `up`/`down` rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AuditFallback {
    pub audit_ratio: f64,
    pub total_received: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub given: i64,
    pub received: i64,
    pub ratio: AuditRatio,
    pub source: AuditSource,
}

/// Split audit XP into given (`up`) and received (`down`).
///
/// The `up`/`down` transactions are authoritative. `fallback` is consulted
/// only when the records contain neither.
pub fn audit_summary(records: &[Record], fallback: Option<AuditFallback>) -> AuditSummary {
    let mut given = 0i64;
    let mut received = 0i64;
    let mut seen = false;
    for r in records {
        match r.kind {
            TxKind::Up => {
                given = given.saturating_add(r.amount);
                seen = true;
            }
            TxKind::Down => {
                received = received.saturating_add(r.amount);
                seen = true;
            }
            _ => {}
        }
    }

    if !seen
        && let Some(fb) = fallback
        && fb.audit_ratio.is_finite()
        && fb.total_received.is_finite()
        && fb.total_received > 0.0
    {
        let received = fb.total_received.round() as i64;
        let given = (fb.audit_ratio * fb.total_received).round() as i64;
        return AuditSummary {
            given,
            received,
            ratio: AuditRatio::compute(given, received),
            source: AuditSource::DerivedFromRatio,
        };
    }

    AuditSummary {
        given,
        received,
        ratio: AuditRatio::compute(given, received),
        source: AuditSource::Transactions,
    }
}

/// Header figures of the profile view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub id: i64,
    pub login: String,
    /// First name when present, login otherwise.
    pub display_name: String,
    pub total_xp: i64,
    pub total_xp_label: String,
    pub audit: AuditSummary,
    pub audit_ratio_label: String,
    pub level: Option<i64>,
    pub level_label: String,
    pub results: PassFail,
}

/// Summarize a fetched profile. `None` when the response carries no user.
pub fn profile_summary(data: &UserProfileData) -> Option<ProfileSummary> {
    let user = data.user()?;
    let records = data.records();
    let results = data.results();

    let display_name = user
        .attrs
        .as_ref()
        .and_then(|a| a.first_name.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(user.login.as_str())
        .to_string();

    let fallback = match (user.audit_ratio, user.total_down) {
        (Some(audit_ratio), Some(total_received)) => Some(AuditFallback {
            audit_ratio,
            total_received,
        }),
        _ => None,
    };
    let audit = audit_summary(&records, fallback);

    let total = total_xp(&records);
    let level = user.events.iter().find_map(|e| e.level);

    Some(ProfileSummary {
        id: user.id,
        login: user.login.clone(),
        display_name,
        total_xp: total,
        total_xp_label: format_magnitude(total),
        audit,
        audit_ratio_label: format_ratio(audit.ratio),
        level,
        level_label: level.map_or_else(|| "N/A".to_string(), |l| l.to_string()),
        results: pass_fail_counts(&results),
    })
}
