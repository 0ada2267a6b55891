use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// The `data` object of the profile query.
///
/// Every list defaults to empty so partial responses still parse; whether a
/// user is present is checked by the caller (see [`UserProfileData::user`]).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UserProfileData {
    #[serde(default)]
    pub user: Vec<RawUser>,
    #[serde(default)]
    pub transaction: Vec<RawTransaction>,
    #[serde(default)]
    pub result: Vec<RawResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub id: i64,
    pub login: String,
    #[serde(default)]
    pub attrs: Option<Attrs>,
    #[serde(default)]
    pub audit_ratio: Option<f64>,
    #[serde(default)]
    pub total_down: Option<f64>,
    #[serde(default)]
    pub events: Vec<EventLevel>,
    #[serde(default)]
    pub skills: Vec<RawTransaction>,
}

/// Free-form user attributes; only the name fields are read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attrs {
    #[serde(default)]
    pub first_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventLevel {
    #[serde(default)]
    pub level: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ObjectRef {
    #[serde(default)]
    pub name: Option<String>,
}

/// Raw transaction row as returned by the GraphQL engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(deserialize_with = "de_i64_from_number")]
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub object_id: Option<i64>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub object: Option<ObjectRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawResult {
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub object_id: Option<i64>,
    #[serde(deserialize_with = "de_timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Serde helper: the engine serializes `amount` as an integer, but numeric
/// columns occasionally come back as floats (`700.0`). Accept both.
fn de_i64_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    struct I64Visitor;

    impl<'de> Visitor<'de> for I64Visitor {
        type Value = i64;

        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "an integer or float amount")
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            i64::try_from(v).map_err(E::custom)
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            if !v.is_finite() {
                return Err(E::custom("non-finite amount"));
            }
            Ok(v.round() as i64)
        }
    }

    deserializer.deserialize_any(I64Visitor)
}

/// Serde helper: accept RFC 3339 timestamps and bare `YYYY-MM-DD` dates
/// (interpreted as midnight UTC).
fn de_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {s}")))
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Transaction direction/category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxKind {
    Xp,
    /// XP gained by auditing someone else ("given").
    Up,
    /// XP lost by being audited ("received").
    Down,
    /// `skill_<name>`; holds the name without the prefix.
    Skill(String),
    Other(String),
}

impl TxKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "xp" => TxKind::Xp,
            "up" => TxKind::Up,
            "down" => TxKind::Down,
            other => match other.strip_prefix("skill_") {
                Some(name) => TxKind::Skill(name.to_string()),
                None => TxKind::Other(other.to_string()),
            },
        }
    }
}

/// Tidy transaction record (one row = one transaction).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub amount: i64,
    pub kind: TxKind,
    pub object_id: Option<i64>,
    pub object_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub path: Option<String>,
}

impl From<RawTransaction> for Record {
    fn from(t: RawTransaction) -> Self {
        Self {
            amount: t.amount,
            kind: TxKind::parse(&t.kind),
            object_id: t.object_id,
            object_name: t.object.and_then(|o| o.name),
            created_at: t.created_at,
            path: t.path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    Pass,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultRecord {
    pub grade: Option<f64>,
    pub object_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl ResultRecord {
    /// `>= 1` passes, `[0, 1)` fails, ungraded (null) results are not counted.
    pub fn outcome(&self) -> Option<Grade> {
        match self.grade {
            Some(g) if g.is_finite() && g >= 1.0 => Some(Grade::Pass),
            Some(g) if g.is_finite() && g >= 0.0 => Some(Grade::Fail),
            _ => None,
        }
    }
}

impl From<RawResult> for ResultRecord {
    fn from(r: RawResult) -> Self {
        Self {
            grade: r.grade,
            object_id: r.object_id,
            created_at: r.created_at,
        }
    }
}

/// Highest recorded score of one skill, normalized to `0..=1`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillLevel {
    pub name: String,
    pub level: f64,
}

/// One step of a cumulative series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Point {
    pub x: DateTime<Utc>,
    pub y: i64,
}

/// A point in pixel space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScaledPoint {
    pub px: f64,
    pub py: f64,
}

impl ScaledPoint {
    pub fn new(px: f64, py: f64) -> Self {
        Self { px, py }
    }
}

impl UserProfileData {
    /// Parse a saved GraphQL response. Accepts the full `{"data": {...}}`
    /// envelope or the bare `data` object.
    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        let v: serde_json::Value = serde_json::from_str(s)?;
        match v.get("data") {
            Some(data) => serde_json::from_value(data.clone()),
            None => serde_json::from_value(v),
        }
    }

    /// The first (and only) user row, if the query returned one.
    pub fn user(&self) -> Option<&RawUser> {
        self.user.first()
    }

    pub fn records(&self) -> Vec<Record> {
        self.transaction.iter().cloned().map(Record::from).collect()
    }

    pub fn results(&self) -> Vec<ResultRecord> {
        self.result.iter().cloned().map(ResultRecord::from).collect()
    }

    /// Skill transactions hang off the user row.
    pub fn skill_records(&self) -> Vec<Record> {
        self.user()
            .map(|u| u.skills.iter().cloned().map(Record::from).collect())
            .unwrap_or_default()
    }
}
