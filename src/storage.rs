use crate::models::Point;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Save the cumulative XP series as CSV with header.
pub fn save_series_csv<P: AsRef<Path>>(points: &[Point], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.serialize(("date", "cumulative_xp"))?;
    for p in points {
        wtr.serialize((p.x.to_rfc3339(), p.y))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save any payload (dashboard, single chart, raw data) as pretty JSON.
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(value: &T, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(value)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::parse_timestamp;
    use tempfile::tempdir;

    #[test]
    fn write_csv_and_json() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("series.csv");
        let jsonp = dir.path().join("series.json");
        let pts = vec![
            Point {
                x: parse_timestamp("2024-01-01").unwrap(),
                y: 100,
            },
            Point {
                x: parse_timestamp("2024-02-01").unwrap(),
                y: 150,
            },
        ];
        save_series_csv(&pts, &csvp).unwrap();
        save_json(&pts, &jsonp).unwrap();

        let csv = std::fs::read_to_string(&csvp).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("date,cumulative_xp"));
        assert!(lines.next().unwrap().ends_with(",100"));
        assert!(lines.next().unwrap().ends_with(",150"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&jsonp).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 2);
    }
}
