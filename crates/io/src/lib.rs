use anyhow::{bail, Context, Result};
use std::{fs::File, io::{BufRead, BufReader, BufWriter, Write}, path::Path};
use serde::{Serialize, Deserialize};
use model::*;

/// Load a trajectory, picking the format from the file extension
/// (`csv`, `json` or `ndjson`).
pub fn import_trajectory(path: &Path) -> Result<Vec<TrajectoryPoint>> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "csv" => import_csv(path),
        "json" => import_json(path),
        "ndjson" | "jsonl" => import_ndjson(path),
        other => bail!("unsupported trajectory format {:?} for {}", other, path.display()),
    }
}

/// Write a trajectory, picking the format from the file extension.
pub fn export_trajectory(points: &[TrajectoryPoint], path: &Path) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "csv" => export_csv(points, path),
        "json" => export_json(points, path),
        "ndjson" | "jsonl" => export_ndjson(points, path),
        other => bail!("unsupported trajectory format {:?} for {}", other, path.display()),
    }
}

pub fn import_csv(path: &Path) -> Result<Vec<TrajectoryPoint>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let mut points = Vec::new();
    for (i, rec) in rdr.deserialize().enumerate() {
        let r: CsvRow = rec.with_context(|| format!("{} row {}", path.display(), i + 1))?;
        let p = TrajectoryPoint {
            x: r.x, y: r.y, timestamp: r.timestamp, steering_angle: r.steering_angle,
        };
        points.push(finite(p, path, "row", i + 1)?);
    }
    Ok(points)
}

pub fn export_csv(points: &[TrajectoryPoint], path: &Path) -> Result<()> {
    let mut w = csv::Writer::from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    for p in points {
        w.serialize(CsvRow{
            timestamp: p.timestamp, x: p.x, y: p.y, steering_angle: p.steering_angle,
        })?;
    }
    w.flush()?;
    Ok(())
}

/// A JSON array of points, as served by `GET /sessions/{id}/trajectory`.
pub fn import_json(path: &Path) -> Result<Vec<TrajectoryPoint>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let points: Vec<TrajectoryPoint> = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse {}", path.display()))?;
    points
        .into_iter()
        .enumerate()
        .map(|(i, p)| finite(p, path, "point", i + 1))
        .collect()
}

pub fn export_json(points: &[TrajectoryPoint], path: &Path) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, points)?;
    w.flush()?;
    Ok(())
}

pub fn import_ndjson(path: &Path) -> Result<Vec<TrajectoryPoint>> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = BufReader::new(f);
    let mut points = vec![];
    for (i, line) in rdr.lines().enumerate() {
        let s = line?;
        if s.trim().is_empty() { continue; }
        let p: TrajectoryPoint = serde_json::from_str(&s)
            .with_context(|| format!("{} line {}", path.display(), i + 1))?;
        points.push(finite(p, path, "line", i + 1)?);
    }
    Ok(points)
}

pub fn export_ndjson(points: &[TrajectoryPoint], path: &Path) -> Result<()> {
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for p in points {
        let s = serde_json::to_string(p)?;
        writeln!(w, "{}", s)?;
    }
    w.flush()?;
    Ok(())
}

/// A `SessionStats` document, as served by `GET /sessions/{id}/stats`.
pub fn import_stats(path: &Path) -> Result<SessionStats> {
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let stats = serde_json::from_reader(BufReader::new(f))
        .with_context(|| format!("parse {}", path.display()))?;
    Ok(stats)
}

fn finite(p: TrajectoryPoint, path: &Path, unit: &str, n: usize) -> Result<TrajectoryPoint> {
    if !p.is_finite() {
        bail!("{} {} {}: non-finite coordinate (x={}, y={})", path.display(), unit, n, p.x, p.y);
    }
    Ok(p)
}

#[derive(Serialize, Deserialize)]
struct CsvRow {
    timestamp: i64,
    x: f64,
    y: f64,
    #[serde(default)]
    steering_angle: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> Vec<TrajectoryPoint> {
        vec![
            TrajectoryPoint { x: 0.0, y: 0.0, timestamp: 1000, steering_angle: Some(-3.5) },
            TrajectoryPoint { x: 1.25, y: 2.5, timestamp: 1100, steering_angle: None },
            TrajectoryPoint { x: 3.0, y: 4.0, timestamp: 1200, steering_angle: Some(12.0) },
        ]
    }

    #[test]
    fn csv_with_blank_steering_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lap.csv");
        std::fs::write(&path, "timestamp,x,y,steering_angle\n0,1.0,2.0,\n50,1.5,2.5,4.0\n").unwrap();
        let pts = import_trajectory(&path).unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[0].steering_angle, None);
        assert_eq!(pts[1].steering_angle, Some(4.0));
        assert_eq!(pts[1].timestamp, 50);
    }

    #[test]
    fn csv_rejects_non_finite_coordinates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lap.csv");
        std::fs::write(&path, "timestamp,x,y,steering_angle\n0,NaN,0.0,\n10,1.0,1.0,\n20,5.0,3.0,\n").unwrap();
        let err = import_trajectory(&path).unwrap_err().to_string();
        assert!(err.contains("row 1"), "{}", err);

        std::fs::write(&path, "timestamp,x,y,steering_angle\n0,0.0,0.0,\n10,1.0,inf,\n").unwrap();
        let err = import_trajectory(&path).unwrap_err().to_string();
        assert!(err.contains("row 2"), "{}", err);
    }

    #[test]
    fn ndjson_rejects_non_finite_coordinates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.ndjson");
        export_ndjson(&[TrajectoryPoint::new(1.0, 1.0, 0), TrajectoryPoint::new(f64::NAN, 2.0, 10)], &path).unwrap();
        // serde_json writes NaN as null, which no longer parses as a number
        assert!(import_trajectory(&path).is_err());
    }

    #[test]
    fn csv_export_reads_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        export_csv(&sample(), &path).unwrap();
        assert_eq!(import_csv(&path).unwrap(), sample());
    }

    #[test]
    fn json_array_matches_api_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("traj.json");
        std::fs::write(
            &path,
            r#"[{"x":1,"y":2,"timestamp":10},{"x":3,"y":4,"timestamp":20,"steering_angle":0.5}]"#,
        )
        .unwrap();
        let pts = import_trajectory(&path).unwrap();
        assert_eq!(pts.len(), 2);
        assert_eq!(pts[1].steering_angle, Some(0.5));
    }

    #[test]
    fn ndjson_skips_blank_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rec.ndjson");
        export_ndjson(&sample(), &path).unwrap();
        let mut body = std::fs::read_to_string(&path).unwrap();
        body.push('\n');
        std::fs::write(&path, body).unwrap();
        assert_eq!(import_trajectory(&path).unwrap(), sample());
    }

    #[test]
    fn stats_document_parses() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stats.json");
        std::fs::write(
            &path,
            r#"{"session_id":"abc","total_points":3,"duration_ms":2000,
                "uwb_coverage":100.0,"imu_coverage":66.6,"steering_coverage":33.3,
                "bounds":{"min_x":-1,"max_x":3,"min_y":0,"max_y":4}}"#,
        )
        .unwrap();
        let st = import_stats(&path).unwrap();
        assert_eq!(st.session_id, "abc");
        assert_eq!(st.bounds.min_x, -1.0);
    }

    #[test]
    fn export_picks_format_from_extension() {
        let dir = tempdir().unwrap();
        for name in ["out.csv", "out.json", "out.ndjson"] {
            let path = dir.path().join(name);
            export_trajectory(&sample(), &path).unwrap();
            assert_eq!(import_trajectory(&path).unwrap(), sample(), "{}", name);
        }
        let body = std::fs::read_to_string(dir.path().join("out.json")).unwrap();
        assert!(body.trim_start().starts_with('['));
        assert!(export_trajectory(&sample(), &dir.path().join("out.gpx")).is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lap.gpx");
        std::fs::write(&path, "").unwrap();
        assert!(import_trajectory(&path).is_err());
    }
}
