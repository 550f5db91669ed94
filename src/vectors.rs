use std::fs::File;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Result;

lazy_static! {
    // ngspice exposes source currents as "<source>#branch".
    static ref BRANCH_PATTERN: Regex = Regex::new(r"^(\w+)#branch$").unwrap();
}

/// A complex sample, as produced by AC and similar analyses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn magnitude(&self) -> f64 {
        self.re.hypot(self.im)
    }

    pub fn phase(&self) -> f64 {
        self.im.atan2(self.re)
    }
}

/// Samples of one simulation vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VectorData {
    Real(Vec<f64>),
    Complex(Vec<Complex>),
}

impl VectorData {
    pub fn len(&self) -> usize {
        match self {
            VectorData::Real(v) => v.len(),
            VectorData::Complex(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Real samples, if this is a real vector.
    pub fn as_real(&self) -> Option<&[f64]> {
        match self {
            VectorData::Real(v) => Some(v),
            VectorData::Complex(_) => None,
        }
    }
}

/// A named vector copied out of one of the simulator's result plots.
///
/// The data is an owned snapshot: ngspice reuses its internal storage on the
/// next command, so values are copied out at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vector {
    pub name: String,
    pub data: VectorData,
}

impl Vector {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Rewrites ngspice's `<source>#branch` current names to `i(<source>)`.
pub(crate) fn display_name(raw: &str) -> String {
    match BRANCH_PATTERN.captures(raw) {
        Some(captures) => format!("i({})", &captures[1]),
        None => raw.to_string(),
    }
}

/// All vectors of one plot, ready for post-processing or export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSet {
    pub plot: String,
    pub vectors: Vec<Vector>,
}

impl VectorSet {
    /// Look up a vector by its display name.
    pub fn get(&self, name: &str) -> Option<&Vector> {
        self.vectors.iter().find(|v| v.name == name)
    }

    /// Export all vectors to a CSV file, one column per vector. Complex
    /// vectors occupy two columns, `name.re` and `name.im`.
    pub fn export_csv(&self, filename: &str) -> Result<()> {
        let file = File::create(filename)?;
        let mut writer = csv::Writer::from_writer(file);

        let mut header = Vec::new();
        for vector in &self.vectors {
            match &vector.data {
                VectorData::Real(_) => header.push(vector.name.clone()),
                VectorData::Complex(_) => {
                    header.push(format!("{}.re", vector.name));
                    header.push(format!("{}.im", vector.name));
                }
            }
        }
        writer.write_record(&header)?;

        let rows = self.vectors.iter().map(|v| v.len()).max().unwrap_or(0);
        for i in 0..rows {
            let mut record = Vec::new();
            for vector in &self.vectors {
                match &vector.data {
                    VectorData::Real(values) => {
                        record.push(values.get(i).copied().unwrap_or(0.0).to_string());
                    }
                    VectorData::Complex(values) => {
                        let value = values.get(i).copied().unwrap_or(Complex { re: 0.0, im: 0.0 });
                        record.push(value.re.to_string());
                        record.push(value.im.to_string());
                    }
                }
            }
            writer.write_record(&record)?;
        }

        writer.flush()?;
        Ok(())
    }

    /// Export all vectors to a pretty-printed JSON file.
    pub fn export_json(&self, filename: &str) -> Result<()> {
        let file = File::create(filename)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> VectorSet {
        VectorSet {
            plot: "tran1".to_string(),
            vectors: vec![
                Vector {
                    name: "time".to_string(),
                    data: VectorData::Real(vec![0.0, 1e-6, 2e-6]),
                },
                Vector {
                    name: "v(out)".to_string(),
                    data: VectorData::Real(vec![0.0, 2.5, 5.0]),
                },
            ],
        }
    }

    #[test]
    fn test_branch_names_become_currents() {
        assert_eq!(display_name("v1#branch"), "i(v1)");
        assert_eq!(display_name("R1#branch"), "i(R1)");
    }

    #[test]
    fn test_ordinary_names_pass_through() {
        assert_eq!(display_name("v(out)"), "v(out)");
        assert_eq!(display_name("time"), "time");
        assert_eq!(display_name("not#branch#really"), "not#branch#really");
    }

    #[test]
    fn test_complex_magnitude_and_phase() {
        let c = Complex { re: 3.0, im: 4.0 };
        assert!((c.magnitude() - 5.0).abs() < 1e-12);
        let c = Complex { re: 0.0, im: 1.0 };
        assert!((c.phase() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_get_by_display_name() {
        let set = sample_set();
        assert_eq!(set.get("v(out)").unwrap().len(), 3);
        assert!(set.get("v(missing)").is_none());
    }

    #[test]
    fn test_export_csv_writes_one_column_per_vector() {
        let set = sample_set();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        set.export_csv(path.to_str().unwrap()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "time,v(out)");
        assert_eq!(lines.clone().count(), 3);
        assert!(lines.next().unwrap().starts_with("0,"));
    }

    #[test]
    fn test_export_json_round_trips() {
        let set = sample_set();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        set.export_json(path.to_str().unwrap()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: VectorSet = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, set);
    }
}
