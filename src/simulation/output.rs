use crate::base::{Error, Result};
use crate::data::DataContainer;
use std::ffi::OsStr;
use std::fmt::Write;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::Path;

/// Holds the table of results (one row per emitted step)
///
/// The columns are the plot keys of the simulation data followed by the plot keys of the
/// material data, in registration order.
#[derive(Clone, Debug)]
pub struct Output {
    /// Column names
    pub header: Vec<String>,

    /// Values (old slots) at each emitted step
    pub rows: Vec<Vec<f64>>,
}

impl Output {
    /// Allocates a new instance with the columns of the given containers
    pub fn new(simdat: &DataContainer, matdat: &DataContainer) -> Self {
        let mut header = simdat.plot_keys().to_vec();
        header.extend(matdat.plot_keys().iter().cloned());
        Output { header, rows: Vec::new() }
    }

    /// Appends a row with the current state
    pub fn push_row(&mut self, simdat: &DataContainer, matdat: &DataContainer) {
        let mut row = simdat.plot_values();
        row.extend(matdat.plot_values());
        self.rows.push(row);
    }

    /// Returns the index of a column
    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.header.iter().position(|k| k.eq_ignore_ascii_case(key))
    }

    /// Returns all values of a column
    pub fn column(&self, key: &str) -> Option<Vec<f64>> {
        let index = self.column_index(key)?;
        Some(self.rows.iter().map(|row| row[index]).collect())
    }

    /// Returns the value of a column in the last row
    pub fn last(&self, key: &str) -> Option<f64> {
        let index = self.column_index(key)?;
        self.rows.last().map(|row| row[index])
    }

    /// Returns the table as text
    ///
    /// ```text
    /// TIME TIMESTEP SIG11 ...
    /// 0.00000000000000e0 0.00000000000000e0 0.00000000000000e0 ...
    /// ```
    pub fn table(&self) -> String {
        let mut buffer = String::new();
        writeln!(&mut buffer, "{}", self.header.join(" ")).unwrap();
        for row in &self.rows {
            let values: Vec<String> = row.iter().map(|v| format!("{:.14e}", v)).collect();
            writeln!(&mut buffer, "{}", values.join(" ")).unwrap();
        }
        buffer
    }

    /// Writes the table to a file
    ///
    /// # Input
    ///
    /// * `full_path` -- may be a String, &str, or Path
    pub fn write_table<P>(&self, full_path: &P) -> Result<()>
    where
        P: AsRef<OsStr> + ?Sized,
    {
        write_text(full_path, &self.table())
    }
}

/// Writes the checked parameters as `name = value` lines
///
/// # Input
///
/// * `full_path` -- may be a String, &str, or Path
/// * `parameters` -- (name, value) pairs
pub fn write_props<P>(full_path: &P, parameters: &[(String, f64)]) -> Result<()>
where
    P: AsRef<OsStr> + ?Sized,
{
    write_text(full_path, &props_text(parameters))
}

/// Returns the parameter echo as text
pub fn props_text(parameters: &[(String, f64)]) -> String {
    let mut buffer = String::new();
    for (name, value) in parameters {
        writeln!(&mut buffer, "{} = {:12.5e}", name, value).unwrap();
    }
    buffer
}

fn write_text<P>(full_path: &P, text: &str) -> Result<()>
where
    P: AsRef<OsStr> + ?Sized,
{
    let path = Path::new(full_path).to_path_buf();
    if let Some(p) = path.parent() {
        fs::create_dir_all(p)?;
    }
    let mut file = File::create(&path)?;
    file.write_all(text.as_bytes())?;
    file.sync_all().map_err(Error::from)
}

////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::{props_text, write_props, Output};
    use crate::data::{DataContainer, DataType, Init};
    use std::fs;

    fn containers() -> (DataContainer, DataContainer) {
        let mut simdat = DataContainer::new("simulation data");
        simdat.register("time", DataType::Scalar, Init::Default, Some("time")).unwrap();
        simdat.register("leg number", DataType::Scalar, Init::Default, None).unwrap();
        let mut matdat = DataContainer::new("material data");
        matdat.register("stress", DataType::SymTensor, Init::Default, Some("sig")).unwrap();
        (simdat, matdat)
    }

    #[test]
    fn output_works() {
        let (mut simdat, mut matdat) = containers();
        let mut output = Output::new(&simdat, &matdat);
        assert_eq!(output.header, &["TIME", "SIG11", "SIG22", "SIG33", "SIG12", "SIG23", "SIG13"]);
        output.push_row(&simdat, &matdat);
        simdat.store("time", 1.0).unwrap();
        matdat.store("stress", vec![-2.5, 0.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        simdat.advance_all();
        matdat.advance_all();
        output.push_row(&simdat, &matdat);
        assert_eq!(output.rows.len(), 2);
        assert_eq!(output.column("sig11").unwrap(), &[0.0, -2.5]);
        assert_eq!(output.last("TIME"), Some(1.0));
        assert_eq!(output.column("EPS11"), None);

        let table = output.table();
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "TIME SIG11 SIG22 SIG33 SIG12 SIG23 SIG13");
        assert!(lines[2].starts_with("1.00000000000000e0 -2.50000000000000e0 "));
    }

    #[test]
    fn props_work() {
        let params = vec![("K".to_string(), 10.0), ("G".to_string(), 4.5)];
        assert_eq!(props_text(&params), "K =    1.00000e1\nG =    4.50000e0\n");
        let path = "/tmp/pointsim/test_props_work.props";
        write_props(path, &params).unwrap();
        let text = fs::read_to_string(path).unwrap();
        assert!(text.starts_with("K ="));
    }
}
