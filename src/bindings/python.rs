// FFI Facade: the `_core` Python module.
// Exposes the pipeline to a Python rendering layer. Tables cross the
// boundary as lists of plain records; errors become `ValueError`.

use crate::analysis::{countries, country_view};
use crate::computation::Scenario;
use crate::config::CoreConfig;
use crate::error::{CoreError, Side};
use crate::ingest;
use crate::pipeline::{Basis, Pipeline, PipelineOutput, RunRequest};
use crate::store::{Record, Table};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

fn to_py_err(e: CoreError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

#[pyclass(name = "Record", get_all)]
#[derive(Debug, Clone)]
pub struct PyRecord {
    pub country: String,
    pub year: i32,
    pub co2_emissions: f64,
    pub green_subsidies: f64,
    pub env_tax_revenue: f64,
    pub debt_pct_gdp: f64,
    pub private_investment: Option<f64>,
    pub gfn: f64,
    pub fiscal_space: bool,
}

impl From<&Record> for PyRecord {
    fn from(r: &Record) -> Self {
        Self {
            country: r.country().to_string(),
            year: r.year(),
            co2_emissions: r.inputs.co2_emissions,
            green_subsidies: r.inputs.green_subsidies,
            env_tax_revenue: r.inputs.env_tax_revenue,
            debt_pct_gdp: r.inputs.debt_pct_gdp,
            private_investment: r.inputs.private_investment,
            gfn: r.gfn(),
            fiscal_space: r.fiscal_space(),
        }
    }
}

fn to_records(table: &Table) -> Vec<PyRecord> {
    table.iter().map(PyRecord::from).collect()
}

#[pyclass(name = "_PipelineResult")]
#[derive(Debug, Clone)]
pub struct PyPipelineResult {
    inner: PipelineOutput,
}

#[pymethods]
impl PyPipelineResult {
    pub fn baseline(&self) -> Vec<PyRecord> {
        to_records(&self.inner.baseline)
    }

    /// Post-scenario rows, or `None` when no scenario was requested.
    pub fn scenario(&self) -> Option<Vec<PyRecord>> {
        self.inner.scenario.as_ref().map(|o| to_records(&o.table))
    }

    pub fn summary(&self) -> Vec<(String, f64)> {
        self.inner.summary.iter().map(|s| (s.country.clone(), s.mean_gfn)).collect()
    }

    pub fn countries(&self) -> Vec<String> {
        countries(self.inner.summarized_table())
    }

    pub fn country_view(&self, country: &str) -> Vec<PyRecord> {
        country_view(self.inner.summarized_table(), country).into_iter().map(PyRecord::from).collect()
    }
}

/// Runs the pipeline over two CSV files.
#[pyfunction]
#[pyo3(signature = (public_path, private_path, scenario=None, year_threshold=None, basis="baseline", config_path=None, allow_empty=false))]
fn run_pipeline(
    public_path: &str,
    private_path: &str,
    scenario: Option<&str>,
    year_threshold: Option<i32>,
    basis: &str,
    config_path: Option<&str>,
    allow_empty: bool,
) -> PyResult<PyPipelineResult> {
    let config = match config_path {
        Some(path) => CoreConfig::load(path).map_err(to_py_err)?,
        None => CoreConfig::default(),
    };
    let request = RunRequest {
        scenario: scenario.map(str::parse::<Scenario>).transpose().map_err(to_py_err)?,
        year_threshold,
        basis: basis.parse::<Basis>().map_err(to_py_err)?,
        allow_empty,
    };

    let public = ingest::load_frame(public_path, Side::Public, &config).map_err(to_py_err)?;
    let private = ingest::load_frame(private_path, Side::Private, &config).map_err(to_py_err)?;
    let inner = Pipeline::new(config).run(&public, &private, &request).map_err(to_py_err)?;
    Ok(PyPipelineResult { inner })
}

#[pyfunction]
fn scenario_names() -> Vec<&'static str> {
    Scenario::ALL.iter().map(Scenario::name).collect()
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyRecord>()?;
    m.add_class::<PyPipelineResult>()?;
    m.add_function(wrap_pyfunction!(run_pipeline, m)?)?;
    m.add_function(wrap_pyfunction!(scenario_names, m)?)?;
    Ok(())
}
