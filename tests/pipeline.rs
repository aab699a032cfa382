use green_finance_core::{
    ingest, summarize, Basis, CoreConfig, CoreError, Pipeline, RunRequest, Scenario, Side,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Writes `text` the way a spreadsheet "latin1" export does: windows-1252,
/// one byte per char, with `€` at 0x80.
fn latin1_file(text: &str) -> NamedTempFile {
    let bytes: Vec<u8> = text
        .chars()
        .map(|c| match c {
            '€' => 0x80,
            _ => u8::try_from(c as u32).expect("not representable in windows-1252"),
        })
        .collect();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file
}

const PUBLIC: &str = "\
 Pays ,Année,Emission_CO2(Mt),Subventions_vertes (en Milliards €),Recettes_fiscales_env (en Milliards €),Dette_publique( en % du PIB ),source
France,2023,300,5,4,110,treasury
France,2024,295,5,4,111,treasury
France,2025,290,5,4,112,treasury
France,2026,285,5,4,113,treasury
Espagne,2025,200,1,1,86,hacienda
Italie,2025,310,2,2,140,mef
";

const PRIVATE: &str = "\
Pays,Année ,Investissements_Privés,source
France,2023,10,survey
France,2024,11,survey
France,2025,12,survey
France,2026,13,survey
Espagne,2025,6,survey
Allemagne,2025,20,survey
Allemagne,,5,survey
";

fn load(public: &NamedTempFile, private: &NamedTempFile) -> (green_finance_core::Frame, green_finance_core::Frame) {
    let config = CoreConfig::default();
    (
        ingest::load_frame(public.path(), Side::Public, &config).unwrap(),
        ingest::load_frame(private.path(), Side::Private, &config).unwrap(),
    )
}

#[test]
fn test_end_to_end_from_latin1_files() {
    let (public_file, private_file) = (latin1_file(PUBLIC), latin1_file(PRIVATE));
    let (public, private) = load(&public_file, &private_file);

    let joined = green_finance_core::join::join(&public, &private).unwrap();
    assert!(joined.has_column("source_pub"));
    assert!(joined.has_column("source_priv"));
    assert!(joined.has_column("green_subsidies"));
    assert!(joined.has_column("env_tax_revenue"));
    // Italy has no private row, Germany no public row, and the yearless
    // German row cannot match anything.
    assert_eq!(joined.row_count(), 5);

    let request = RunRequest {
        scenario: Some(Scenario::DebtCrisis),
        year_threshold: Some(2025),
        basis: Basis::Scenario,
        ..RunRequest::default()
    };
    let out = Pipeline::default().run(&public, &private, &request).unwrap();

    let outcome = out.scenario.as_ref().unwrap();
    assert_eq!(outcome.affected_rows, 3);

    let baseline_debt: Vec<f64> = out.baseline.iter().map(|r| r.inputs.debt_pct_gdp).collect();
    let scenario_debt: Vec<f64> = outcome.table.iter().map(|r| r.inputs.debt_pct_gdp).collect();
    assert_eq!(baseline_debt, vec![110.0, 111.0, 112.0, 113.0, 86.0]);
    assert_eq!(scenario_debt, vec![110.0, 111.0, 117.0, 118.0, 91.0]);

    // Spain loses its fiscal space under the crisis.
    assert!(out.baseline.records()[4].fiscal_space());
    assert!(!outcome.table.records()[4].fiscal_space());

    assert_eq!(out.summary, summarize(&outcome.table));
}

#[test]
fn test_private_incentive_uses_private_investment_column() {
    let (public_file, private_file) = (latin1_file(PUBLIC), latin1_file(PRIVATE));
    let (public, private) = load(&public_file, &private_file);

    let request = RunRequest {
        scenario: Some(Scenario::PrivateIncentive),
        year_threshold: Some(2026),
        basis: Basis::Scenario,
        ..RunRequest::default()
    };
    let out = Pipeline::default().run(&public, &private, &request).unwrap();

    let table = &out.scenario.as_ref().unwrap().table;
    let france_2026 = table.iter().find(|r| r.country() == "France" && r.year() == 2026).unwrap();
    assert!((france_2026.inputs.private_investment.unwrap() - 16.9).abs() < 1e-9);
    assert!((france_2026.inputs.green_subsidies - 4.0).abs() < 1e-9);
    // 285 * 80 / 1000 - 4 - 4
    assert!((france_2026.gfn() - 14.8).abs() < 1e-9);
}

#[test]
fn test_missing_key_column_in_file_is_schema_error() {
    let public_file = latin1_file(PUBLIC);
    let private_file = latin1_file("Pays,Investissements_Privés\nFrance,10\n");
    let (public, private) = load(&public_file, &private_file);

    let err = Pipeline::default().run(&public, &private, &RunRequest::default()).unwrap_err();
    assert!(matches!(err, CoreError::Schema { side: Side::Private, .. }));
    assert!(err.is_fatal());
}

#[test]
fn test_no_shared_keys_is_empty_result() {
    let public_file = latin1_file(PUBLIC);
    let private_file = latin1_file("Pays,Année\nPortugal,2025\n");
    let (public, private) = load(&public_file, &private_file);

    let err = Pipeline::default().run(&public, &private, &RunRequest::default()).unwrap_err();
    assert!(matches!(err, CoreError::EmptyResult { public_rows: 6, private_rows: 1, .. }));
}

#[test]
fn test_empty_join_can_be_carried_through() {
    let public_file = latin1_file(PUBLIC);
    let private_file = latin1_file("Pays,Année,Investissements_Privés\nPortugal,2025,3\n");
    let (public, private) = load(&public_file, &private_file);

    let request = RunRequest { scenario: Some(Scenario::FiscalReform), allow_empty: true, ..RunRequest::default() };
    let out = Pipeline::default().run(&public, &private, &request).unwrap();

    assert!(out.baseline.is_empty());
    assert!(out.summary.is_empty());
    assert_eq!(out.scenario.as_ref().unwrap().affected_rows, 0);
}

#[test]
fn test_configured_carbon_price_changes_gfn() {
    let (public_file, private_file) = (latin1_file(PUBLIC), latin1_file(PRIVATE));
    let (public, private) = load(&public_file, &private_file);

    let config = CoreConfig::from_toml_str("carbon_price_per_ton = 100.0").unwrap();
    let out = Pipeline::new(config).run(&public, &private, &RunRequest::default()).unwrap();

    // Spain 2025: 200 * 100 / 1000 - 1 - 1
    let spain = out.baseline.iter().find(|r| r.country() == "Espagne").unwrap();
    assert!((spain.gfn() - 18.0).abs() < 1e-9);
}
