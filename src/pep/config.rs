//! Problem configuration read from a task document:
//!
//! ```text
//! problem
//!  name: gd
//! settings
//!  loglevel: info
//!  greedy_square: true
//!  sympy_mode: false
//! parameters
//!  L: 1
//!  h: 1/2
//! ```
use crate::Utils::logger::init_logger;
use crate::Utils::task_parser::{DocumentMap, Value, parse_document_as};
use crate::pep::expression_manager::Coefficient;
use crate::pep::number::Number;
use crate::pep::pep_error::{PepError, PepResult};
use log::info;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct PepConfig {
    /// name of the context
    pub name: String,
    pub loglevel: Option<String>,
    pub greedy_square: bool,
    /// exact evaluation
    pub sympy_mode: bool,
    pub parameters: BTreeMap<String, Value>,
}

impl Default for PepConfig {
    fn default() -> Self {
        PepConfig {
            name: "pep".to_string(),
            loglevel: None,
            greedy_square: true,
            sympy_mode: false,
            parameters: BTreeMap::new(),
        }
    }
}

fn template() -> DocumentMap {
    let section = |keys: &[&str]| keys.iter().map(|k| (k.to_string(), None)).collect();
    HashMap::from([
        ("problem".to_string(), section(&["name"])),
        (
            "settings".to_string(),
            section(&["loglevel", "greedy_square", "sympy_mode"]),
        ),
        ("parameters".to_string(), HashMap::new()),
    ])
}

/// The single value of `section.key`, `None` when the key is absent.
fn single_value<'a>(doc: &'a DocumentMap, section: &str, key: &str) -> PepResult<Option<&'a Value>> {
    match doc.get(section).and_then(|s| s.get(key)) {
        None | Some(None) => Ok(None),
        Some(Some(values)) if values.len() == 1 => Ok(values.first()),
        Some(Some(values)) => Err(PepError::Config(format!(
            "{}.{} expects exactly one value, got {}",
            section,
            key,
            values.len()
        ))),
    }
}

fn boolean(doc: &DocumentMap, key: &str, default: bool) -> PepResult<bool> {
    match single_value(doc, "settings", key)? {
        None => Ok(default),
        Some(value) => value.as_boolean().ok_or_else(|| {
            PepError::Config(format!("settings.{} must be true or false, got {}", key, value))
        }),
    }
}

fn value_to_number(name: &str, value: &Value) -> PepResult<Number> {
    match value {
        Value::Integer(i) => Ok(Number::int(*i)),
        Value::Rational(r) => Ok(Number::Rational(r.clone())),
        Value::Float(f) => Ok(Number::Float(*f)),
        other => Err(PepError::Config(format!(
            "parameter {} must be a number, got {}",
            name, other
        ))),
    }
}

impl PepConfig {
    pub fn from_document(doc: &DocumentMap) -> PepResult<PepConfig> {
        let defaults = PepConfig::default();
        let name = match single_value(doc, "problem", "name")? {
            Some(value) => value.to_string(),
            None => defaults.name,
        };
        let loglevel = single_value(doc, "settings", "loglevel")?.map(|v| v.to_string());
        let greedy_square = boolean(doc, "greedy_square", defaults.greedy_square)?;
        let sympy_mode = boolean(doc, "sympy_mode", defaults.sympy_mode)?;
        let mut parameters = BTreeMap::new();
        if let Some(section) = doc.get("parameters") {
            for key in section.keys() {
                if let Some(value) = single_value(doc, "parameters", key)? {
                    parameters.insert(key.clone(), value.clone());
                }
            }
        }
        Ok(PepConfig {
            name,
            loglevel,
            greedy_square,
            sympy_mode,
            parameters,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> PepResult<PepConfig> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = content.parse::<PepConfig>()?;
        info!("configuration {} loaded from {}", config.name, path.as_ref().display());
        Ok(config)
    }

    /// Parameter values in the coefficient type of the evaluation mode.
    /// In exact mode a float value is a usage error.
    pub fn resolve_parameters<T: Coefficient>(&self) -> PepResult<HashMap<String, T>> {
        let mut resolved = HashMap::with_capacity(self.parameters.len());
        for (name, value) in &self.parameters {
            let number = value_to_number(name, value)?;
            resolved.insert(name.clone(), T::from_number(&number)?);
        }
        Ok(resolved)
    }

    /// Installs the terminal logger at the configured level (`info` by default).
    pub fn init_logging(&self) -> PepResult<bool> {
        init_logger(self.loglevel.as_deref().unwrap_or("info"), None)
    }
}

impl FromStr for PepConfig {
    type Err = PepError;

    fn from_str(input: &str) -> PepResult<PepConfig> {
        let doc = parse_document_as(input, Some(template())).map_err(PepError::Config)?;
        PepConfig::from_document(&doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::symbolic_engine::Expr;
    use approx::assert_relative_eq;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DOCUMENT: &str = "problem\n name: gd\nsettings\n loglevel: warn\n greedy_square: false\n sympy_mode: true\nparameters\n L: 2\n h: 1/2\n";

    #[test]
    fn test_parse_config() {
        let config: PepConfig = DOCUMENT.parse().unwrap();
        assert_eq!(config.name, "gd");
        assert_eq!(config.loglevel.as_deref(), Some("warn"));
        assert!(!config.greedy_square);
        assert!(config.sympy_mode);
        assert_eq!(config.parameters.len(), 2);
    }

    #[test]
    fn test_defaults() {
        let config: PepConfig = "parameters\n L: 1".parse().unwrap();
        assert_eq!(config.name, "pep");
        assert_eq!(config.loglevel, None);
        assert!(config.greedy_square);
        assert!(!config.sympy_mode);
        assert_eq!(PepConfig::default().parameters.len(), 0);
    }

    #[test]
    fn test_resolve_parameters_both_modes() {
        let config: PepConfig = DOCUMENT.parse().unwrap();
        let floats = config.resolve_parameters::<f64>().unwrap();
        assert_relative_eq!(floats["h"], 0.5);
        assert_relative_eq!(floats["L"], 2.0);
        let exact = config.resolve_parameters::<Expr>().unwrap();
        assert_eq!(exact["h"], Expr::rational(1, 2));
        assert_eq!(exact["L"], Expr::int(2));
    }

    #[test]
    fn test_float_parameter_in_exact_mode() {
        let config: PepConfig = "parameters\n L: 1.5".parse().unwrap();
        assert!(config.resolve_parameters::<f64>().is_ok());
        assert!(matches!(
            config.resolve_parameters::<Expr>(),
            Err(PepError::Usage(_))
        ));
    }

    #[test]
    fn test_bad_values() {
        let not_a_number: PepConfig = "parameters\n L: big".parse().unwrap();
        assert!(matches!(
            not_a_number.resolve_parameters::<f64>(),
            Err(PepError::Config(_))
        ));
        let bad_flag = "settings\n sympy_mode: maybe".parse::<PepConfig>();
        assert!(matches!(bad_flag, Err(PepError::Config(_))));
        let two_names = "problem\n name: a, b".parse::<PepConfig>();
        assert!(matches!(two_names, Err(PepError::Config(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "// gradient descent\n{}", DOCUMENT).unwrap();
        let config = PepConfig::from_file(file.path()).unwrap();
        assert_eq!(config.name, "gd");
        assert!(matches!(
            PepConfig::from_file("/definitely/not/here.txt"),
            Err(PepError::Config(_))
        ));
    }
}
