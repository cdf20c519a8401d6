//! Labeled gauge registry.
//!
//! Every family lives in one map behind a single `RwLock`. A set or delete
//! holds the write lock for exactly one map operation and `render` holds the
//! read lock for the whole pass, so a scrape always sees each series either
//! before or after a mutation, never in between.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::RegistryError;

/// Something that can hold labeled gauge values.
///
/// [`Registry`] is the production implementation. Pollers are generic over
/// this trait so tests can substitute a recorder.
pub trait GaugeStore: Send + Sync {
    /// Create or update the series `family{labels}`.
    fn set_gauge(&self, family: &str, labels: &[&str], value: f64) -> Result<(), RegistryError>;

    /// Remove the series `family{labels}`.
    ///
    /// Returns `Ok(true)` if the series existed and was removed, `Ok(false)`
    /// if there was nothing to remove.
    fn delete_gauge(&self, family: &str, labels: &[&str]) -> Result<bool, RegistryError>;
}

impl<T: GaugeStore + ?Sized> GaugeStore for Arc<T> {
    fn set_gauge(&self, family: &str, labels: &[&str], value: f64) -> Result<(), RegistryError> {
        (**self).set_gauge(family, labels, value)
    }

    fn delete_gauge(&self, family: &str, labels: &[&str]) -> Result<bool, RegistryError> {
        (**self).delete_gauge(family, labels)
    }
}

#[derive(Debug)]
struct GaugeFamily {
    help: String,
    label_names: Vec<String>,
    series: BTreeMap<Vec<String>, f64>,
}

impl GaugeFamily {
    fn check_arity(&self, family: &str, labels: &[&str]) -> Result<(), RegistryError> {
        if labels.len() != self.label_names.len() {
            return Err(RegistryError::LabelArity {
                family: family.to_string(),
                expected: self.label_names.len(),
                got: labels.len(),
            });
        }
        Ok(())
    }
}

/// A process-wide set of named gauge families.
///
/// Cloning is cheap and every clone shares the same state, so one registry
/// can be handed to each poller and to the exposition server.
///
/// # Example
///
/// ```rust
/// use uptimewatch_sdk::Registry;
///
/// let registry = Registry::new();
/// registry
///     .register_gauge("up_monitors", "Monitors currently up", &[])
///     .unwrap();
/// registry
///     .register_gauge("monitor_status", "Monitor status code", &["name"])
///     .unwrap();
///
/// registry.set_gauge("up_monitors", &[], 3.0).unwrap();
/// registry.set_gauge("monitor_status", &["api"], 2.0).unwrap();
///
/// assert!(registry.render().contains("monitor_status{name=\"api\"} 2"));
/// assert!(registry.delete_gauge("monitor_status", &["api"]).unwrap());
/// assert!(!registry.delete_gauge("monitor_status", &["api"]).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    families: Arc<RwLock<BTreeMap<String, GaugeFamily>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a gauge family with the given label names.
    pub fn register_gauge(
        &self,
        name: &str,
        help: &str,
        label_names: &[&str],
    ) -> Result<(), RegistryError> {
        if !is_valid_metric_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if let Some(bad) = label_names.iter().find(|l| !is_valid_label_name(l)) {
            return Err(RegistryError::InvalidLabel(bad.to_string()));
        }

        let mut families = self.families.write();
        if families.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        families.insert(
            name.to_string(),
            GaugeFamily {
                help: help.to_string(),
                label_names: label_names.iter().map(|l| l.to_string()).collect(),
                series: BTreeMap::new(),
            },
        );
        Ok(())
    }

    /// Create or update one series. Idempotent.
    pub fn set_gauge(&self, family: &str, labels: &[&str], value: f64) -> Result<(), RegistryError> {
        let mut families = self.families.write();
        let entry = families
            .get_mut(family)
            .ok_or_else(|| RegistryError::UnknownFamily(family.to_string()))?;
        entry.check_arity(family, labels)?;

        let key: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        entry.series.insert(key, value);
        Ok(())
    }

    /// Remove one series, reporting whether it existed.
    pub fn delete_gauge(&self, family: &str, labels: &[&str]) -> Result<bool, RegistryError> {
        let mut families = self.families.write();
        let entry = families
            .get_mut(family)
            .ok_or_else(|| RegistryError::UnknownFamily(family.to_string()))?;
        entry.check_arity(family, labels)?;

        let key: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        Ok(entry.series.remove(&key).is_some())
    }

    /// Current value of one series.
    pub fn get_gauge(&self, family: &str, labels: &[&str]) -> Option<f64> {
        let families = self.families.read();
        let entry = families.get(family)?;
        let key: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        entry.series.get(&key).copied()
    }

    /// All series of a family, sorted by label tuple.
    pub fn series(&self, family: &str) -> Vec<(Vec<String>, f64)> {
        self.families
            .read()
            .get(family)
            .map(|f| f.series.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default()
    }

    /// Names of all registered families, sorted.
    pub fn families(&self) -> Vec<String> {
        self.families.read().keys().cloned().collect()
    }

    /// Render the whole registry in the Prometheus text exposition format.
    pub fn render(&self) -> String {
        let families = self.families.read();
        let mut output = String::new();

        for (name, family) in families.iter() {
            let _ = writeln!(output, "# HELP {} {}", name, escape_help(&family.help));
            let _ = writeln!(output, "# TYPE {} gauge", name);

            for (labels, value) in &family.series {
                output.push_str(name);
                if !labels.is_empty() {
                    output.push('{');
                    for (i, (label, label_value)) in family.label_names.iter().zip(labels).enumerate() {
                        if i > 0 {
                            output.push(',');
                        }
                        let _ = write!(output, "{}=\"{}\"", label, escape_label_value(label_value));
                    }
                    output.push('}');
                }
                let _ = writeln!(output, " {}", format_value(*value));
            }
        }

        output
    }
}

impl GaugeStore for Registry {
    fn set_gauge(&self, family: &str, labels: &[&str], value: f64) -> Result<(), RegistryError> {
        Registry::set_gauge(self, family, labels, value)
    }

    fn delete_gauge(&self, family: &str, labels: &[&str]) -> Result<bool, RegistryError> {
        Registry::delete_gauge(self, family, labels)
    }
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Escape a label value for Prometheus format.
/// Backslash, double-quote, and newline must be escaped.
fn escape_label_value(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

/// HELP text only escapes backslash and newline.
fn escape_help(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn format_value(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else {
        v.to_string()
    }
}
