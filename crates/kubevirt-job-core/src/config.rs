use std::fmt;

use thiserror::Error;

use crate::env::EnvSource;
use crate::error::ConfigError;
use crate::selector::Selector;

pub const MACHINE_TYPE_ENV: &str = "MACHINE_TYPE";
pub const NAMESPACE_ENV: &str = "NAMESPACE";
pub const RESTART_REQUIRED_ENV: &str = "RESTART_REQUIRED";
pub const LABEL_SELECTOR_ENV: &str = "LABEL_SELECTOR";

const MAX_NAMESPACE_LENGTH: usize = 63;

/// Shell-style pattern matched against a whole machine type string.
///
/// `*`, `?`, `[...]` and `[!...]` are supported. There is no path separator
/// handling: `*` matches any run of characters, `/` included, and `**` is the
/// same as `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineTypeGlob {
    raw: String,
    pattern: glob::Pattern,
}

impl MachineTypeGlob {
    pub fn new(pattern: &str) -> Result<Self, glob::PatternError> {
        Ok(Self {
            raw: pattern.to_string(),
            pattern: glob::Pattern::new(&collapse_stars(pattern))?,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, machine_type: &str) -> bool {
        self.pattern.matches(machine_type)
    }
}

/// Folds every run of `*` outside a `[...]` class into a single `*`. The glob
/// crate reads `**` as a recursive path wildcard, which has no meaning here.
fn collapse_stars(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(pattern.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while i < chars.len() && chars[i] == '*' {
                    i += 1;
                }
            }
            '[' => {
                // A `]` right after `[` or `[!` is a literal member of the class.
                let start = i;
                i += 1;
                if chars.get(i) == Some(&'!') {
                    i += 1;
                }
                if chars.get(i) == Some(&']') {
                    i += 1;
                }
                while i < chars.len() && chars[i] != ']' {
                    i += 1;
                }
                i = (i + 1).min(chars.len());
                out.extend(&chars[start..i]);
            }
            c => {
                out.push(c);
                i += 1;
            }
        }
    }
    out
}

impl fmt::Display for MachineTypeGlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("expected \"true\" or \"false\"")]
struct InvalidBool;

/// Resolved job configuration. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    machine_type_glob: MachineTypeGlob,
    namespace: String,
    label_selector: Selector,
    restart_required: bool,
}

impl UpdaterConfig {
    /// Resolve from `MACHINE_TYPE`, `NAMESPACE`, `RESTART_REQUIRED` and
    /// `LABEL_SELECTOR`, in that order. The first invalid value is reported.
    pub fn from_env<E: EnvSource + ?Sized>(env: &E) -> Result<Self, ConfigError> {
        let machine_type = env
            .get(MACHINE_TYPE_ENV)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingMachineType)?;
        let machine_type_glob =
            MachineTypeGlob::new(&machine_type).map_err(|source| ConfigError::InvalidPattern {
                name: MACHINE_TYPE_ENV,
                value: machine_type.clone(),
                source,
            })?;

        let namespace = env
            .get(NAMESPACE_ENV)
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingNamespace)?;
        if !is_dns1123_label(&namespace) {
            return Err(ConfigError::InvalidSyntax {
                name: NAMESPACE_ENV,
                value: namespace,
            });
        }

        let restart_required = match env.get(RESTART_REQUIRED_ENV) {
            None => false,
            Some(value) => parse_bool(&value).ok_or_else(|| ConfigError::Unparsable {
                name: RESTART_REQUIRED_ENV,
                value: value.clone(),
                source: Box::new(InvalidBool),
            })?,
        };

        let label_selector = match env.get(LABEL_SELECTOR_ENV) {
            None => Selector::everything(),
            Some(value) => Selector::parse(&value).map_err(|source| ConfigError::Unparsable {
                name: LABEL_SELECTOR_ENV,
                value: value.clone(),
                source: Box::new(source),
            })?,
        };

        Ok(Self {
            machine_type_glob,
            namespace,
            label_selector,
            restart_required,
        })
    }

    pub fn machine_type_glob(&self) -> &MachineTypeGlob {
        &self.machine_type_glob
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn label_selector(&self) -> &Selector {
        &self.label_selector
    }

    pub fn restart_required(&self) -> bool {
        self.restart_required
    }
}

impl fmt::Display for UpdaterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Machine type:     {}", self.machine_type_glob)?;
        writeln!(f, "  Namespace:        {}", self.namespace)?;
        if self.label_selector.is_everything() {
            writeln!(f, "  Label selector:   (everything)")?;
        } else {
            writeln!(f, "  Label selector:   {}", self.label_selector)?;
        }
        write!(f, "  Restart required: {}", self.restart_required)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// RFC 1123 label: lowercase alphanumerics and '-', alphanumeric at both ends.
fn is_dns1123_label(value: &str) -> bool {
    let bytes = value.as_bytes();
    let alnum = |b: &u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            bytes.len() <= MAX_NAMESPACE_LENGTH
                && alnum(first)
                && alnum(last)
                && bytes.iter().all(|b| alnum(b) || *b == b'-')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::error::Error as _;

    use super::*;

    const GLOB: &str = "*glob8.*";

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn resolve(pairs: &[(&str, &str)]) -> Result<UpdaterConfig, ConfigError> {
        UpdaterConfig::from_env(&env(pairs))
    }

    #[test]
    fn missing_machine_type() {
        let err = resolve(&[(NAMESPACE_ENV, "default")]).unwrap_err();
        assert_eq!(err.to_string(), "no machine type was specified");

        let err = resolve(&[(MACHINE_TYPE_ENV, ""), (NAMESPACE_ENV, "default")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingMachineType));
    }

    #[test]
    fn malformed_machine_type_pattern() {
        let err = resolve(&[(MACHINE_TYPE_ENV, "[--"), (NAMESPACE_ENV, "default")]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "syntax error in pattern of MACHINE_TYPE environment variable, value \"[--\""
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn missing_namespace() {
        let err = resolve(&[(MACHINE_TYPE_ENV, GLOB)]).unwrap_err();
        assert_eq!(err.to_string(), "no namespace was specified");
    }

    #[test]
    fn malformed_namespace() {
        for bad in ["bad namespace pattern", "Default", "-leading", "trailing-", "a".repeat(64).as_str()] {
            let err = resolve(&[(MACHINE_TYPE_ENV, GLOB), (NAMESPACE_ENV, bad)]).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("syntax error in NAMESPACE environment variable, value \"{bad}\"")
            );
        }
    }

    #[test]
    fn malformed_restart_required() {
        let err = resolve(&[
            (MACHINE_TYPE_ENV, GLOB),
            (NAMESPACE_ENV, "default"),
            (RESTART_REQUIRED_ENV, "not_a_boolean"),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "error parsing RESTART_REQUIRED environment variable, value \"not_a_boolean\""
        );
    }

    #[test]
    fn restart_required_is_case_insensitive() {
        for (raw, expected) in [("true", true), ("TRUE", true), ("False", false), ("false", false)] {
            let config = resolve(&[
                (MACHINE_TYPE_ENV, GLOB),
                (NAMESPACE_ENV, "default"),
                (RESTART_REQUIRED_ENV, raw),
            ])
            .unwrap();
            assert_eq!(config.restart_required(), expected, "value {raw:?}");
        }
    }

    #[test]
    fn malformed_label_selector() {
        let bad = "non_a_valid for create error";
        let err = resolve(&[
            (MACHINE_TYPE_ENV, GLOB),
            (NAMESPACE_ENV, "default"),
            (LABEL_SELECTOR_ENV, bad),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("error parsing LABEL_SELECTOR environment variable, value \"{bad}\"")
        );
    }

    #[test]
    fn defaults_for_optional_values() {
        let config = resolve(&[(MACHINE_TYPE_ENV, GLOB), (NAMESPACE_ENV, "default")]).unwrap();
        assert_eq!(config.machine_type_glob().as_str(), GLOB);
        assert_eq!(config.namespace(), "default");
        assert_eq!(config.label_selector(), &Selector::everything());
        assert!(!config.restart_required());
    }

    #[test]
    fn label_selector_is_parsed() {
        let config = resolve(&[
            (MACHINE_TYPE_ENV, GLOB),
            (NAMESPACE_ENV, "default"),
            (LABEL_SELECTOR_ENV, "valid_label in (value1,value2)"),
        ])
        .unwrap();
        assert_eq!(config.label_selector().to_string(), "valid_label in (value1,value2)");
    }

    #[test]
    fn first_failure_wins() {
        // Both the namespace and the restart flag are bad; the namespace is checked first.
        let err = resolve(&[
            (MACHINE_TYPE_ENV, GLOB),
            (NAMESPACE_ENV, "not valid"),
            (RESTART_REQUIRED_ENV, "maybe"),
            (LABEL_SELECTOR_ENV, "in in in"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { name: NAMESPACE_ENV, .. }));

        let err = resolve(&[
            (MACHINE_TYPE_ENV, GLOB),
            (NAMESPACE_ENV, "default"),
            (RESTART_REQUIRED_ENV, "maybe"),
            (LABEL_SELECTOR_ENV, "in in in"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Unparsable { name: RESTART_REQUIRED_ENV, .. }));
    }

    #[test]
    fn glob_matches_whole_string() {
        let glob = MachineTypeGlob::new(GLOB).unwrap();
        assert!(glob.matches("smth-glob8.10.0"));
        assert!(!glob.matches("smth-glob9.10.0"));

        let glob = MachineTypeGlob::new("pc-q35-rhel8.?.0").unwrap();
        assert!(glob.matches("pc-q35-rhel8.6.0"));
        assert!(!glob.matches("pc-q35-rhel8.6.0-extra"));

        let glob = MachineTypeGlob::new("pc-[iq]*").unwrap();
        assert!(glob.matches("pc-i440fx-2.12"));
        assert!(glob.matches("pc-q35-4.2"));
        assert!(!glob.matches("virt-4.2"));
    }

    #[test]
    fn double_star_is_a_plain_wildcard() {
        let config = resolve(&[(MACHINE_TYPE_ENV, "pc-q35-rhel8**"), (NAMESPACE_ENV, "default")]).unwrap();
        assert_eq!(config.machine_type_glob().as_str(), "pc-q35-rhel8**");
        assert!(config.machine_type_glob().matches("pc-q35-rhel8.6.0"));
        assert!(!config.machine_type_glob().matches("pc-q35-rhel9.2.0"));

        let glob = MachineTypeGlob::new("**rhel8*").unwrap();
        assert_eq!(glob.to_string(), "**rhel8*");
        assert!(glob.matches("pc-q35-rhel8.6.0"));
        assert!(glob.matches("rhel8"));
    }

    #[test]
    fn stars_inside_a_class_are_kept() {
        assert_eq!(collapse_stars("a***b"), "a*b");
        assert_eq!(collapse_stars("[**]x**"), "[**]x*");
        assert_eq!(collapse_stars("[!]**]*"), "[!]**]*");

        let glob = MachineTypeGlob::new("pc[*]**").unwrap();
        assert!(glob.matches("pc*-q35"));
        assert!(!glob.matches("pc-q35"));
    }

    #[test]
    fn empty_restart_required_is_rejected() {
        let err = resolve(&[
            (MACHINE_TYPE_ENV, GLOB),
            (NAMESPACE_ENV, "default"),
            (RESTART_REQUIRED_ENV, ""),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::Unparsable { name: RESTART_REQUIRED_ENV, .. }));
        assert_eq!(
            err.to_string(),
            "error parsing RESTART_REQUIRED environment variable, value \"\""
        );
    }

    #[test]
    fn blank_label_selector_matches_everything() {
        for blank in ["", "  "] {
            let config = resolve(&[
                (MACHINE_TYPE_ENV, GLOB),
                (NAMESPACE_ENV, "default"),
                (LABEL_SELECTOR_ENV, blank),
            ])
            .unwrap();
            assert!(config.label_selector().is_everything(), "value {blank:?}");
        }
    }
}
