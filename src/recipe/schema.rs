use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Deserialize, Default, Clone)]
pub struct MigrationConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Library package whose installed version gates the migration.
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub version_range: Option<String>,
    /// Project-relative directory the file-matching steps iterate.
    #[serde(default = "default_source_root")]
    pub source_root: String,
}

impl Default for Metadata {
    fn default() -> Self {
        Metadata {
            name: String::new(),
            description: None,
            package: String::new(),
            version_range: None,
            source_root: default_source_root(),
        }
    }
}

fn default_source_root() -> String {
    "src".to_string()
}

fn default_ts_suffix() -> String {
    ".ts".to_string()
}

fn default_html_suffix() -> String {
    ".html".to_string()
}

fn default_lifecycle_package() -> String {
    "@angular/core".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct StepDefinition {
    pub id: String,
    #[serde(flatten)]
    pub action: StepAction,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StepAction {
    /// Set a declared dependency to a new version in `package.json`.
    BumpDependency { package: String, version: String },

    /// Remove an import specifier (or a whole bare import) from every
    /// matching source file.
    RemoveImport {
        #[serde(default = "default_ts_suffix")]
        suffix: String,
        package: String,
        #[serde(default)]
        specifier: Option<String>,
    },

    /// Remove an interface from implements clauses in matching files.
    RemoveImplements {
        #[serde(default = "default_ts_suffix")]
        suffix: String,
        interface: String,
    },

    /// Remove an empty lifecycle method plus its interface and import.
    RemoveEmptyMethod {
        #[serde(default = "default_ts_suffix")]
        suffix: String,
        method: String,
        #[serde(default = "default_lifecycle_package")]
        lifecycle_package: String,
    },

    /// Rename an element in matching templates.
    RenameElement {
        #[serde(default = "default_html_suffix")]
        suffix: String,
        from: String,
        to: String,
    },

    /// Delete an element, content included, from matching templates.
    RemoveElement {
        #[serde(default = "default_html_suffix")]
        suffix: String,
        tag: String,
    },

    /// Remove one attribute from an element in matching templates.
    RemoveAttribute {
        #[serde(default = "default_html_suffix")]
        suffix: String,
        tag: String,
        attribute: String,
    },

    /// Delete a file (theme asset retired by the target version).
    DeleteFile { path: String },

    /// Move a file to its new location.
    MoveFile { from: String, to: String },
}

impl MigrationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.meta.package.trim().is_empty() {
            issues.push(ValidationIssue::MissingField {
                step_id: None,
                field: "meta.package",
            });
        }

        if self.steps.is_empty() {
            issues.push(ValidationIssue::EmptyStepList);
        }

        let mut seen_ids = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    step_id: None,
                    field: "id",
                });
            } else if !seen_ids.insert(step.id.as_str()) {
                issues.push(ValidationIssue::DuplicateId {
                    id: step.id.clone(),
                });
            }

            let mut require = |field: &'static str, value: &str| {
                if value.trim().is_empty() {
                    issues.push(ValidationIssue::MissingField {
                        step_id: Some(step.id.clone()),
                        field,
                    });
                }
            };

            match &step.action {
                StepAction::BumpDependency { package, version } => {
                    require("package", package);
                    require("version", version);
                }
                StepAction::RemoveImport {
                    suffix,
                    package,
                    specifier,
                } => {
                    require("suffix", suffix);
                    require("package", package);
                    if let Some(specifier) = specifier {
                        require("specifier", specifier);
                    }
                }
                StepAction::RemoveImplements { suffix, interface } => {
                    require("suffix", suffix);
                    require("interface", interface);
                }
                StepAction::RemoveEmptyMethod {
                    suffix,
                    method,
                    lifecycle_package,
                } => {
                    require("suffix", suffix);
                    require("method", method);
                    require("lifecycle_package", lifecycle_package);
                }
                StepAction::RenameElement { suffix, from, to } => {
                    require("suffix", suffix);
                    require("from", from);
                    require("to", to);
                }
                StepAction::RemoveElement { suffix, tag } => {
                    require("suffix", suffix);
                    require("tag", tag);
                }
                StepAction::RemoveAttribute {
                    suffix,
                    tag,
                    attribute,
                } => {
                    require("suffix", suffix);
                    require("tag", tag);
                    require("attribute", attribute);
                }
                StepAction::DeleteFile { path } => {
                    require("path", path);
                }
                StepAction::MoveFile { from, to } => {
                    require("from", from);
                    require("to", to);
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

#[derive(Debug)]
pub enum ValidationIssue {
    EmptyStepList,
    MissingField {
        step_id: Option<String>,
        field: &'static str,
    },
    DuplicateId {
        id: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyStepList => write!(f, "migration has no steps"),
            ValidationIssue::MissingField { step_id, field } => match step_id {
                Some(id) => write!(f, "step '{id}': missing field '{field}'"),
                None => write!(f, "missing field '{field}'"),
            },
            ValidationIssue::DuplicateId { id } => write!(f, "duplicate step id '{id}'"),
        }
    }
}
