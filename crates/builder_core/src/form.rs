use std::path::PathBuf;

use thiserror::Error;

/// Default text shown next to the package file input before a file is chosen.
pub const PACKAGE_PLACEHOLDER: &str = "Choose a file…";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    Tags,
    Imports,
    Pip,
    Apt,
}

impl FormField {
    /// Multipart field name expected by the build endpoint.
    pub fn wire_name(self) -> &'static str {
        match self {
            FormField::Name => "name",
            FormField::Tags => "tags",
            FormField::Imports => "imports",
            FormField::Pip => "pip",
            FormField::Apt => "apt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("image name is required")]
    MissingName,
    #[error("a package file is required")]
    MissingPackage,
}

/// One serialized form entry, in form order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEntry {
    Text { name: String, value: String },
    File { name: String, path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormData {
    pub entries: Vec<FormEntry>,
}

impl FormData {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            FormEntry::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildForm {
    pub name: String,
    pub tags: Vec<String>,
    pub imports: Vec<String>,
    pub pip: Vec<String>,
    pub apt: Vec<String>,
    pub package: Option<PathBuf>,
    pub package_label: String,
}

impl Default for BuildForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            tags: Vec::new(),
            imports: Vec::new(),
            pip: Vec::new(),
            apt: Vec::new(),
            package: None,
            package_label: PACKAGE_PLACEHOLDER.to_string(),
        }
    }
}

impl BuildForm {
    pub fn set_field(&mut self, field: FormField, value: &str) {
        match field {
            FormField::Name => self.name = value.to_string(),
            FormField::Tags => self.tags = split_tags(value),
            FormField::Imports => self.imports = split_tags(value),
            FormField::Pip => self.pip = split_tags(value),
            FormField::Apt => self.apt = split_tags(value),
        }
    }

    /// Records the chosen package file. The label keeps its previous text when
    /// the path has no file name component.
    pub fn select_file(&mut self, path: &str) {
        self.package = Some(PathBuf::from(path));
        let file_name = display_file_name(path);
        if !file_name.is_empty() {
            self.package_label = file_name.to_string();
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        if self.package.is_none() {
            return Err(FormError::MissingPackage);
        }
        Ok(())
    }

    pub fn to_form_data(&self) -> FormData {
        let mut entries = vec![FormEntry::Text {
            name: FormField::Name.wire_name().to_string(),
            value: self.name.clone(),
        }];
        for (field, values) in [
            (FormField::Tags, &self.tags),
            (FormField::Imports, &self.imports),
            (FormField::Pip, &self.pip),
            (FormField::Apt, &self.apt),
        ] {
            entries.push(FormEntry::Text {
                name: field.wire_name().to_string(),
                value: values.join(" "),
            });
        }
        if let Some(path) = &self.package {
            entries.push(FormEntry::File {
                name: "package".to_string(),
                path: path.clone(),
            });
        }
        FormData { entries }
    }
}

/// Tag-editor inputs are space delimited; repeated whitespace is collapsed.
fn split_tags(raw: &str) -> Vec<String> {
    raw.split_whitespace().map(ToOwned::to_owned).collect()
}

/// Last path component, accepting both Windows and Unix separators.
fn display_file_name(path: &str) -> &str {
    path.rsplit(['\\', '/']).next().unwrap_or_default()
}
