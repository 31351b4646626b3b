//! Reading and writing the IDF text format (also used for OSM files).
use super::{IdfObject, StrictnessLevel, ValidityReport, collection_errors};
use crate::idd::IddFileType;
use anyhow::{Context, Result, bail, ensure};
use log::warn;
use std::fmt;
use std::fs;
use std::path::Path;

/// Width that field values are padded to before their `!-` comment
const VALUE_WIDTH: usize = 40;

/// An ordered collection of objects conforming to one IDD
#[derive(Debug, Clone, PartialEq)]
pub struct IdfFile {
    idd_file_type: IddFileType,
    header: Vec<String>,
    objects: Vec<IdfObject>,
}

impl IdfFile {
    /// Create an empty file
    pub fn new(idd_file_type: IddFileType) -> Self {
        Self {
            idd_file_type,
            header: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Create a file from objects known to conform to the file's IDD
    pub(crate) fn from_objects(idd_file_type: IddFileType, objects: Vec<IdfObject>) -> Self {
        Self {
            idd_file_type,
            header: Vec::new(),
            objects,
        }
    }

    /// The IDD the objects conform to
    pub fn idd_file_type(&self) -> IddFileType {
        self.idd_file_type
    }

    /// Comment lines printed at the top of the file
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// Set the comment lines printed at the top of the file
    pub fn set_header(&mut self, header: Vec<String>) {
        self.header = header;
    }

    /// The objects in file order
    pub fn objects(&self) -> &[IdfObject] {
        &self.objects
    }

    /// Consume the file, returning its objects
    pub fn into_objects(self) -> Vec<IdfObject> {
        self.objects
    }

    /// Append an object. It must belong to the same IDD as the file.
    pub fn add_object(&mut self, object: IdfObject) -> Result<()> {
        let idd = self.idd_file_type.idd_file();
        ensure!(
            idd.object(object.object_type())
                .is_some_and(|expected| std::ptr::eq(expected, object.idd_object())),
            "{} is not an object type of the {} IDD",
            object.object_type(),
            self.idd_file_type
        );
        self.objects.push(object);

        Ok(())
    }

    /// Iterate over objects of the given type (ignoring case)
    pub fn objects_of_type<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a IdfObject> {
        self.objects
            .iter()
            .filter(move |object| object.idd_object().is_type(name))
    }

    /// The version recorded in the file's version object
    pub fn version(&self) -> Option<&str> {
        let object = self
            .objects
            .iter()
            .find(|object| object.idd_object().is_type(self.version_object_type()))?;
        let index = usize::from(object.idd_object().has_handle_field());
        object.get_string(index)
    }

    fn version_object_type(&self) -> &'static str {
        match self.idd_file_type {
            IddFileType::OpenStudio => "OS:Version",
            IddFileType::EnergyPlus => "Version",
        }
    }

    /// Parse IDF text
    pub fn parse(text: &str, idd_file_type: IddFileType) -> Result<Self> {
        let mut file = Self::new(idd_file_type);
        let mut pending_comments = Vec::new();
        let mut tokens: Vec<String> = Vec::new();
        let mut token = String::new();
        let mut start_line = 0;

        for (num, line) in text.lines().enumerate() {
            let line_num = num + 1;
            let (code, comment) = match line.split_once('!') {
                Some((code, comment)) => (code, Some(comment)),
                None => (line, None),
            };
            let in_object = !tokens.is_empty() || !token.trim().is_empty();

            if code.trim().is_empty() && !in_object {
                match comment {
                    // Field comments (`!-`) are regenerated on output
                    Some(comment) if !comment.starts_with('-') => {
                        pending_comments.push(comment.trim().to_string());
                    }
                    Some(_) => {}
                    None => {
                        if file.objects.is_empty() && file.header.is_empty() {
                            file.header.append(&mut pending_comments);
                        } else {
                            pending_comments.clear();
                        }
                    }
                }
                continue;
            }

            for c in code.chars() {
                if !c.is_whitespace() && tokens.is_empty() && token.trim().is_empty() {
                    start_line = line_num;
                }

                match c {
                    ',' => tokens.push(std::mem::take(&mut token).trim().to_string()),
                    ';' => {
                        tokens.push(std::mem::take(&mut token).trim().to_string());
                        let comment = (!pending_comments.is_empty())
                            .then(|| std::mem::take(&mut pending_comments).join("\n"));
                        let fields = std::mem::take(&mut tokens);
                        if let Some(mut object) = build_object(idd_file_type, fields, start_line)? {
                            object.set_comment(comment);
                            file.objects.push(object);
                        }
                    }
                    _ => token.push(c),
                }
            }
        }

        if !tokens.is_empty() || !token.trim().is_empty() {
            bail!("Object beginning on line {start_line} is missing a terminating ';'");
        }

        // A file with no blank line after its leading comments has no header
        if file.objects.is_empty() {
            file.header.append(&mut pending_comments);
        }

        Ok(file)
    }

    /// Read a file from disk
    pub fn load(path: &Path, idd_file_type: IddFileType) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Could not read file: {}", path.display()))?;
        Self::parse(&text, idd_file_type)
            .with_context(|| format!("Could not parse file: {}", path.display()))
    }

    /// Write the file to disk. An existing file is only replaced if `overwrite` is set.
    pub fn save(&self, path: &Path, overwrite: bool) -> Result<()> {
        ensure!(
            overwrite || !path.exists(),
            "{} already exists. Use the overwrite option to replace it.",
            path.display()
        );
        fs::write(path, self.to_string())
            .with_context(|| format!("Could not write file: {}", path.display()))
    }

    /// Check every object, plus the constraints which apply to the file as a whole
    pub fn validity_report(&self, level: StrictnessLevel) -> ValidityReport {
        ValidityReport {
            level,
            errors: collection_errors(&self.objects, self.idd_file_type.idd_file(), level),
        }
    }
}

/// Turn the tokens of one object into an [`IdfObject`]. Unknown types are skipped.
fn build_object(
    idd_file_type: IddFileType,
    mut fields: Vec<String>,
    line_num: usize,
) -> Result<Option<IdfObject>> {
    let object_type = fields.remove(0);
    let Some(idd) = idd_file_type.idd_file().object(&object_type) else {
        warn!("Skipping object of unknown type '{object_type}' on line {line_num}");
        return Ok(None);
    };

    let object = IdfObject::from_fields(idd, fields)
        .with_context(|| format!("Invalid {object_type} object on line {line_num}"))?;

    Ok(Some(object))
}

impl fmt::Display for IdfFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.header {
            writeln!(f, "! {line}")?;
        }
        if !self.header.is_empty() {
            writeln!(f)?;
        }

        for object in &self.objects {
            write!(f, "{object}")?;
            writeln!(f)?;
        }

        Ok(())
    }
}

impl fmt::Display for IdfObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(comment) = self.comment() {
            for line in comment.lines() {
                writeln!(f, "! {line}")?;
            }
        }

        let idd = self.idd_object();
        let num_printed = self
            .fields
            .iter()
            .rposition(|value| !value.is_empty())
            .map_or(0, |last| last + 1)
            .max(idd.min_fields.min(self.num_fields()));

        if num_printed == 0 {
            return writeln!(f, "{};", idd.name);
        }

        writeln!(f, "{},", idd.name)?;
        for (index, value) in self.fields().take(num_printed).enumerate() {
            let separator = if index + 1 == num_printed { ';' } else { ',' };
            let value = format!("{value}{separator}");
            let Some(field) = idd.field(index) else {
                writeln!(f, "  {value}")?;
                continue;
            };

            match &field.units {
                Some(units) => writeln!(
                    f,
                    "  {value:<width$} !- {} {{{units}}}",
                    field.name,
                    width = VALUE_WIDTH - 1
                )?,
                None => writeln!(f, "  {value:<width$} !- {}", field.name, width = VALUE_WIDTH - 1)?,
            }
        }

        Ok(())
    }
}
