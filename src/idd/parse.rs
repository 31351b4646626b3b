//! Parser for the IDD text format.
use super::{IddField, IddFieldKind, IddFile, IddObject, NumericBound};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use unicase::UniCase;

/// The comment prefix which carries the dictionary version
const VERSION_PREFIX: &str = "!IDD_Version";

/// Parse the contents of an IDD file
pub(super) fn parse_idd(text: &str) -> Result<IddFile> {
    let mut version = None;
    let mut group = None;
    let mut objects = IndexMap::new();
    let mut current: Option<IddObject> = None;

    for (num, raw_line) in text.lines().enumerate() {
        let line_num = num + 1;
        if let Some(value) = raw_line.trim().strip_prefix(VERSION_PREFIX) {
            version = Some(value.trim().to_string());
            continue;
        }

        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }

        let (head, property) = match line.find('\\') {
            Some(pos) => (line[..pos].trim(), Some(&line[pos + 1..])),
            None => (line, None),
        };

        if !head.is_empty() {
            let token = head.trim_end_matches([',', ';']).trim();
            if is_field_id(token) {
                let object = current
                    .as_mut()
                    .with_context(|| format!("Line {line_num}: field {token} is not in an object"))?;
                object.fields.push(IddField::new(token));
            } else {
                if let Some(object) = current.take() {
                    insert_object(&mut objects, object)?;
                }
                current = Some(IddObject::new(token, group.clone()));
            }
        }

        let Some(property) = property else {
            continue;
        };

        let (key, value) = split_property(property);
        if key == "group" {
            if let Some(object) = current.take() {
                insert_object(&mut objects, object)?;
            }
            group = Some(value.to_string());
            continue;
        }

        let object = current
            .as_mut()
            .with_context(|| format!("Line {line_num}: property \\{key} is not in an object"))?;
        apply_property(object, key, value).with_context(|| format!("Line {line_num}"))?;
    }

    if let Some(object) = current.take() {
        insert_object(&mut objects, object)?;
    }

    Ok(IddFile {
        version: version.context("IDD is missing the !IDD_Version header")?,
        objects,
    })
}

/// Remove a trailing `!` comment
fn strip_comment(line: &str) -> &str {
    line.split_once('!').map_or(line, |(before, _)| before)
}

/// Whether `token` looks like a field identifier (e.g. `A12`, `N3`)
fn is_field_id(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(chars.next(), Some('A' | 'N' | 'a' | 'n'))
        && !chars.as_str().is_empty()
        && chars.all(|c| c.is_ascii_digit())
}

/// Split a property (without its leading backslash) into key and value
fn split_property(property: &str) -> (&str, &str) {
    let property = property.trim();

    // Bounds may be written without a space, e.g. `\minimum>0`
    for key in ["minimum>", "maximum<"] {
        if let Some(value) = property.strip_prefix(key) {
            return (key, value.trim());
        }
    }

    property
        .split_once(char::is_whitespace)
        .map_or((property, ""), |(key, value)| (key, value.trim()))
}

/// Apply a property to an object or to its most recently declared field
fn apply_property(object: &mut IddObject, key: &str, value: &str) -> Result<()> {
    if let Some(size) = key.strip_prefix("extensible:") {
        object.extensible_group_size = size
            .parse()
            .with_context(|| format!("Invalid extensible group size: {size}"))?;
        return Ok(());
    }

    match key {
        "memo" => object.memo.push(value.to_string()),
        "unique-object" => object.unique = true,
        "required-object" => object.required = true,
        "min-fields" => {
            object.min_fields = value
                .parse()
                .with_context(|| format!("Invalid min-fields value: {value}"))?;
        }
        "format" | "obsolete" => {}
        _ => {
            let first_extensible = object.fields.len().checked_sub(1);
            let Some(field) = object.fields.last_mut() else {
                // Unrecognised object-level properties are ignored
                return Ok(());
            };

            if key == "begin-extensible" {
                object.first_extensible = first_extensible;
            } else {
                apply_field_property(field, key, value)?;
            }
        }
    }

    Ok(())
}

/// Apply a property to a field
fn apply_field_property(field: &mut IddField, key: &str, value: &str) -> Result<()> {
    match key {
        "field" => value.clone_into(&mut field.name),
        "type" => {
            field.kind = value
                .parse::<IddFieldKind>()
                .with_context(|| format!("Unknown field type: {value}"))?;
        }
        "required-field" => field.required = true,
        "default" => field.default = Some(value.to_string()),
        "minimum" => field.minimum = Some(parse_bound(value, false)?),
        "minimum>" => field.minimum = Some(parse_bound(value, true)?),
        "maximum" => field.maximum = Some(parse_bound(value, false)?),
        "maximum<" => field.maximum = Some(parse_bound(value, true)?),
        "key" => field.keys.push(value.to_string()),
        "object-list" => field.object_lists.push(value.to_string()),
        "reference" => field.references.push(value.to_string()),
        "units" => field.units = Some(value.to_string()),
        "autosizable" => field.autosizable = true,
        "autocalculatable" => field.autocalculatable = true,
        "note" => field.notes.push(value.to_string()),
        _ => {}
    }

    Ok(())
}

fn parse_bound(value: &str, exclusive: bool) -> Result<NumericBound> {
    let value = value
        .parse()
        .with_context(|| format!("Invalid numeric bound: {value}"))?;

    Ok(NumericBound { value, exclusive })
}

/// Check a completed object and add it to the dictionary
fn insert_object(
    objects: &mut IndexMap<UniCase<String>, IddObject>,
    object: IddObject,
) -> Result<()> {
    if object.is_extensible() {
        let first = object.first_extensible.with_context(|| {
            format!(
                "{} is extensible but no field begins the extensible group",
                object.name
            )
        })?;
        ensure!(
            first + object.extensible_group_size <= object.fields.len(),
            "{} declares fewer extensible fields than its group size",
            object.name
        );
    }

    let key = UniCase::new(object.name.clone());
    if objects.contains_key(&key) {
        bail!("Duplicate object type in IDD: {}", object.name);
    }
    objects.insert(key, object);

    Ok(())
}
