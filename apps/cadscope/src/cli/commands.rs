//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//!
//! Every command resolves its objects through a [`cadscope_core::DocumentScope`] that lives
//! only for the duration of the command. Text rendering is split into
//! `render_*` functions so it can be checked without capturing stdout.

use cadscope_core::{
    CadscopeError, CollectorRegistry, CompareMode, Comparison, DiffStatus, Document,
    HostScope, InspectorConfig, Navigator, ObjectHandle, ObjectNode, ObjectTree, PropertyEntry,
    PropertyFilter, TypedChannel, TypedValueCodec, TypedValueEntry,
    compare_objects, document_from_bytes, document_to_bytes, is_snapshot,
    primitives::MAX_SNAPSHOT_SIZE, typed_value::kind_for_code,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE HANDLING
// =============================================================================

/// Maximum document size accepted from disk, for either encoding.
const MAX_DOCUMENT_FILE_SIZE: u64 = MAX_SNAPSHOT_SIZE as u64;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CadscopeError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CadscopeError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CadscopeError::DeserializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path to a canonical regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CadscopeError> {
    let canonical = path.canonicalize().map_err(|e| {
        CadscopeError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CadscopeError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, CadscopeError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CadscopeError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CadscopeError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CadscopeError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

/// On-disk encoding of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Binary snapshot (magic header + postcard payload).
    Snapshot,
    /// Pretty-printed JSON, convenient for authoring by hand.
    Json,
}

impl DocumentFormat {
    /// Parse a `--format` argument.
    pub fn parse(text: &str) -> Result<Self, CadscopeError> {
        match text {
            "snapshot" => Ok(Self::Snapshot),
            "json" => Ok(Self::Json),
            other => Err(CadscopeError::SerializationError(format!(
                "Unknown format: {}. Use: snapshot, json",
                other
            ))),
        }
    }

    /// Format implied by a file extension; anything but `.json` is a snapshot.
    #[must_use]
    pub fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Snapshot,
        }
    }
}

/// Load a document, or the built-in sample when no path is given.
///
/// Snapshots are recognized by their magic bytes; anything else is read as
/// JSON.
pub fn load_document(path: Option<&Path>) -> Result<Document, CadscopeError> {
    match path {
        Some(path) => read_document(path).map(|(document, _)| document),
        None => {
            tracing::debug!("no document given, using the built-in sample");
            Ok(Document::sample())
        }
    }
}

/// Read a document file and report which encoding it was in.
pub fn read_document(path: &Path) -> Result<(Document, DocumentFormat), CadscopeError> {
    let validated = validate_file_path(path)?;
    validate_file_size(&validated, MAX_DOCUMENT_FILE_SIZE)?;

    let data = std::fs::read(&validated)
        .map_err(|e| CadscopeError::IoError(format!("Read file: {}", e)))?;

    let (document, format) = if is_snapshot(&data) {
        (document_from_bytes(&data)?, DocumentFormat::Snapshot)
    } else {
        let document = serde_json::from_slice(&data)
            .map_err(|e| CadscopeError::DeserializationError(e.to_string()))?;
        (document, DocumentFormat::Json)
    };

    tracing::info!(path = %validated.display(), objects = document.len(), "document loaded");
    Ok((document, format))
}

/// Write a document in the given format. Returns the number of bytes written.
pub fn save_document(
    document: &Document,
    path: &Path,
    format: DocumentFormat,
) -> Result<usize, CadscopeError> {
    let validated = validate_output_path(path)?;

    let data = match format {
        DocumentFormat::Snapshot => document_to_bytes(document)?,
        DocumentFormat::Json => serde_json::to_vec_pretty(document)
            .map_err(|e| CadscopeError::SerializationError(e.to_string()))?,
    };

    std::fs::write(&validated, &data)
        .map_err(|e| CadscopeError::IoError(format!("Write file: {}", e)))?;

    tracing::info!(path = %validated.display(), bytes = data.len(), "document written");
    Ok(data.len())
}

// =============================================================================
// SETTINGS
// =============================================================================

/// Options shared by every command.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Document path; `None` selects the built-in sample.
    pub document: Option<PathBuf>,
    pub config: InspectorConfig,
    pub json_mode: bool,
}

impl Settings {
    /// Combine the configuration file with command-line overrides.
    ///
    /// Precision flags win over the file. The merged result is validated.
    pub fn resolve(
        document: Option<PathBuf>,
        config_path: Option<&Path>,
        spatial_precision: Option<usize>,
        scalar_precision: Option<usize>,
        json_mode: bool,
    ) -> Result<Self, CadscopeError> {
        let mut config = match config_path {
            Some(path) => InspectorConfig::load(path)?,
            None => InspectorConfig::default(),
        };
        if let Some(precision) = spatial_precision {
            config.format.spatial_precision = precision;
        }
        if let Some(precision) = scalar_precision {
            config.format.scalar_precision = precision;
        }
        config.validate()?;

        Ok(Self {
            document,
            config,
            json_mode,
        })
    }

    fn registry(&self) -> CollectorRegistry {
        CollectorRegistry::standard(self.config.format)
    }

    fn codec(&self) -> TypedValueCodec {
        TypedValueCodec::new(self.config.format)
    }
}

fn print_json(value: &impl Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Summarize the loaded document.
pub fn cmd_status(settings: &Settings) -> Result<(), CadscopeError> {
    let document = load_document(settings.document.as_deref())?;
    let registry = settings.registry();

    let mut kinds: BTreeMap<String, usize> = BTreeMap::new();
    for object in document.objects() {
        *kinds.entry(object.kind.name().to_string()).or_default() += 1;
    }
    let collectors: Vec<&str> = registry.descriptors().map(|d| d.name()).collect();
    let source = settings
        .document
        .as_ref()
        .map_or_else(|| "(built-in sample)".to_string(), |p| p.display().to_string());

    if settings.json_mode {
        let output = serde_json::json!({
            "document": source,
            "root": document.root(),
            "object_count": document.len(),
            "kinds": kinds,
            "collectors": collectors,
            "spatial_precision": settings.config.format.spatial_precision,
            "scalar_precision": settings.config.format.scalar_precision,
        });
        print_json(&output);
        return Ok(());
    }

    println!("cadscope Document Status");
    println!("========================");
    println!("Document: {}", source);
    println!("Root:     {}", document.root());
    println!("Objects:  {}", document.len());
    println!();
    println!("Kinds:");
    for (kind, count) in &kinds {
        println!("  {:<16} {}", kind, count);
    }
    println!();
    println!("Collectors: {}", collectors.join(", "));

    Ok(())
}

// =============================================================================
// PROPS COMMAND
// =============================================================================

/// Render entries grouped by category, categories in first-seen order.
#[must_use]
pub fn render_properties(entries: &[&PropertyEntry]) -> String {
    let mut groups: Vec<(&str, Vec<&PropertyEntry>)> = Vec::new();
    for entry in entries {
        match groups.iter_mut().find(|(c, _)| *c == entry.category) {
            Some((_, members)) => members.push(entry),
            None => groups.push((entry.category.as_str(), vec![entry])),
        }
    }

    let mut lines = Vec::new();
    for (category, members) in groups {
        lines.push(format!("[{}]", category));
        for entry in members {
            let marker = if entry.has_error { " !" } else { "" };
            lines.push(format!(
                "  {} ({}) = {}{}",
                entry.name, entry.declared_type, entry.formatted_value, marker
            ));
        }
    }
    lines.join("\n")
}

/// Show the property entries of one object.
pub fn cmd_props(
    settings: &Settings,
    handle: &str,
    filter: Option<&str>,
    errors_only: bool,
) -> Result<(), CadscopeError> {
    let document = load_document(settings.document.as_deref())?;
    let scope = document.open_scope();
    let registry = settings.registry();

    let object = scope.resolve_hex(handle)?;
    let entries = registry.extract(object, &scope)?;
    let filter = PropertyFilter::new()
        .with_text(filter.unwrap_or_default())
        .errors_only(errors_only);
    let kept = filter.apply(&entries);

    if settings.json_mode {
        let output = serde_json::json!({
            "handle": object.handle(),
            "class": object.class_name(),
            "collector": registry.select(object),
            "total": entries.len(),
            "entries": kept,
        });
        print_json(&output);
        return Ok(());
    }

    println!(
        "{} via {} ({} of {} entries)",
        object.display_name(),
        registry.select(object),
        kept.len(),
        entries.len()
    );
    if !kept.is_empty() {
        println!("{}", render_properties(&kept));
    }

    Ok(())
}

// =============================================================================
// TREE COMMAND
// =============================================================================

/// Render a tree with two-space indentation per level.
///
/// Expandable nodes that were not expanded show the placeholder child.
#[must_use]
pub fn render_tree(root: &ObjectNode) -> String {
    let mut lines = Vec::new();
    render_node(root, 0, &mut lines);
    lines.join("\n")
}

fn render_node(node: &ObjectNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{}", "  ".repeat(depth), node.label()));
    if node.has_placeholder() {
        for label in node.child_labels() {
            lines.push(format!("{}{}", "  ".repeat(depth + 1), label));
        }
        return;
    }
    for child in node.children() {
        render_node(child, depth + 1, lines);
    }
}

/// Show the object tree down to `depth` levels.
pub fn cmd_tree(
    settings: &Settings,
    handle: Option<&str>,
    depth: usize,
) -> Result<(), CadscopeError> {
    let document = load_document(settings.document.as_deref())?;
    let scope = document.open_scope();
    let registry = settings.registry();
    let navigator = Navigator::new(&registry, &scope).with_config(settings.config.navigator);

    let mut tree = match handle {
        Some(text) => ObjectTree::at(&navigator, ObjectHandle::parse(text)?)?,
        None => ObjectTree::open(&navigator)?,
    };
    tree.expand_to_depth(&navigator, depth)?;

    if settings.json_mode {
        print_json(tree.root());
        return Ok(());
    }

    println!("{}", render_tree(tree.root()));
    Ok(())
}

// =============================================================================
// TYPED VALUE COMMANDS
// =============================================================================

/// Render decoded typed values, one per line.
#[must_use]
pub fn render_typed_values(entries: &[TypedValueEntry]) -> String {
    entries
        .iter()
        .map(|e| {
            let line = format!(
                "[{}] {} {} = {}",
                e.index,
                e.code,
                e.kind.name(),
                e.formatted_value
            );
            match &e.error {
                Some(error) => format!("{}  ({})", line, error),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode an object's extended data or xrecord payload.
pub fn cmd_xdata(
    settings: &Settings,
    handle: &str,
    channel: TypedChannel,
) -> Result<(), CadscopeError> {
    let document = load_document(settings.document.as_deref())?;
    let scope = document.open_scope();

    let object = scope.resolve_hex(handle)?;
    let values = match channel {
        TypedChannel::Data => object.typed_data(),
        TypedChannel::XData => object.xdata(),
    }
    .unwrap_or_default();
    let entries = settings.codec().decode(values);

    if settings.json_mode {
        let output = serde_json::json!({
            "handle": object.handle(),
            "channel": channel,
            "entries": entries,
        });
        print_json(&output);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{} has no {:?} values", object.display_name(), channel);
        return Ok(());
    }
    println!("{} {:?} ({} values)", object.display_name(), channel, entries.len());
    println!("{}", render_typed_values(&entries));
    Ok(())
}

/// Encode operator text for a group code and show the result.
pub fn cmd_encode(settings: &Settings, code: i16, text: &str) -> Result<(), CadscopeError> {
    let value = settings.codec().encode(code, text)?;
    let kind = kind_for_code(code).map_or("Unknown", |k| k.name());
    let formatted = settings.config.format.format_value(&value, false);

    if settings.json_mode {
        let output = serde_json::json!({
            "code": code,
            "kind": kind,
            "value": value,
            "formatted": formatted,
        });
        print_json(&output);
        return Ok(());
    }

    println!("{} {} = {}", code, kind, formatted);
    Ok(())
}

/// Replace one typed value and write the document.
///
/// The edited document goes to `output` when given, otherwise back over the
/// input document in its own format. The built-in sample has no input
/// path, so editing it requires `output`.
pub fn cmd_edit(
    settings: &Settings,
    handle: &str,
    channel: TypedChannel,
    index: usize,
    text: &str,
    output: Option<&Path>,
) -> Result<(), CadscopeError> {
    let (mut document, target) = match (settings.document.as_deref(), output) {
        (Some(input), Some(path)) => (
            read_document(input)?.0,
            (path.to_path_buf(), DocumentFormat::for_path(path)),
        ),
        (Some(input), None) => {
            let (document, format) = read_document(input)?;
            (document, (input.to_path_buf(), format))
        }
        (None, Some(path)) => (
            Document::sample(),
            (path.to_path_buf(), DocumentFormat::for_path(path)),
        ),
        (None, None) => {
            return Err(CadscopeError::IoError(
                "Nowhere to write the edit; pass --document or --output".to_string(),
            ));
        }
    };

    let handle = ObjectHandle::parse(handle)?;
    document.edit_typed_value(handle, channel, index, text, &settings.codec())?;
    let bytes = save_document(&document, &target.0, target.1)?;

    if settings.json_mode {
        let output = serde_json::json!({
            "handle": handle,
            "channel": channel,
            "index": index,
            "text": text,
            "output": target.0.to_string_lossy(),
            "bytes": bytes,
        });
        print_json(&output);
        return Ok(());
    }

    println!(
        "Edited {} {:?}[{}]; wrote {} bytes to {:?}",
        handle, channel, index, bytes, target.0
    );
    Ok(())
}

// =============================================================================
// DIFF COMMAND
// =============================================================================

/// Render a comparison as one marked line per row plus a summary.
#[must_use]
pub fn render_comparison(comparison: &Comparison, changes_only: bool) -> String {
    let mut lines: Vec<String> = comparison
        .rows
        .iter()
        .filter(|row| !changes_only || row.status != DiffStatus::Same)
        .map(|row| {
            format!(
                "{} {}: {} | {}",
                row.status.marker(),
                row.name,
                row.first.as_deref().unwrap_or("-"),
                row.second.as_deref().unwrap_or("-")
            )
        })
        .collect();

    let summary = comparison.summary();
    lines.push(format!(
        "{} same, {} different, {} only in first, {} only in second",
        summary.same, summary.different, summary.only_in_first, summary.only_in_second
    ));
    lines.join("\n")
}

/// Compare the properties of two objects.
pub fn cmd_diff(
    settings: &Settings,
    first: &str,
    second: &str,
    raw: bool,
    changes_only: bool,
) -> Result<(), CadscopeError> {
    let document = load_document(settings.document.as_deref())?;
    let scope = document.open_scope();
    let registry = settings.registry();

    let a = scope.resolve_hex(first)?;
    let b = scope.resolve_hex(second)?;
    let mode = if raw {
        CompareMode::Raw
    } else {
        CompareMode::Formatted
    };
    let comparison = compare_objects(&registry, &scope, a, b, mode)?;

    if settings.json_mode {
        let rows: Vec<_> = if changes_only {
            comparison.changes().collect()
        } else {
            comparison.rows.iter().collect()
        };
        let output = serde_json::json!({
            "first": a.handle(),
            "second": b.handle(),
            "mode": mode,
            "identical": comparison.is_identical(),
            "summary": comparison.summary(),
            "rows": rows,
        });
        print_json(&output);
        return Ok(());
    }

    println!("{} vs {}", a.display_name(), b.display_name());
    println!("{}", render_comparison(&comparison, changes_only));
    Ok(())
}

// =============================================================================
// SNAPSHOT / SAMPLE COMMANDS
// =============================================================================

/// Write the loaded document as a binary snapshot.
pub fn cmd_snapshot(settings: &Settings, output: &Path) -> Result<(), CadscopeError> {
    let document = load_document(settings.document.as_deref())?;
    let bytes = save_document(&document, output, DocumentFormat::Snapshot)?;
    println!("Wrote {} objects ({} bytes) to {:?}", document.len(), bytes, output);
    Ok(())
}

/// Write the built-in sample document.
pub fn cmd_sample(output: &Path, format: &str) -> Result<(), CadscopeError> {
    let format = DocumentFormat::parse(format)?;
    let document = Document::sample();
    let bytes = save_document(&document, output, format)?;
    println!("Wrote sample document ({} bytes) to {:?}", bytes, output);
    Ok(())
}
