//! OPC part name rules

use crate::diagnostic::DiagnosticKind;

/// Check a part name against the OPC part name grammar
///
/// Non-ASCII characters are accepted as-is, many producers store them
/// without percent-encoding.
pub(crate) fn validate_part_name(part_name: &str) -> Result<(), DiagnosticKind> {
    let invalid = || DiagnosticKind::OpcPartName {
        name: part_name.to_string(),
    };

    if !part_name.starts_with('/') {
        return Err(invalid());
    }
    if part_name
        .chars()
        .any(|c| c.is_control() || c == '#' || c == '?' || c == '\\')
    {
        return Err(invalid());
    }

    // The leading slash yields an empty first segment.
    for segment in part_name.split('/').skip(1) {
        if segment.is_empty() || segment == "." || segment == ".." || segment.ends_with('.') {
            return Err(invalid());
        }
    }
    Ok(())
}

/// Resolve a relationship target against the directory of its source part
///
/// Absolute targets are returned unchanged; relative targets are joined to
/// `base_dir` and `.`/`..` segments are collapsed. Percent escapes are decoded.
pub(crate) fn resolve_target(base_dir: &str, target: &str) -> String {
    let target = urlencoding::decode(target)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| target.to_string());
    if target.starts_with('/') {
        return target;
    }

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    format!("/{}", segments.join("/"))
}

/// Directory part of a part name, including the trailing slash
pub(crate) fn parent_dir(part_name: &str) -> &str {
    match part_name.rfind('/') {
        Some(pos) => &part_name[..=pos],
        None => "/",
    }
}

/// Zip entry name of a part: the part name without its leading slash
pub(crate) fn entry_name(part_name: &str) -> &str {
    part_name.strip_prefix('/').unwrap_or(part_name)
}
