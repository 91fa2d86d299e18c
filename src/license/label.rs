use comfy_table::Color;

use crate::models::LicenseInfo;

/// Short display name for a license, e.g. `MIT` or `Apache-2.0`.
///
/// Well-known GitHub license keys get a fixed label; anything else falls back
/// to the SPDX id, then to the raw key.
pub fn short_name(info: &LicenseInfo) -> String {
    match known_label(&info.key) {
        Some((name, _)) => name.to_string(),
        None => info.spdx_id.clone().unwrap_or_else(|| info.key.clone()),
    }
}

/// Table color for a license key. Unrecognised keys are highlighted.
pub fn color(key: &str) -> Color {
    known_label(key)
        .map(|(_, color)| color)
        .unwrap_or(Color::Yellow)
}

fn known_label(key: &str) -> Option<(&'static str, Color)> {
    let label = match key.trim().to_ascii_lowercase().as_str() {
        "mit" => ("MIT", Color::DarkGreen),
        "apache-2.0" => ("Apache-2.0", Color::Green),
        "bsd-2-clause" => ("BSD-2-Clause", Color::DarkGreen),
        "bsd-3-clause" => ("BSD-3-Clause", Color::DarkGreen),
        "isc" => ("ISC", Color::DarkGreen),
        "mpl-2.0" => ("MPL-2.0", Color::Blue),
        "lgpl-2.1" => ("LGPL-2.1", Color::DarkCyan),
        "lgpl-3.0" => ("LGPL-3.0", Color::DarkCyan),
        "gpl-2.0" => ("GPL-2.0", Color::Magenta),
        "gpl-3.0" => ("GPL-3.0", Color::Magenta),
        "agpl-3.0" => ("AGPL-3.0", Color::Cyan),
        "unlicense" => ("Unlicense", Color::Red),
        "other" => ("Other", Color::DarkBlue),
        _ => return None,
    };
    Some(label)
}
