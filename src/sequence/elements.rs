/// Render element always present in every CXR file.
pub const BEAUTY_ELEMENT: &str = "BEAUTY";

/// Alpha channel, always selectable alongside the beauty pass.
pub const ALPHA_ELEMENT: &str = "Alpha";

/// Element types that cannot be extracted as standalone images.
const EXCLUDED_TYPES: [&str; 4] = [
    "SamplingFocus",
    "VisibleDiffuse",
    "VisibleNormals",
    "Hybrid",
];

/// Parse a raw element-descriptor string from a CXR header into the ordered
/// list of extractable element names.
///
/// The raw value is a `", "`-separated list of pipe-delimited descriptors
/// (`name|...|type|...`). Descriptors with fewer than 3 fields, excluded
/// types, and duplicate names are dropped. `BEAUTY` and `Alpha` are always
/// the first two entries, whatever the input.
pub fn parse_element_list(raw: &str) -> Vec<String> {
    let mut elements = vec![BEAUTY_ELEMENT.to_string(), ALPHA_ELEMENT.to_string()];

    for part in raw.split("\", \"") {
        let part = part.trim_matches('"').trim();
        if part.is_empty() {
            continue;
        }

        let components: Vec<&str> = part.split('|').collect();
        if components.len() < 3 {
            continue;
        }

        let name = components[0].trim();
        let element_type = components[2].trim();

        if EXCLUDED_TYPES.contains(&element_type) {
            continue;
        }

        if elements.iter().any(|e| e == name) {
            continue;
        }

        elements.push(name.to_string());
    }

    elements
}
