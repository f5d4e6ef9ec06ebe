//! Configuration template for `lq init`.

/// Template listing every setting with its default (valid TOML).
const TEMPLATE: &str = include_str!("../templates/config.toml");

/// Returns the template with every setting commented out.
///
/// Writing it leaves the defaults in force while documenting each key.
pub fn config_template() -> String {
    TEMPLATE
        .lines()
        .map(|line| {
            if line.is_empty() || line.starts_with('#') {
                format!("{line}\n")
            } else {
                format!("# {line}\n")
            }
        })
        .collect()
}
