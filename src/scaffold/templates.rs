//! Embedded scaffold templates.
//!
//! Templates are plain text with `{{placeholder}}` markers. Rendering is
//! pure string substitution, there is no conditional or loop syntax.

/// Manifest for a freshly scaffolded module.
pub const MODULE_MANIFEST: &str = r#"# Module manifest for {{name}}
# Drop this file into the mounted module directory and it is picked up on
# the next run.

[module]
name = "{{name}}"
description = "The {{name}} module."
version = "0.1.0"

[[command]]
name = "info"
description = "Show information about the {{name}} module."
run = "echo '{{name}}: replace this command'"
"#;

/// POSIX sh wrapper around a containerized helper.
pub const WRAPPER_POSIX: &str = r#"#!/bin/sh
# {{name}} wrapper generated by ghostshell
#
# Module commands known at generation time:
{{command_table}}
set -eu

exec docker run --rm -it "{{image}}" "$@"
"#;

/// PowerShell wrapper around a containerized helper.
pub const WRAPPER_POWERSHELL: &str = r#"# {{name}} wrapper generated by ghostshell
#
# Module commands known at generation time:
{{command_table}}
$ErrorActionPreference = "Stop"

docker run --rm -it "{{image}}" @args
exit $LASTEXITCODE
"#;

/// Replace every `{{key}}` marker with its substitution.
///
/// Markers without a substitution are left in place so a rendering gap is
/// visible in the output instead of silently vanishing.
pub fn render(template: &str, substitutions: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (key, value) in substitutions {
        rendered = rendered.replace(&format!("{{{{{key}}}}}"), value);
    }
    rendered
}
