// THEORY:
// The `script` module writes the `script.asl` skeleton shipped inside the archive.
// It lists every detected mask as a ready-to-copy `features["..."]` reference and
// stubs out one empty block per ASL action, so the runner starts from a file that
// already names everything the profile can see.

/// ASL actions in the order they are emitted, each with a one-line hint.
const ACTIONS: &[(&str, &str)] = &[
    ("startup", "Runs once when the script loads; set refresh rates and settings here."),
    ("shutdown", "Runs when the autosplitter closes; clean up or save state."),
    ("init", "Runs once before the update loop; initialise variables."),
    ("exit", "Runs when the game exits."),
    ("update", "Runs first on every cycle; shared per-tick logic goes here."),
    ("start", "Return true to start the timer; reset run variables here."),
    ("split", "Return true to split, e.g. features[\"split-image\"].old > 90."),
    ("reset", "Return true to reset the timer. Use with care."),
    ("isLoading", "Return true while loading, e.g. features[\"load-screen\"].current > 90."),
    ("gameTime", "Return a custom game time if the game needs one."),
];

/// Builds the script skeleton for the given mask names.
pub fn create_script(mask_names: &[String]) -> String {
    let mut asl = String::from("// Generated using vas_architect\n\n// Recognised masks:\n");
    for name in mask_names {
        asl.push_str(&format!("// features[\"{}\"]\n", name));
    }

    for (action, hint) in ACTIONS {
        asl.push_str(&format!("\n{}\n{{\n\t// {}\n}}\n", action, hint));
    }
    asl
}
