use construction_engine::Engine;

use crate::grammar::encode_command;

/// Serialize the commands currently in effect, one per line.
///
/// The redo tail is not written: the file reproduces the diagram as it
/// stands, not the history.
pub fn save_project(engine: &Engine) -> String {
    let mut out = String::new();
    for cmd in engine.log.applied() {
        out.push_str(&encode_command(cmd));
        out.push('\n');
    }
    out
}
