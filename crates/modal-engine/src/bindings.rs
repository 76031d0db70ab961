//! # Default keybindings
//!
//! ## Overview
//!
//! [default_actions] builds the [ActionTable] an [Engine](crate::Engine) starts with. When more
//! than one action matches the same keys, the one registered first wins, so actions are
//! registered from the most to the least specific: the count and register prefixes, then the
//! Insert and Replace mode commands (with `<Esc>` and `<BS>` ahead of the catch-all for typed
//! characters), then the Normal and Visual mode commands, the operators, and the movements.
use editor_types::prelude::*;
use keybindings::Pattern;

use crate::action::{ActionDef, ActionFlags, ActionTable, MOTION_MODES, VISUAL_MODES};
use crate::commands::{self as cmd, STOP_RECORDING};
use crate::motion::movements as mv;
use crate::operator::operators as op;

const NORMAL: [Mode; 1] = [Mode::Normal];
const INSERT: [Mode; 2] = [Mode::Insert, Mode::Replace];
const NORMAL_VISUAL: [Mode; 4] = [Mode::Normal, Mode::Visual, Mode::VisualLine, Mode::VisualBlock];
const OBJECT_MODES: [Mode; 4] = [Mode::OperatorPending, Mode::Visual, Mode::VisualLine, Mode::VisualBlock];

fn keys(keys: &[&str]) -> Pattern {
    Pattern::keys(keys)
}

fn prefixes(table: &mut ActionTable) {
    table.register(
        ActionDef::command("count", keys(&["<number>"]), &MOTION_MODES, cmd::count_digit)
            .flags(ActionFlags::PARTIAL | ActionFlags::ONCE)
            .guard(cmd::is_count_continuation),
    );
    table.register(
        ActionDef::command("register", keys(&["\"", "<character>"]), &NORMAL_VISUAL, cmd::select_register)
            .flags(ActionFlags::PARTIAL | ActionFlags::ONCE | ActionFlags::FIRST_KEY),
    );
}

fn insert_commands(table: &mut ActionTable) {
    table.register(
        ActionDef::command("insert-escape", keys(&["<Esc>"]), &INSERT, cmd::normal_mode)
            .flags(ActionFlags::DOT_REPEAT),
    );
    table.register(ActionDef::command("insert-backspace", keys(&["<BS>"]), &INSERT, cmd::backspace));
    table.register(ActionDef::command("insert-newline", keys(&["<Enter>"]), &INSERT, cmd::insert_newline));
    table.register(ActionDef::command("insert-char", keys(&["<character>"]), &INSERT, cmd::type_char));
}

fn normal_commands(table: &mut ActionTable) {
    let edit = ActionFlags::DOT_REPEAT;
    let once = ActionFlags::ONCE | ActionFlags::FIRST_KEY;
    let repeated = once | ActionFlags::COUNT_REPEATS;

    table.register(ActionDef::command("insert", keys(&["i"]), &NORMAL, cmd::insert_before));
    table.register(ActionDef::command("append", keys(&["a"]), &NORMAL, cmd::insert_after));
    table.register(ActionDef::command("insert-line-start", keys(&["I"]), &NORMAL, cmd::insert_line_start));
    table.register(ActionDef::command("append-line-end", keys(&["A"]), &NORMAL, cmd::insert_line_end));
    table.register(ActionDef::command("open-below", keys(&["o"]), &NORMAL, cmd::open_below));
    table.register(ActionDef::command("open-above", keys(&["O"]), &NORMAL, cmd::open_above));
    table.register(ActionDef::command("replace-mode", keys(&["R"]), &NORMAL, cmd::replace_mode));

    table.register(ActionDef::command("delete-char", keys(&["x"]), &NORMAL, cmd::delete_char).flags(edit));
    table.register(
        ActionDef::command("delete-char-before", keys(&["X"]), &NORMAL, cmd::delete_char_before).flags(edit),
    );
    table.register(
        ActionDef::command("replace-char", keys(&["r", "<character>"]), &NORMAL, cmd::replace_char)
            .flags(edit),
    );
    table.register(ActionDef::command("paste-after", keys(&["p"]), &NORMAL, cmd::paste_after).flags(edit));
    table.register(ActionDef::command("paste-before", keys(&["P"]), &NORMAL, cmd::paste_before).flags(edit));

    table.register(ActionDef::command("undo", keys(&["u"]), &NORMAL, cmd::undo).flags(repeated));
    table.register(ActionDef::command("redo", keys(&["<C-r>"]), &NORMAL, cmd::redo).flags(repeated));
    table.register(ActionDef::command("dot-repeat", keys(&["."]), &NORMAL, cmd::dot_repeat).flags(repeated));

    table.register(
        ActionDef::command("start-recording", keys(&["q", "<alpha>"]), &NORMAL, cmd::start_recording)
            .flags(once)
            .guard(cmd::can_start_recording),
    );
    table.register(
        ActionDef::command(STOP_RECORDING, keys(&["q"]), &NORMAL, cmd::stop_recording)
            .flags(ActionFlags::ONCE)
            .guard(cmd::is_recording),
    );
    table.register(
        ActionDef::command("replay-last-macro", keys(&["@", "@"]), &NORMAL, cmd::replay_last_macro)
            .flags(repeated)
            .guard(cmd::macros_enabled),
    );
    table.register(
        ActionDef::command("replay-macro", keys(&["@", "<character>"]), &NORMAL, cmd::replay_macro)
            .flags(repeated)
            .guard(cmd::macros_enabled),
    );

    table.register(
        ActionDef::command("set-mark", keys(&["m", "<alpha>"]), &NORMAL, cmd::set_mark)
            .flags(ActionFlags::ONCE),
    );
    table.register(
        ActionDef::command("visual", keys(&["v"]), &NORMAL_VISUAL, cmd::visual).flags(ActionFlags::ONCE),
    );
    table.register(
        ActionDef::command("visual-line", keys(&["V"]), &NORMAL_VISUAL, cmd::visual_line)
            .flags(ActionFlags::ONCE),
    );
    table.register(
        ActionDef::command("visual-block", keys(&["<C-v>"]), &NORMAL_VISUAL, cmd::visual_block)
            .flags(ActionFlags::ONCE),
    );
    table.register(
        ActionDef::command("escape", keys(&["<Esc>"]), &MOTION_MODES, cmd::normal_mode)
            .flags(ActionFlags::ONCE),
    );
    table.register(
        ActionDef::command("search-forward", keys(&["/"]), &NORMAL_VISUAL, cmd::search_forward)
            .flags(once | ActionFlags::JUMP),
    );
    table.register(
        ActionDef::command("search-backward", keys(&["?"]), &NORMAL_VISUAL, cmd::search_backward)
            .flags(once | ActionFlags::JUMP),
    );
}

fn operators(table: &mut ActionTable) {
    table.register(ActionDef::operator("delete", keys(&["d"]), op::delete));
    table.register(
        ActionDef::operator("yank", keys(&["y"]), op::yank).without_flags(ActionFlags::DOT_REPEAT),
    );
    table.register(ActionDef::operator("change", keys(&["c"]), op::change));
    table.register(ActionDef::operator("lowercase", keys(&["g", "u"]), op::lowercase));
    table.register(ActionDef::operator("uppercase", keys(&["g", "U"]), op::uppercase));
    table.register(ActionDef::operator("toggle-case", keys(&["g", "~"]), op::toggle_case));
    table.register(ActionDef::operator("visual-delete", keys(&["x"]), op::delete).modes(&VISUAL_MODES));
}

fn movements(table: &mut ActionTable) {
    let linewise = ActionFlags::LINEWISE;
    let jump = ActionFlags::JUMP;

    table.register(ActionDef::movement("left", Pattern::any_of(&[&["h"], &["<Left>"]]), mv::left));
    table.register(
        ActionDef::movement("right", Pattern::any_of(&[&["l"], &["<Right>"]]), mv::right)
            .operator_step(mv::right_operator),
    );
    table.register(
        ActionDef::movement("down", Pattern::any_of(&[&["j"], &["<Down>"]]), mv::down).flags(linewise),
    );
    table.register(ActionDef::movement("up", Pattern::any_of(&[&["k"], &["<Up>"]]), mv::up).flags(linewise));

    table.register(
        ActionDef::movement("word-forward", keys(&["w"]), mv::word_forward)
            .operator_step(mv::word_forward_operator),
    );
    table.register(ActionDef::movement("word-backward", keys(&["b"]), mv::word_backward));
    table.register(
        ActionDef::movement("word-end", keys(&["e"]), mv::word_end).operator_step(mv::word_end_operator),
    );

    table.register(ActionDef::counted("line-start", keys(&["0"]), mv::line_start));
    table.register(ActionDef::counted("first-word", keys(&["^"]), mv::first_word));
    table.register(
        ActionDef::counted("line-end", keys(&["$"]), mv::line_end).operator_run(mv::line_end_operator),
    );
    table.register(
        ActionDef::counted("buffer-start", keys(&["g", "g"]), mv::buffer_start).flags(linewise | jump),
    );
    table.register(ActionDef::counted("buffer-end", keys(&["G"]), mv::buffer_end).flags(linewise | jump));

    table.register_char_search(
        ActionDef::movement("find-forward", keys(&["f", "<character>"]), mv::find_forward)
            .operator_step(mv::find_forward_operator),
        ActionDef::movement("find-backward", keys(&["F", "<character>"]), mv::find_backward),
    );
    table.register_char_search(
        ActionDef::movement("till-forward", keys(&["t", "<character>"]), mv::till_forward)
            .operator_step(mv::till_forward_operator),
        ActionDef::movement("till-backward", keys(&["T", "<character>"]), mv::till_backward),
    );
    table.register(
        ActionDef::char_search_repeat("repeat-char-search", keys(&[";"]), false)
            .guard(cmd::char_search_repeat_enabled),
    );
    table.register(
        ActionDef::char_search_repeat("reverse-char-search", keys(&[","]), true)
            .guard(cmd::char_search_repeat_enabled),
    );

    table.register(ActionDef::counted("search-next", keys(&["n"]), mv::search_next).flags(jump));
    table.register(ActionDef::counted("search-previous", keys(&["N"]), mv::search_previous).flags(jump));
    table.register(ActionDef::counted("goto-mark", keys(&["`", "<character>"]), mv::goto_mark).flags(jump));

    table.register(
        ActionDef::movement("inner-word", keys(&["i", "w"]), mv::inner_word)
            .modes(&OBJECT_MODES)
            .guard(cmd::text_objects_enabled),
    );
    table.register(
        ActionDef::movement("a-word", keys(&["a", "w"]), mv::a_word)
            .modes(&OBJECT_MODES)
            .guard(cmd::text_objects_enabled),
    );
}

/// The default actions.
pub fn default_actions() -> ActionTable {
    let mut table = ActionTable::new();

    prefixes(&mut table);
    insert_commands(&mut table);
    normal_commands(&mut table);
    operators(&mut table);
    movements(&mut table);

    return table;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::GuardContext;
    use crate::buffer::RopeBuffer;
    use crate::config::EngineConfig;
    use crate::state::VimState;
    use keybindings::Resolution;

    macro_rules! keys {
        () => {
            Vec::<String>::new()
        };
        ($($k: expr),+) => {
            vec![$($k.to_string()),*]
        };
    }

    fn resolve(table: &ActionTable, state: &VimState, mode: Mode, keys: Vec<String>) -> Option<&'static str> {
        let config = EngineConfig::default();
        let ctx = GuardContext { state, config: &config, keys: &keys };

        match table.resolve(mode, &keys, "\\", &ctx) {
            Resolution::Matched(def) => Some(def.name),
            Resolution::Waiting => Some("waiting"),
            Resolution::NoMatch => None,
        }
    }

    #[test]
    fn test_resolution() {
        let table = default_actions();
        let state = VimState::new(&RopeBuffer::default());

        assert_eq!(resolve(&table, &state, Mode::Normal, keys!("0")), Some("line-start"));
        assert_eq!(resolve(&table, &state, Mode::Normal, keys!("5")), Some("count"));
        assert_eq!(resolve(&table, &state, Mode::Normal, keys!("g")), Some("waiting"));
        assert_eq!(resolve(&table, &state, Mode::Normal, keys!("g", "g")), Some("buffer-start"));
        assert_eq!(resolve(&table, &state, Mode::Normal, keys!("q")), Some("waiting"));
        assert_eq!(resolve(&table, &state, Mode::Normal, keys!("@", "@")), Some("replay-last-macro"));
        assert_eq!(resolve(&table, &state, Mode::Normal, keys!("i")), Some("insert"));
        assert_eq!(resolve(&table, &state, Mode::OperatorPending, keys!("i")), Some("waiting"));
        assert_eq!(resolve(&table, &state, Mode::OperatorPending, keys!("i", "w")), Some("inner-word"));
        assert_eq!(resolve(&table, &state, Mode::Insert, keys!("<Esc>")), Some("insert-escape"));
        assert_eq!(resolve(&table, &state, Mode::Insert, keys!("x")), Some("insert-char"));
        assert_eq!(resolve(&table, &state, Mode::Insert, keys!("<C-x>")), None);
        assert_eq!(resolve(&table, &state, Mode::Visual, keys!("x")), Some("visual-delete"));
        assert_eq!(resolve(&table, &state, Mode::Normal, keys!("z")), None);
    }

    #[test]
    fn test_char_search_inverses() {
        let table = default_actions();
        let state = VimState::new(&RopeBuffer::default());

        assert_eq!(resolve(&table, &state, Mode::Normal, keys!("t", "x")), Some("till-forward"));
        assert_eq!(resolve(&table, &state, Mode::Normal, keys!(";")), Some("repeat-char-search"));
    }
}
