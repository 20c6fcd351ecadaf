//! Property-based tests for the relay wire format

use super::command::SceneCommand;
use proptest::prelude::*;

fn arb_name() -> impl Strategy<Value = String> {
    "[A-Za-z0-9 _\\-\u{0621}-\u{064A}]{0,20}"
}

fn arb_command() -> impl Strategy<Value = SceneCommand> {
    prop_oneof![
        (arb_name(), arb_name()).prop_map(|(object, color)| SceneCommand::CreateObject { object, color }),
        arb_name().prop_map(|value| SceneCommand::SetColor { value }),
    ]
}

proptest! {
    #[test]
    fn prop_wire_decodes_inside_surrounding_text(
        command in arb_command(),
        prefix in "[a-zA-Z .!]{0,30}",
        suffix in "[a-zA-Z .!]{0,30}",
    ) {
        let text = format!("{prefix}{}{suffix}", command.to_wire());
        prop_assert_eq!(SceneCommand::from_wire(&text).unwrap(), command);
    }

    #[test]
    fn prop_wire_is_delimited(command in arb_command()) {
        let wire = command.to_wire();
        prop_assert!(wire.starts_with(super::command::COMMAND_START));
        prop_assert!(wire.ends_with(super::command::COMMAND_END));
    }
}
